// Licensed under the Apache-2.0 license

//! Structural checks over fields of one register and registers of one map.
//!
//! Both structural checks stable-sort their input and scan it in ascending
//! order, so the violation reported for a given input never changes between
//! runs. [`check_symbols`] walks registers in declaration order.

use crate::error::{CompileError, CompileResult, SchemaError};
use crate::model::{Register, WordWidth};
use crate::util::{camel_case, python_ident, snake_case};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Checks that field names are unique and that no two fields share a bit.
pub fn check_fields(register: &Register) -> CompileResult<()> {
    let mut seen = HashSet::new();
    for f in register.fields() {
        if !seen.insert(f.name()) {
            return Err(SchemaError::DuplicateFieldName {
                register: register.name().to_string(),
                field: f.name().to_string(),
            }
            .into());
        }
    }

    let sorted = register.fields_by_lsb();
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.bits().end > b.lsb() {
            return Err(CompileError::Overlap {
                register: register.name().to_string(),
                first: a.name().to_string(),
                first_lsb: a.lsb(),
                first_width: a.width(),
                second: b.name().to_string(),
                second_lsb: b.lsb(),
                second_width: b.width(),
            });
        }
    }
    Ok(())
}

/// Suffixes of the per-field constants emitted by the C, Rust and Python
/// generators.
const FIELD_SUFFIXES: [&str; 6] = ["WIDTH", "LSB", "MASK", "RESET", "POS", "MSK"];

/// Scopes in which generated names must be unique.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Namespace {
    /// Upper-case constants shared by all generators.
    Constant,
    /// C typedef names.
    CType,
    /// Rust struct members, `bits` types and their fields/values.
    Rust,
    /// Python attributes and helper classes.
    Python,
}

#[derive(Default)]
struct SymbolTable {
    owners: HashMap<(Namespace, String), String>,
}

impl SymbolTable {
    fn claim(&mut self, ns: Namespace, symbol: String, owner: &str) -> Result<(), SchemaError> {
        match self.owners.entry((ns, symbol)) {
            Entry::Vacant(e) => {
                e.insert(owner.to_string());
                Ok(())
            }
            // an item may derive the same name more than once
            Entry::Occupied(e) if e.get() == owner => Ok(()),
            Entry::Occupied(e) => Err(SchemaError::SymbolClash {
                symbol: e.key().1.clone(),
                first: e.get().clone(),
                second: owner.to_string(),
            }),
        }
    }
}

/// Checks that the names derived for generated code stay distinct, e.g. that
/// a register named `BASE` does not redefine `BASE_ADDR`.
pub fn check_symbols(registers: &[Register]) -> CompileResult<()> {
    use Namespace::*;

    let mut table = SymbolTable::default();
    table.claim(Constant, "BASE_ADDR".into(), "the base address")?;
    for r in registers {
        let owner = format!("register {}", r.name());
        let reg_upper = r.name().to_uppercase();
        let reg_lower = r.name().to_lowercase();
        let reg_camel = camel_case(r.name());
        let reg_ident = python_ident(r.name());
        table.claim(Constant, format!("{reg_upper}_ADDR"), &owner)?;
        table.claim(Constant, format!("{reg_upper}_RESET"), &owner)?;
        table.claim(CType, format!("{reg_lower}_t"), &owner)?;
        table.claim(Rust, snake_case(r.name()), &owner)?;
        table.claim(Rust, reg_camel.clone(), &owner)?;
        table.claim(Python, format!("{reg_ident}_bf"), &owner)?;
        table.claim(Python, reg_ident, &owner)?;
        table.claim(Python, format!("_Reg{reg_camel}"), &owner)?;

        for f in r.fields() {
            let owner = format!("field {}.{}", r.name(), f.name());
            let field_upper = format!("{reg_upper}_{}", f.name().to_uppercase());
            let field_camel = format!("{reg_camel}::{}", camel_case(f.name()));
            for suffix in FIELD_SUFFIXES {
                table.claim(Constant, format!("{field_upper}_{suffix}"), &owner)?;
            }
            table.claim(Rust, field_camel.clone(), &owner)?;
            table.claim(
                Python,
                format!("_Reg{reg_camel}.{}", python_ident(f.name())),
                &owner,
            )?;
            if !f.enum_values().is_empty() {
                let c_type = format!("{reg_lower}_{}_t", f.name().to_lowercase());
                table.claim(CType, c_type, &owner)?;
            }

            for e in f.enum_values() {
                let owner = format!("enumerated value {}.{}.{}", r.name(), f.name(), e.name());
                let value_upper = format!("{field_upper}_{}", e.name().to_uppercase());
                table.claim(Constant, value_upper, &owner)?;
                table.claim(Rust, format!("{field_camel}::{}", camel_case(e.name())), &owner)?;
            }
        }
    }
    Ok(())
}

/// Checks register names, base alignment and register addresses.
///
/// Addresses are scanned in ascending order; each one must be word-aligned,
/// not below `base`, end below 2^64 and differ from its predecessor.
pub fn check_registers(
    base: u64,
    word: WordWidth,
    registers: &[Register],
) -> CompileResult<()> {
    let mut seen = HashSet::new();
    for r in registers {
        if !seen.insert(r.name()) {
            return Err(SchemaError::DuplicateRegisterName {
                name: r.name().to_string(),
            }
            .into());
        }
    }

    let word_bytes = word.bytes();
    if base % word_bytes != 0 {
        return Err(SchemaError::MisalignedBase { base, word_bytes }.into());
    }

    let mut sorted: Vec<&Register> = registers.iter().collect();
    sorted.sort_by_key(|r| r.address());
    let mut prev: Option<&Register> = None;
    for r in sorted {
        let address = r.address();
        if address % word_bytes != 0 {
            return Err(CompileError::MisalignedAddress {
                register: r.name().to_string(),
                address,
                word_bytes,
            });
        }
        if address < base {
            return Err(SchemaError::AddressBelowBase {
                register: r.name().to_string(),
                address,
                base,
            }
            .into());
        }
        if address.checked_add(word_bytes).is_none() {
            return Err(SchemaError::AddressOutOfRange {
                register: r.name().to_string(),
                address,
            }
            .into());
        }
        if let Some(p) = prev.filter(|p| p.address() == address) {
            return Err(CompileError::DuplicateAddress {
                address,
                first: p.name().to_string(),
                second: r.name().to_string(),
            });
        }
        prev = Some(r);
    }
    Ok(())
}
