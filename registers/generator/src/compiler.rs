// Licensed under the Apache-2.0 license

//! Compile pipeline: description -> model -> validation -> layout.

use crate::config::GlobalConfig;
use crate::description::RegisterMapDesc;
use crate::error::{CompileResult, NameKind, SchemaError};
use crate::layout::reserved_spans;
use crate::model::{Register, RegisterMap};
use crate::util::is_identifier;
use crate::validate::{check_fields, check_registers, check_symbols};
use log::debug;
use rayon::prelude::*;

/// Compiles a description with the default configuration.
pub fn compile(desc: &RegisterMapDesc) -> CompileResult<RegisterMap> {
    compile_with_config(desc, &GlobalConfig::default())
}

/// Compiles a description into a validated [`RegisterMap`].
///
/// The first violation found aborts compilation; nothing is produced for an
/// invalid map.
pub fn compile_with_config(
    desc: &RegisterMapDesc,
    config: &GlobalConfig,
) -> CompileResult<RegisterMap> {
    let word = config.word_width()?;
    if !is_identifier(&desc.name) {
        return Err(SchemaError::InvalidName {
            kind: NameKind::Map,
            name: desc.name.clone(),
        }
        .into());
    }
    let base = config.base_address.unwrap_or(desc.base_address);
    debug!(
        "compiling {} ({} registers, {}-bit words, base {base:#x})",
        desc.name,
        desc.registers.len(),
        word.bits()
    );

    let mut registers = Vec::with_capacity(desc.registers.len());
    for r in &desc.registers {
        let register = Register::from_desc(r, word, config.name_case)?;
        check_fields(&register)?;
        registers.push(register);
    }
    check_registers(base, word, &registers)?;
    check_symbols(&registers)?;

    registers.sort_by_key(|r| r.address());
    let reserved = reserved_spans(base, word, &registers)?;
    debug!(
        "{}: {} reserved spans, end address {:#x}",
        desc.name,
        reserved.len(),
        registers
            .last()
            .map_or(base, |r| r.address() + word.bytes())
    );

    Ok(RegisterMap {
        name: desc.name.clone(),
        base_address: base,
        word_width: word,
        registers,
        reserved,
    })
}

/// Compiles independent register maps on the rayon thread pool.
///
/// Each worker owns the map it builds; results are returned in input order.
pub fn compile_units(
    descs: &[RegisterMapDesc],
    config: &GlobalConfig,
) -> Vec<CompileResult<RegisterMap>> {
    debug!(
        "compiling {} units on {} threads",
        descs.len(),
        rayon::current_num_threads()
    );
    descs
        .par_iter()
        .map(|desc| compile_with_config(desc, config))
        .collect()
}
