// Licensed under the Apache-2.0 license

//! Rust backend producing tock-registers code.
//!
//! For a map named "uart", the generated code looks like:
//!
//! ```text
//! pub const UART_ADDR: u32 = 0x4000_0000;
//!
//! pub mod consts {
//!     pub const CTRL_ADDR: u32 = 0x4000_0004;
//!     pub const CTRL_EN_MASK: u32 = 0x10;
//!     ...
//! }
//!
//! pub mod bits {
//!     use tock_registers::register_bitfields;
//!     register_bitfields! {
//!         u32,
//!         pub Ctrl [ ... ],
//!     }
//! }
//!
//! pub mod regs {
//!     use tock_registers::register_structs;
//!     register_structs! {
//!         pub Uart {
//!             (0x0 => _reserved0),
//!             (0x4 => pub ctrl: tock_registers::registers::ReadWrite<u32, super::bits::Ctrl::Register>),
//!             (0x8 => @END),
//!         }
//!     }
//! }
//! ```

use super::Backend;
use crate::layout::Slot;
use crate::model::{AccessMode, Register, RegisterMap};
use crate::output::{Artifact, Language};
use crate::util::{camel_case, hex_const, snake_case};
use std::fmt::Write;
use std::path::PathBuf;

pub struct RustBackend {
    path: PathBuf,
}

impl RustBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn emit(&self, map: &RegisterMap) -> Vec<Artifact> {
        vec![Artifact::new(
            self.path.clone(),
            Language::Rust,
            generate_code(map),
        )]
    }
}

/// A register whose only field spans the whole word without enumerated values
/// has no meaningful bitfield decomposition.
fn has_bitfield(map: &RegisterMap, reg: &Register) -> bool {
    let fields = reg.fields();
    !(fields.len() == 1
        && fields[0].lsb() == 0
        && fields[0].width() == map.word_width().bits()
        && fields[0].enum_values().is_empty())
}

fn word_type(map: &RegisterMap) -> &'static str {
    match map.word_width().bits() {
        8 => "u8",
        16 => "u16",
        64 => "u64",
        _ => "u32",
    }
}

fn addr_type(map: &RegisterMap) -> &'static str {
    if map.end_address() <= 1 << 32 {
        "u32"
    } else {
        "u64"
    }
}

pub(crate) fn generate_code(map: &RegisterMap) -> String {
    let mut output = String::new();
    let version = env!("CARGO_PKG_VERSION");
    writeln!(output, "// Created with regmap-generator v{version}").unwrap();
    writeln!(output).unwrap();

    let name_upper = snake_case(map.name()).to_uppercase();
    let addr = hex_const(map.base_address());
    writeln!(
        output,
        "pub const {name_upper}_ADDR: {} = {addr};",
        addr_type(map)
    )
    .unwrap();
    writeln!(output).unwrap();

    writeln!(output, "pub mod consts {{").unwrap();
    writeln!(output, "    //! Register addresses and field constants.").unwrap();
    write!(output, "{}", generate_consts(map)).unwrap();
    writeln!(output, "}}").unwrap();

    let bitfields = generate_bitfields(map);
    if !bitfields.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "pub mod bits {{").unwrap();
        writeln!(
            output,
            "    //! Types that represent individual registers (bitfields)."
        )
        .unwrap();
        writeln!(output, "    use tock_registers::register_bitfields;").unwrap();
        write!(output, "{bitfields}").unwrap();
        writeln!(output, "}}").unwrap();
    }

    if !map.registers().is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "pub mod regs {{").unwrap();
        writeln!(output, "    //! Types that represent registers.").unwrap();
        writeln!(output, "    use tock_registers::register_structs;").unwrap();
        write!(output, "{}", generate_register_structs(map)).unwrap();
        writeln!(output, "}}").unwrap();
    }

    output
}

fn generate_consts(map: &RegisterMap) -> String {
    let addr_ty = addr_type(map);
    let word_ty = word_type(map);
    let mut output = String::new();
    for reg in map.registers() {
        let reg_upper = reg.name().to_uppercase();
        writeln!(output).unwrap();
        for line in reg.description().lines() {
            writeln!(output, "    /// {line}").unwrap();
        }
        writeln!(
            output,
            "    pub const {reg_upper}_ADDR: {addr_ty} = {};",
            hex_const(reg.address())
        )
        .unwrap();
        writeln!(
            output,
            "    pub const {reg_upper}_RESET: {word_ty} = {};",
            hex_const(reg.reset())
        )
        .unwrap();
        for f in reg.fields() {
            let name = format!("{reg_upper}_{}", f.name().to_uppercase());
            writeln!(output, "    pub const {name}_WIDTH: u32 = {};", f.width()).unwrap();
            writeln!(output, "    pub const {name}_LSB: u32 = {};", f.lsb()).unwrap();
            writeln!(
                output,
                "    pub const {name}_MASK: {word_ty} = {};",
                hex_const(f.mask())
            )
            .unwrap();
            writeln!(
                output,
                "    pub const {name}_RESET: {word_ty} = {};",
                hex_const(f.reset())
            )
            .unwrap();
        }
    }
    output
}

/// Generate the `register_bitfields!` invocation for all registers with a
/// bitfield decomposition, in address order.
fn generate_bitfields(map: &RegisterMap) -> String {
    let mut tokens = String::new();
    for reg in map.registers() {
        if !has_bitfield(map, reg) {
            continue;
        }
        writeln!(tokens, "        pub {} [", camel_case(reg.name())).unwrap();
        for field in reg.fields_by_lsb() {
            for line in field.description().lines() {
                writeln!(tokens, "            /// {line}").unwrap();
            }
            let field_name = camel_case(field.name());
            let offset = field.lsb();
            let width = field.width();
            if field.enum_values().is_empty() {
                writeln!(
                    tokens,
                    "            {field_name} OFFSET({offset}) NUMBITS({width}) [],"
                )
                .unwrap();
            } else {
                writeln!(
                    tokens,
                    "            {field_name} OFFSET({offset}) NUMBITS({width}) ["
                )
                .unwrap();
                for e in field.enum_values() {
                    writeln!(
                        tokens,
                        "                {} = {},",
                        camel_case(e.name()),
                        hex_const(e.value())
                    )
                    .unwrap();
                }
                writeln!(tokens, "            ],").unwrap();
            }
        }
        writeln!(tokens, "        ],").unwrap();
    }
    if tokens.is_empty() {
        return tokens;
    }

    let mut output = String::new();
    writeln!(output, "    register_bitfields! {{").unwrap();
    writeln!(output, "        {},", word_type(map)).unwrap();
    write!(output, "{tokens}").unwrap();
    writeln!(output, "    }}").unwrap();
    output
}

/// Generate the `register_structs!` invocation. Offsets are relative to the
/// base address; reserved spans become `_reservedN` padding.
fn generate_register_structs(map: &RegisterMap) -> String {
    let word_ty = word_type(map);
    let base = map.base_address();
    let mut output = String::new();
    writeln!(output, "    register_structs! {{").unwrap();
    writeln!(output, "        pub {} {{", camel_case(map.name())).unwrap();

    let mut reserved_count = 0;
    for slot in map.slots() {
        let offset = slot.address() - base;
        match slot {
            Slot::Reserved(_) => {
                writeln!(
                    output,
                    "            (0x{offset:x} => _reserved{reserved_count}),"
                )
                .unwrap();
                reserved_count += 1;
            }
            Slot::Register(reg) => {
                let reg_type = match reg.access() {
                    AccessMode::ReadWrite => "ReadWrite",
                    AccessMode::ReadOnly => "ReadOnly",
                    AccessMode::WriteOnly => "WriteOnly",
                };
                let type_str = if has_bitfield(map, reg) {
                    format!(
                        "tock_registers::registers::{reg_type}<{word_ty}, super::bits::{}::Register>",
                        camel_case(reg.name())
                    )
                } else {
                    format!("tock_registers::registers::{reg_type}<{word_ty}>")
                };
                writeln!(
                    output,
                    "            (0x{offset:x} => pub {}: {type_str}),",
                    snake_case(reg.name())
                )
                .unwrap();
            }
        }
    }

    let end = map.end_address() - base;
    writeln!(output, "            (0x{end:x} => @END),").unwrap();
    writeln!(output, "        }}").unwrap();
    writeln!(output, "    }}").unwrap();
    output
}
