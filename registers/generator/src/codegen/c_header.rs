// Licensed under the Apache-2.0 license

//! C header backend.
//!
//! For every register the header carries `_ADDR`/`_RESET` defines, a bit-field
//! struct and a `_WIDTH`/`_LSB`/`_MASK`/`_RESET` block per field. The map
//! itself becomes a struct of `union { word; bit-field view }` members padded
//! with `RESERVEDn` arrays, overlaid on the base address by a pointer macro.

use super::{bit_runs, Backend, BitRun};
use crate::layout::Slot;
use crate::model::{AccessMode, Register, RegisterMap};
use crate::output::{Artifact, Language};
use crate::util::hex_literal;
use std::fmt::Write;
use std::path::PathBuf;

pub struct CHeaderBackend {
    path: PathBuf,
    prefix: Option<String>,
}

impl CHeaderBackend {
    pub fn new(path: PathBuf, prefix: Option<String>) -> Self {
        Self { path, prefix }
    }

    fn guard(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "REGS".to_string());
        let stem: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("__{stem}_H")
    }
}

/// Storage qualifier for an access mode.
fn qualifier(access: AccessMode) -> &'static str {
    match access {
        AccessMode::ReadOnly => "__I",
        AccessMode::WriteOnly => "__O",
        AccessMode::ReadWrite => "__IO",
    }
}

/// Comment text with trailing backslashes removed, so that the comment never
/// continues onto the next line.
fn comment_text(description: &str) -> &str {
    description.trim_end_matches('\\')
}

fn title(name: &str, description: &str) -> String {
    if description.is_empty() {
        name.to_string()
    } else {
        format!("{name} - {}", comment_text(description))
    }
}

fn trailing_comment(description: &str) -> String {
    if description.is_empty() {
        String::new()
    } else {
        format!(" // {}", comment_text(description))
    }
}

impl Backend for CHeaderBackend {
    fn name(&self) -> &'static str {
        "c-header"
    }

    fn emit(&self, map: &RegisterMap) -> Vec<Artifact> {
        let prefix = self
            .prefix
            .clone()
            .unwrap_or_else(|| map.name().to_string())
            .to_uppercase();
        let content = generate_header(map, &prefix, &self.guard());
        vec![Artifact::new(self.path.clone(), Language::C, content)]
    }
}

fn generate_header(map: &RegisterMap, prefix: &str, guard: &str) -> String {
    let mut output = String::new();
    let version = env!("CARGO_PKG_VERSION");
    writeln!(output, "// Created with regmap-generator v{version}").unwrap();
    writeln!(output, "#ifndef {guard}").unwrap();
    writeln!(output, "#define {guard}").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "#define __I  volatile const // 'read only' permissions").unwrap();
    writeln!(output, "#define __O  volatile       // 'write only' permissions").unwrap();
    writeln!(output, "#define __IO volatile       // 'read / write' permissions").unwrap();
    writeln!(output).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "#ifdef __cplusplus").unwrap();
    writeln!(output, "#include <cstdint>").unwrap();
    writeln!(output, "extern \"C\" {{").unwrap();
    writeln!(output, "#else").unwrap();
    writeln!(output, "#include <stdint.h>").unwrap();
    writeln!(output, "#endif").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "#define {prefix}_BASE_ADDR {}",
        hex_literal(map.base_address())
    )
    .unwrap();
    writeln!(output).unwrap();

    for reg in map.registers() {
        generate_register(&mut output, map, reg, prefix);
    }

    generate_map_struct(&mut output, map, prefix);

    writeln!(output, "#ifdef __cplusplus").unwrap();
    writeln!(output, "}}").unwrap();
    writeln!(output, "#endif").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "#endif /* {guard} */").unwrap();
    output
}

fn generate_register(output: &mut String, map: &RegisterMap, reg: &Register, prefix: &str) {
    let word = map.word_width();
    let storage = format!("uint{}_t", word.bits());
    let reg_upper = reg.name().to_uppercase();
    let pfx_lower = prefix.to_lowercase();
    let reg_lower = reg.name().to_lowercase();

    writeln!(output, "// {}", title(reg.name(), reg.description())).unwrap();
    writeln!(
        output,
        "#define {prefix}_{reg_upper}_ADDR {}",
        hex_literal(reg.address())
    )
    .unwrap();
    writeln!(
        output,
        "#define {prefix}_{reg_upper}_RESET {}",
        hex_literal(reg.reset())
    )
    .unwrap();

    writeln!(output, "typedef struct {{").unwrap();
    for run in bit_runs(reg, word) {
        match run {
            BitRun::Field(f) => writeln!(
                output,
                "    {storage} {} : {};{}",
                f.name(),
                f.width(),
                trailing_comment(f.description())
            )
            .unwrap(),
            BitRun::Padding(width) => {
                writeln!(output, "    {storage} : {width}; // reserved").unwrap()
            }
        }
    }
    writeln!(output, "}} {pfx_lower}_{reg_lower}_t;").unwrap();
    writeln!(output).unwrap();

    for f in reg.fields() {
        let field_upper = f.name().to_uppercase();
        let define = format!("{prefix}_{reg_upper}_{field_upper}");
        writeln!(
            output,
            "// {}",
            title(&format!("{}.{}", reg.name(), f.name()), f.description())
        )
        .unwrap();
        writeln!(output, "#define {define}_WIDTH {}", f.width()).unwrap();
        writeln!(output, "#define {define}_LSB {}", f.lsb()).unwrap();
        writeln!(output, "#define {define}_MASK {}", hex_literal(f.mask())).unwrap();
        writeln!(output, "#define {define}_RESET {}", hex_literal(f.reset())).unwrap();
        if !f.enum_values().is_empty() {
            writeln!(output, "typedef enum {{").unwrap();
            for e in f.enum_values() {
                let comment = if e.description().is_empty() {
                    String::new()
                } else {
                    format!(" //{}", comment_text(e.description()))
                };
                writeln!(
                    output,
                    "    {define}_{} = {},{comment}",
                    e.name().to_uppercase(),
                    hex_literal(e.value())
                )
                .unwrap();
            }
            writeln!(
                output,
                "}} {pfx_lower}_{reg_lower}_{}_t;",
                f.name().to_lowercase()
            )
            .unwrap();
        }
        writeln!(output).unwrap();
    }
}

fn generate_map_struct(output: &mut String, map: &RegisterMap, prefix: &str) {
    let storage = format!("uint{}_t", map.word_width().bits());
    let pfx_lower = prefix.to_lowercase();

    writeln!(output).unwrap();
    writeln!(output, "// Register map structure").unwrap();
    writeln!(output, "typedef struct {{").unwrap();
    let mut reserved_count = 0;
    for slot in map.slots() {
        match slot {
            Slot::Reserved(span) => {
                writeln!(
                    output,
                    "    __IO {storage} RESERVED{reserved_count}[{}];",
                    span.words
                )
                .unwrap();
                reserved_count += 1;
            }
            Slot::Register(reg) => {
                let q = qualifier(reg.access());
                let name = reg.name();
                let reg_lower = name.to_lowercase();
                writeln!(output, "    union {{").unwrap();
                writeln!(
                    output,
                    "        {q} {storage} {name};{}",
                    trailing_comment(reg.description())
                )
                .unwrap();
                writeln!(
                    output,
                    "        {q} {pfx_lower}_{reg_lower}_t {name}_bf; // Bit access for {name} register"
                )
                .unwrap();
                writeln!(output, "    }};").unwrap();
            }
        }
    }
    writeln!(output, "}} {pfx_lower}_t;").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "#define {prefix} (({pfx_lower}_t*)({prefix}_BASE_ADDR))"
    )
    .unwrap();
    writeln!(output).unwrap();
}
