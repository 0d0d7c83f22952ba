// Licensed under the Apache-2.0 license

//! Markdown documentation backend.
//!
//! The document opens with the access-mode conventions and a summary of all
//! registers, followed by one section per register with its field table (most
//! significant bits first, reserved bits included) and a table per field with
//! enumerated values. Bit diagrams are emitted as fenced `wavedrom` blocks for
//! renderers that understand them.

use super::{bit_runs, Backend, BitRun};
use crate::model::{AccessMode, Field, Modifier, Register, RegisterMap};
use crate::output::{Artifact, Language};
use crate::util::hex_literal;
use serde_json::{json, Value};
use std::fmt::Write;
use std::path::PathBuf;

pub struct MarkdownBackend {
    pub path: PathBuf,
    pub title: String,
    pub print_conventions: bool,
    pub print_images: bool,
}

impl Backend for MarkdownBackend {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn emit(&self, map: &RegisterMap) -> Vec<Artifact> {
        vec![Artifact::new(
            self.path.clone(),
            Language::Markdown,
            self.generate_document(map),
        )]
    }
}

const ACCESS_MODES: [(AccessMode, &str); 3] = [
    (
        AccessMode::ReadWrite,
        "Read and Write. The field can be read or written.",
    ),
    (AccessMode::ReadOnly, "Read Only. Write has no effect."),
    (AccessMode::WriteOnly, "Write Only. Zeros are always read."),
];

const MODIFIERS: [(Modifier, &str); 7] = [
    (
        Modifier::SelfClear,
        "Self Clear. The field is cleared on the next clock tick after write.",
    ),
    (
        Modifier::Write1ToClear,
        "Write 1 to Clear. Writing 1 to a bit clears it.",
    ),
    (
        Modifier::Write1ToToggle,
        "Write 1 to Toggle. Writing 1 to a bit inverts it.",
    ),
    (
        Modifier::ReadToClear,
        "Read to Clear. The field is cleared after every read.",
    ),
    (
        Modifier::ReadConst,
        "Read Constant. The field always reads as its reset value.",
    ),
    (
        Modifier::ExternalUpdate,
        "External Update. The field is updated by hardware.",
    ),
    (
        Modifier::Memory,
        "Memory. The field is a port to storage outside the register.",
    ),
];

/// Escapes text for use inside a table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Word-sized hex value, e.g. `0x00000030` for a 32-bit word.
fn word_hex(map: &RegisterMap, value: u64) -> String {
    let digits = (map.word_width().bits() / 4) as usize;
    format!("{value:#0width$x}", width = digits + 2)
}

fn bit_range(msb: u32, lsb: u32) -> String {
    if msb == lsb {
        format!("{lsb}")
    } else {
        format!("{msb}:{lsb}")
    }
}

fn field_access(field: &Field) -> String {
    let mut access = field.access().short().to_string();
    if !field.modifiers().is_empty() {
        let modifiers: Vec<_> = field.modifiers().iter().map(|m| m.as_str()).collect();
        write!(access, " ({})", modifiers.join(", ")).unwrap();
    }
    access
}

/// WaveDrom `reg` description of a register, least significant bits first.
pub(crate) fn wavedrom_value(map: &RegisterMap, reg: &Register) -> Value {
    let runs: Vec<Value> = bit_runs(reg, map.word_width())
        .into_iter()
        .map(|run| match run {
            BitRun::Field(f) => json!({
                "name": f.name().to_uppercase(),
                "bits": f.width(),
                "attr": f.access().short().to_uppercase(),
            }),
            BitRun::Padding(width) => json!({ "bits": width }),
        })
        .collect();
    json!({
        "reg": runs,
        "config": {
            "bits": map.word_width().bits(),
            "lanes": 1,
            "hspace": 800,
        },
    })
}

impl MarkdownBackend {
    fn generate_document(&self, map: &RegisterMap) -> String {
        let mut output = String::new();
        let version = env!("CARGO_PKG_VERSION");
        writeln!(output, "# {}", self.title).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Created with regmap-generator v{version}.").unwrap();
        writeln!(output).unwrap();

        if self.print_conventions {
            generate_conventions(&mut output);
        }

        writeln!(output, "## Register map summary").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Base address: {}",
            word_hex(map, map.base_address())
        )
        .unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Name | Address | Description |").unwrap();
        writeln!(output, "| :--- | :--- | :--- |").unwrap();
        for reg in map.registers() {
            writeln!(
                output,
                "| [{}](#{}) | {} | {} |",
                reg.name(),
                reg.name().to_lowercase(),
                word_hex(map, reg.address()),
                cell(reg.description())
            )
            .unwrap();
        }
        writeln!(output).unwrap();

        for reg in map.registers() {
            self.generate_register(&mut output, map, reg);
        }

        writeln!(output, "Back to [Register map](#register-map-summary).").unwrap();
        output
    }

    fn generate_register(&self, output: &mut String, map: &RegisterMap, reg: &Register) {
        writeln!(output, "## {}", reg.name()).unwrap();
        writeln!(output).unwrap();
        if !reg.description().is_empty() {
            writeln!(output, "{}", reg.description()).unwrap();
            writeln!(output).unwrap();
        }
        writeln!(output, "Address: {}", word_hex(map, reg.address())).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Reset value: {}", word_hex(map, reg.reset())).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Access: {}", reg.access()).unwrap();
        writeln!(output).unwrap();

        if self.print_images {
            writeln!(output, "```wavedrom").unwrap();
            writeln!(output, "{}", wavedrom_value(map, reg)).unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output).unwrap();
        }

        writeln!(output, "| Name | Bits | Mode | Reset | Description |").unwrap();
        writeln!(output, "| :--- | :--- | :--- | :--- | :--- |").unwrap();
        let mut top = map.word_width().bits();
        for run in bit_runs(reg, map.word_width()).into_iter().rev() {
            match run {
                BitRun::Field(f) => {
                    writeln!(
                        output,
                        "| {} | {} | {} | {} | {} |",
                        f.name(),
                        bit_range(f.msb(), f.lsb()),
                        field_access(f),
                        hex_literal(f.reset()),
                        cell(f.description())
                    )
                    .unwrap();
                    top = f.lsb();
                }
                BitRun::Padding(width) => {
                    writeln!(
                        output,
                        "| - | {} | - | 0x0 | Reserved |",
                        bit_range(top - 1, top - width)
                    )
                    .unwrap();
                    top -= width;
                }
            }
        }
        writeln!(output).unwrap();

        for f in reg.fields().iter().filter(|f| !f.enum_values().is_empty()) {
            writeln!(output, "Enumerated values for {}.{}:", reg.name(), f.name()).unwrap();
            writeln!(output).unwrap();
            writeln!(output, "| Name | Value | Description |").unwrap();
            writeln!(output, "| :--- | :--- | :--- |").unwrap();
            for e in f.enum_values() {
                writeln!(
                    output,
                    "| {} | {} | {} |",
                    e.name(),
                    hex_literal(e.value()),
                    cell(e.description())
                )
                .unwrap();
            }
            writeln!(output).unwrap();
        }
    }
}

fn generate_conventions(output: &mut String) {
    writeln!(output, "## Conventions").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "| Access mode | Description |").unwrap();
    writeln!(output, "| :--- | :--- |").unwrap();
    for (access, text) in ACCESS_MODES {
        writeln!(output, "| {} | {text} |", access.short()).unwrap();
    }
    writeln!(output).unwrap();
    writeln!(output, "| Modifier | Description |").unwrap();
    writeln!(output, "| :--- | :--- |").unwrap();
    for (modifier, text) in MODIFIERS {
        writeln!(output, "| {} | {text} |", modifier.as_str()).unwrap();
    }
    writeln!(output).unwrap();
}
