// Licensed under the Apache-2.0 license

//! Python backend.
//!
//! Emits a `RegMap` class driving a bus object with `read(addr)` and
//! `write(addr, data)` methods, and one `_Reg<Name>` helper class per register
//! for field access. Python cannot qualify storage, so every accessor states
//! its access mode in the docstring and raises `PermissionError` when used
//! against it.

use super::Backend;
use crate::model::{AccessMode, Field, Register, RegisterMap};
use crate::output::{Artifact, Language};
use crate::util::{camel_case, python_ident};
use std::fmt::Write;
use std::path::PathBuf;

pub struct PythonBackend {
    path: PathBuf,
}

impl PythonBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Backend for PythonBackend {
    fn name(&self) -> &'static str {
        "python"
    }

    fn emit(&self, map: &RegisterMap) -> Vec<Artifact> {
        vec![Artifact::new(
            self.path.clone(),
            Language::Python,
            generate_module(map),
        )]
    }
}

/// Backslash-escapes `\` and `"` for use inside a docstring.
fn escape_docstring(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn docstring(description: &str, access: AccessMode) -> String {
    if description.is_empty() {
        format!("\"\"\"({access})\"\"\"")
    } else {
        format!("\"\"\"{} ({access})\"\"\"", escape_docstring(description))
    }
}

/// Address literal, zero-padded to at least four hex digits.
fn addr_literal(addr: u64) -> String {
    format!("{addr:#06x}")
}

fn generate_module(map: &RegisterMap) -> String {
    let mut output = String::new();
    let version = env!("CARGO_PKG_VERSION");
    writeln!(output, "#!/usr/bin/env python3").unwrap();
    writeln!(output, "# -*- coding: utf-8 -*-").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "\"\"\" Created with regmap-generator v{version}").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Register map {}.", map.name()).unwrap();
    writeln!(output, "\"\"\"").unwrap();
    writeln!(output).unwrap();

    for reg in map.registers() {
        writeln!(output).unwrap();
        generate_field_class(&mut output, reg);
        writeln!(output).unwrap();
    }

    writeln!(output).unwrap();
    generate_map_class(&mut output, map);
    output
}

fn generate_field_class(output: &mut String, reg: &Register) {
    let reg_upper = reg.name().to_uppercase();
    writeln!(output, "class _Reg{}:", camel_case(reg.name())).unwrap();
    writeln!(output, "    def __init__(self, rmap):").unwrap();
    writeln!(output, "        self._rmap = rmap").unwrap();

    for f in reg.fields() {
        writeln!(output).unwrap();
        generate_field_accessors(output, &reg_upper, f);
    }
}

fn generate_field_accessors(output: &mut String, reg_upper: &str, f: &Field) {
    let ident = python_ident(f.name());
    let field_upper = f.name().to_uppercase();
    let consts = format!("self._rmap.{reg_upper}_{field_upper}");
    let addr = format!("self._rmap.{reg_upper}_ADDR");

    writeln!(output, "    @property").unwrap();
    writeln!(output, "    def {ident}(self):").unwrap();
    writeln!(output, "        {}", docstring(f.description(), f.access())).unwrap();
    if f.access().can_read() {
        writeln!(output, "        rdata = self._rmap._if.read({addr})").unwrap();
        writeln!(
            output,
            "        return (rdata >> {consts}_POS) & {consts}_MSK"
        )
        .unwrap();
    } else {
        writeln!(
            output,
            "        raise PermissionError(\"{reg_upper}.{field_upper} is write-only\")"
        )
        .unwrap();
    }
    writeln!(output).unwrap();

    writeln!(output, "    @{ident}.setter").unwrap();
    writeln!(output, "    def {ident}(self, val):").unwrap();
    if f.access().can_write() {
        writeln!(output, "        rdata = self._rmap._if.read({addr})").unwrap();
        writeln!(
            output,
            "        rdata = rdata & (~({consts}_MSK << {consts}_POS))"
        )
        .unwrap();
        writeln!(
            output,
            "        rdata = rdata | ((val & {consts}_MSK) << {consts}_POS)"
        )
        .unwrap();
        writeln!(output, "        self._rmap._if.write({addr}, rdata)").unwrap();
    } else {
        writeln!(
            output,
            "        raise PermissionError(\"{reg_upper}.{field_upper} is read-only\")"
        )
        .unwrap();
    }
}

fn generate_map_class(output: &mut String, map: &RegisterMap) {
    writeln!(output, "class RegMap:").unwrap();
    writeln!(output, "    \"\"\"Register map {}\"\"\"", map.name()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "    BASE_ADDR = {}", addr_literal(map.base_address())).unwrap();

    for reg in map.registers() {
        let reg_upper = reg.name().to_uppercase();
        writeln!(output).unwrap();
        if reg.description().is_empty() {
            writeln!(output, "    # {}", reg.name()).unwrap();
        } else {
            writeln!(output, "    # {} - {}", reg.name(), reg.description()).unwrap();
        }
        writeln!(
            output,
            "    {reg_upper}_ADDR = {}",
            addr_literal(reg.address())
        )
        .unwrap();
        writeln!(output, "    {reg_upper}_RESET = {:#x}", reg.reset()).unwrap();
        for f in reg.fields() {
            let name = format!("{reg_upper}_{}", f.name().to_uppercase());
            writeln!(output, "    {name}_POS = {}", f.lsb()).unwrap();
            writeln!(output, "    {name}_MSK = {:#x}", f.mask() >> f.lsb()).unwrap();
            for e in f.enum_values() {
                writeln!(
                    output,
                    "    {name}_{} = {:#x}",
                    e.name().to_uppercase(),
                    e.value()
                )
                .unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "    def __init__(self, interface):").unwrap();
    writeln!(output, "        self._if = interface").unwrap();

    for reg in map.registers() {
        let ident = python_ident(reg.name());
        let reg_upper = reg.name().to_uppercase();
        let access = reg.access();

        writeln!(output).unwrap();
        writeln!(output, "    @property").unwrap();
        writeln!(output, "    def {ident}(self):").unwrap();
        writeln!(output, "        {}", docstring(reg.description(), access)).unwrap();
        if access.can_read() {
            writeln!(output, "        return self._if.read(self.{reg_upper}_ADDR)").unwrap();
        } else {
            writeln!(
                output,
                "        raise PermissionError(\"{reg_upper} is write-only\")"
            )
            .unwrap();
        }
        writeln!(output).unwrap();
        writeln!(output, "    @{ident}.setter").unwrap();
        writeln!(output, "    def {ident}(self, val):").unwrap();
        if access.can_write() {
            writeln!(
                output,
                "        self._if.write(self.{reg_upper}_ADDR, val)"
            )
            .unwrap();
        } else {
            writeln!(
                output,
                "        raise PermissionError(\"{reg_upper} is read-only\")"
            )
            .unwrap();
        }
        writeln!(output).unwrap();
        writeln!(output, "    @property").unwrap();
        writeln!(output, "    def {ident}_bf(self):").unwrap();
        writeln!(output, "        return _Reg{}(self)", camel_case(reg.name())).unwrap();
    }
}
