// Licensed under the Apache-2.0 license

//! JSON backend: a normalized dump of the validated model, including derived
//! values (masks, register resets and access, reserved spans).

use super::Backend;
use crate::model::{Field, Register, RegisterMap};
use crate::output::{Artifact, Language};
use serde_json::{json, Value};
use std::path::PathBuf;

pub struct JsonBackend {
    path: PathBuf,
}

impl JsonBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Backend for JsonBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn emit(&self, map: &RegisterMap) -> Vec<Artifact> {
        // Display with `#` pretty-prints and cannot fail for a `Value`.
        let content = format!("{:#}\n", to_value(map));
        vec![Artifact::new(self.path.clone(), Language::Json, content)]
    }
}

pub(crate) fn to_value(map: &RegisterMap) -> Value {
    json!({
        "name": map.name(),
        "data_width": map.word_width().bits(),
        "base_address": map.base_address(),
        "end_address": map.end_address(),
        "registers": map.registers().iter().map(register_value).collect::<Vec<_>>(),
        "reserved": map
            .reserved_spans()
            .iter()
            .map(|s| json!({ "start_address": s.start_address, "words": s.words }))
            .collect::<Vec<_>>(),
    })
}

fn register_value(reg: &Register) -> Value {
    json!({
        "name": reg.name(),
        "description": reg.description(),
        "address": reg.address(),
        "access": reg.access().short(),
        "reset": reg.reset(),
        "fields": reg.fields().iter().map(field_value).collect::<Vec<_>>(),
    })
}

fn field_value(field: &Field) -> Value {
    json!({
        "name": field.name(),
        "description": field.description(),
        "lsb": field.lsb(),
        "msb": field.msb(),
        "width": field.width(),
        "mask": field.mask(),
        "access": field.access().short(),
        "modifiers": field.modifiers().iter().map(|m| m.as_str()).collect::<Vec<_>>(),
        "reset": field.reset(),
        "enums": field
            .enum_values()
            .iter()
            .map(|e| json!({
                "name": e.name(),
                "value": e.value(),
                "description": e.description(),
            }))
            .collect::<Vec<_>>(),
    })
}
