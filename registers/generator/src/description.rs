// Licensed under the Apache-2.0 license

//! Serialized register map descriptions.
//!
//! A description is the unvalidated input to [`crate::compile`]. It can be
//! written in JSON or TOML; integers are accepted either natively or as
//! strings in decimal, `0x` hex or `0b` binary form (underscores allowed).
//!
//! ```toml
//! name = "uart"
//! base_address = "0x4000_0000"
//!
//! [[registers]]
//! name = "CTRL"
//! address = "0x4000_0000"
//!
//! [[registers.fields]]
//! name = "EN"
//! width = 1
//! lsb = 0
//! reset = 1
//! ```

use crate::model::{AccessMode, Modifier};
use anyhow::{anyhow, bail, Context};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterMapDesc {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_int")]
    pub base_address: u64,
    #[serde(default)]
    pub registers: Vec<RegisterDesc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterDesc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_int")]
    pub address: u64,
    #[serde(default, alias = "bitfields")]
    pub fields: Vec<FieldDesc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDesc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_width", deserialize_with = "deserialize_int")]
    pub width: u32,
    #[serde(default, deserialize_with = "deserialize_int")]
    pub lsb: u32,
    #[serde(default)]
    pub access: AccessMode,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, alias = "initial", deserialize_with = "deserialize_int")]
    pub reset: u64,
    #[serde(default, alias = "enum_values")]
    pub enums: Vec<EnumDesc>,
}

impl Default for FieldDesc {
    fn default() -> Self {
        FieldDesc {
            name: String::new(),
            description: String::new(),
            width: default_width(),
            lsb: 0,
            access: AccessMode::default(),
            modifiers: Vec::new(),
            reset: 0,
            enums: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDesc {
    pub name: String,
    #[serde(deserialize_with = "deserialize_int")]
    pub value: u64,
    #[serde(default)]
    pub description: String,
}

fn default_width() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(u64),
    Str(String),
}

pub(crate) fn deserialize_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => v,
        IntOrString::Str(s) => parse_int(&s).map_err(de::Error::custom)?,
    };
    T::try_from(value).map_err(|_| de::Error::custom(format!("integer {value:#x} out of range")))
}

/// Parses `42`, `0x2a`, `0b101010` or `0x4000_0000`.
pub fn parse_int(src: &str) -> anyhow::Result<u64> {
    let cleaned: String = src.trim().chars().filter(|&c| c != '_').collect();
    let (digits, radix) = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        (bin, 2)
    } else {
        (cleaned.as_str(), 10)
    };
    u64::from_str_radix(digits, radix).map_err(|e| anyhow!("invalid integer {src:?}: {e}"))
}

impl RegisterMapDesc {
    pub fn from_json(src: &str) -> anyhow::Result<Self> {
        serde_json::from_str(src).context("failed to parse register map JSON")
    }

    pub fn from_toml(src: &str) -> anyhow::Result<Self> {
        toml::from_str(src).context("failed to parse register map TOML")
    }

    /// Reads a description, picking the format from the file extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let desc = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&src),
            Some("toml") => Self::from_toml(&src),
            _ => bail!(
                "{}: unknown register map format (expected .json or .toml)",
                path.display()
            ),
        };
        desc.with_context(|| format!("in {}", path.display()))
    }
}
