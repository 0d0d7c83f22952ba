// Licensed under the Apache-2.0 license

//! Build configuration.
//!
//! [`GlobalConfig`] holds the options that affect compilation of every
//! register map. [`BuildSpec`] is the TOML file that names the input
//! description, the global options and the set of output [`Target`]s:
//!
//! ```toml
//! regmap = "regs.json"
//!
//! [globcfg]
//! data_width = 32
//! name_case = "upper"
//!
//! [targets.c]
//! generator = "c-header"
//! path = "sw/regs.h"
//!
//! [targets.py]
//! generator = "python"
//! path = "sw/regs.py"
//!
//! [targets.doc]
//! generator = "markdown"
//! title = "UART registers"
//! ```

use crate::description::deserialize_int;
use crate::error::SchemaError;
use crate::model::WordWidth;
use anyhow::{bail, Context};
use serde::de::Deserializer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Case applied to register, field and enumerated value names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// Names are used as written.
    #[default]
    None,
    Upper,
    Lower,
}

impl NameCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            NameCase::None => name.to_string(),
            NameCase::Upper => name.to_ascii_uppercase(),
            NameCase::Lower => name.to_ascii_lowercase(),
        }
    }
}

/// Options shared by every register map of a build.
///
/// # Example
///
/// ```
/// use regmap_generator::config::{GlobalConfig, NameCase};
///
/// let config = GlobalConfig::new()
///     .data_width(16)
///     .name_case(NameCase::Upper)
///     .base_address(0x4000_0000);
/// assert_eq!(config.data_width, 16);
/// assert_eq!(config.base_address, Some(0x4000_0000));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Register word width in bits: 8, 16, 32 or 64.
    #[serde(deserialize_with = "deserialize_int")]
    pub data_width: u32,

    pub name_case: NameCase,

    /// Overrides the base address of the description when set.
    #[serde(deserialize_with = "deserialize_int_opt")]
    pub base_address: Option<u64>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            data_width: WordWidth::default().bits(),
            name_case: NameCase::None,
            base_address: None,
        }
    }
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_width(mut self, bits: u32) -> Self {
        self.data_width = bits;
        self
    }

    pub fn name_case(mut self, case: NameCase) -> Self {
        self.name_case = case;
        self
    }

    pub fn base_address(mut self, address: u64) -> Self {
        self.base_address = Some(address);
        self
    }

    pub fn word_width(&self) -> Result<WordWidth, SchemaError> {
        WordWidth::new(self.data_width)
    }
}

fn deserialize_int_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_int(deserializer).map(Some)
}

fn default_c_path() -> PathBuf {
    PathBuf::from("regs.h")
}

fn default_rust_path() -> PathBuf {
    PathBuf::from("regs.rs")
}

fn default_python_path() -> PathBuf {
    PathBuf::from("regs.py")
}

fn default_json_path() -> PathBuf {
    PathBuf::from("regs.json")
}

fn default_markdown_path() -> PathBuf {
    PathBuf::from("regs.md")
}

fn default_markdown_title() -> String {
    "Register map".to_string()
}

fn default_true() -> bool {
    true
}

/// One output of a build, selected by its `generator` key.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "generator", rename_all = "kebab-case")]
pub enum Target {
    CHeader {
        #[serde(default = "default_c_path")]
        path: PathBuf,
        /// Symbol prefix; defaults to the map name in upper case.
        #[serde(default)]
        prefix: Option<String>,
    },
    Rust {
        #[serde(default = "default_rust_path")]
        path: PathBuf,
    },
    Python {
        #[serde(default = "default_python_path")]
        path: PathBuf,
    },
    Json {
        #[serde(default = "default_json_path")]
        path: PathBuf,
    },
    Markdown {
        #[serde(default = "default_markdown_path")]
        path: PathBuf,
        #[serde(default = "default_markdown_title")]
        title: String,
        /// Emit the table of access modes and modifiers.
        #[serde(default = "default_true")]
        print_conventions: bool,
        /// Emit a WaveDrom bit diagram per register.
        #[serde(default)]
        print_images: bool,
    },
}

impl Target {
    /// Output path relative to the build output directory.
    pub fn path(&self) -> &Path {
        match self {
            Target::CHeader { path, .. }
            | Target::Rust { path }
            | Target::Python { path }
            | Target::Json { path }
            | Target::Markdown { path, .. } => path,
        }
    }
}

/// A build specification file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSpec {
    /// Register map description; relative paths are resolved against the
    /// directory of the build specification by [`BuildSpec::load`].
    pub regmap: PathBuf,
    #[serde(default)]
    pub globcfg: GlobalConfig,
    #[serde(default)]
    pub targets: BTreeMap<String, Target>,
}

impl BuildSpec {
    pub fn from_toml(src: &str) -> anyhow::Result<Self> {
        toml::from_str(src).context("failed to parse build specification")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut spec = Self::from_toml(&src).with_context(|| format!("in {}", path.display()))?;
        if spec.regmap.is_relative() {
            if let Some(dir) = path.parent() {
                spec.regmap = dir.join(&spec.regmap);
            }
        }
        Ok(spec)
    }

    /// Resolves target names. An empty selection, or one containing `all`,
    /// selects every target in name order.
    pub fn select_targets(&self, names: &[String]) -> anyhow::Result<Vec<(&str, &Target)>> {
        if names.is_empty() || names.iter().any(|n| n == "all") {
            return Ok(self
                .targets
                .iter()
                .map(|(name, target)| (name.as_str(), target))
                .collect());
        }
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            match self.targets.get_key_value(name) {
                Some((name, target)) => selected.push((name.as_str(), target)),
                None => bail!(
                    "unknown target {name:?}; available: all, {}",
                    self.targets.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            }
        }
        Ok(selected)
    }
}
