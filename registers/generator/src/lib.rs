// Licensed under the Apache-2.0 license

//! Register map compiler.
//!
//! This crate turns a register map description (registers at fixed addresses,
//! each made of named bit fields) into a validated model and generates
//! hardware access code from it.
//!
//! ## Usage
//!
//! ```
//! use regmap_generator::codegen::generate;
//! use regmap_generator::{compile, RegisterMapDesc, Target};
//!
//! let desc = RegisterMapDesc::from_toml(r#"
//! name = "timer"
//!
//! [[registers]]
//! name = "CTRL"
//! address = "0x4"
//! fields = [{ name = "EN", lsb = 0 }, { name = "DIV", width = 4, lsb = 4, reset = 3 }]
//! "#).unwrap();
//!
//! let map = compile(&desc).unwrap();
//! assert_eq!(map.reserved_spans().len(), 1);
//!
//! let artifacts = generate(&map, &[Target::CHeader { path: "timer.h".into(), prefix: None }]);
//! assert!(artifacts[0].content.contains("#define TIMER_CTRL_RESET 0x30"));
//! ```
//!
//! ## Module Organization
//!
//! - [`description`]: Serialized input ([`RegisterMapDesc`]) in JSON or TOML
//! - [`model`]: Validated fields, registers and the [`RegisterMap`]
//! - [`validate`]: Field overlap, register address and generated symbol checks
//! - [`layout`]: Reserved span computation
//! - [`compiler`]: The compile pipeline ([`compile`], [`compile_units`])
//! - [`codegen`]: Backends (C header, Rust, Python, JSON, Markdown)
//! - [`config`]: Global options and build specifications
//! - [`writer`]: Writing or checking generated files
//! - [`project`]: Build driver used by `cargo xtask regmap`
//! - [`util`]: Name conversion and literal formatting

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod description;
pub mod error;
pub mod layout;
pub mod model;
pub mod output;
pub mod project;
pub mod util;
pub mod validate;
pub mod writer;

pub use codegen::{backend_for, generate, Backend};
pub use compiler::{compile, compile_units, compile_with_config};
pub use config::{BuildSpec, GlobalConfig, NameCase, Target};
pub use description::{EnumDesc, FieldDesc, RegisterDesc, RegisterMapDesc};
pub use error::{CompileError, CompileResult, SchemaError};
pub use layout::{ReservedSpan, Slot};
pub use model::{AccessMode, EnumValue, Field, Modifier, Register, RegisterMap, WordWidth};
pub use output::{Artifact, Language};
pub use writer::{write_artifacts, WriteMode};
