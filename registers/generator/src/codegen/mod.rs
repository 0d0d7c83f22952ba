// Licensed under the Apache-2.0 license

//! Code generation backends.
//!
//! Every backend is a pure function of a validated [`RegisterMap`]: the same
//! map always produces byte-identical artifacts, and generation has no error
//! path because the map was fully checked by [`crate::compile`].
//!
//! | generator  | backend                         | default path |
//! |------------|---------------------------------|--------------|
//! | `c-header` | [`c_header::CHeaderBackend`]    | `regs.h`     |
//! | `rust`     | [`rust::RustBackend`]           | `regs.rs`    |
//! | `python`   | [`python::PythonBackend`]       | `regs.py`    |
//! | `json`     | [`json::JsonBackend`]           | `regs.json`  |
//! | `markdown` | [`markdown::MarkdownBackend`]   | `regs.md`    |

pub mod c_header;
pub mod json;
pub mod markdown;
pub mod python;
pub mod rust;


use crate::config::Target;
use crate::model::{Field, Register, RegisterMap, WordWidth};
use crate::output::Artifact;
use log::debug;

/// A code generator for one output language.
pub trait Backend {
    /// Generator name as used in build specifications.
    fn name(&self) -> &'static str;

    fn emit(&self, map: &RegisterMap) -> Vec<Artifact>;
}

/// Creates the backend configured by `target`.
pub fn backend_for(target: &Target) -> Box<dyn Backend> {
    match target {
        Target::CHeader { path, prefix } => Box::new(c_header::CHeaderBackend::new(
            path.clone(),
            prefix.clone(),
        )),
        Target::Rust { path } => Box::new(rust::RustBackend::new(path.clone())),
        Target::Python { path } => Box::new(python::PythonBackend::new(path.clone())),
        Target::Json { path } => Box::new(json::JsonBackend::new(path.clone())),
        Target::Markdown {
            path,
            title,
            print_conventions,
            print_images,
        } => Box::new(markdown::MarkdownBackend {
            path: path.clone(),
            title: title.clone(),
            print_conventions: *print_conventions,
            print_images: *print_images,
        }),
    }
}

/// Runs the backends of `targets` in order and collects their artifacts.
pub fn generate<'a>(
    map: &RegisterMap,
    targets: impl IntoIterator<Item = &'a Target>,
) -> Vec<Artifact> {
    let mut artifacts = Vec::new();
    for target in targets {
        let backend = backend_for(target);
        let emitted = backend.emit(map);
        for a in &emitted {
            debug!(
                "{}: {} generated {} ({} bytes)",
                map.name(),
                backend.name(),
                a.path.display(),
                a.content.len()
            );
        }
        artifacts.extend(emitted);
    }
    artifacts
}

/// A run of bits inside a register word.
pub(crate) enum BitRun<'a> {
    Field(&'a Field),
    /// Bits not covered by any field.
    Padding(u32),
}

/// Walks a register word from bit 0 upwards, yielding fields and the padding
/// between them.
pub(crate) fn bit_runs(register: &Register, word: WordWidth) -> Vec<BitRun<'_>> {
    let mut runs = Vec::new();
    let mut next = 0;
    for f in register.fields_by_lsb() {
        if f.lsb() > next {
            runs.push(BitRun::Padding(f.lsb() - next));
        }
        runs.push(BitRun::Field(f));
        next = f.bits().end;
    }
    if next < word.bits() {
        runs.push(BitRun::Padding(word.bits() - next));
    }
    runs
}
