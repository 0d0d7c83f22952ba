// Licensed under the Apache-2.0 license

//! `cargo xtask regmap` commands.

use anyhow::{bail, Result};
use log::info;
use regmap_generator::project::{build_file, validate_file, validate_spec};
use regmap_generator::{GlobalConfig, WriteMode};
use std::path::Path;

/// Generate (or check) the selected targets of a build specification.
pub fn build(spec: &Path, targets: &[String], out: Option<&Path>, check: bool) -> Result<()> {
    let mode = if check {
        WriteMode::Check
    } else {
        WriteMode::Write
    };
    info!("Building register map from {}", spec.display());
    let artifacts = build_file(spec, targets, out, mode)?;
    if check {
        info!("{} generated files are up to date", artifacts.len());
    } else {
        info!("Generated {} files", artifacts.len());
    }
    Ok(())
}

/// Compile a description and print a summary of the resulting map. A build
/// specification supplies the global configuration.
pub fn validate(file: Option<&Path>, spec: Option<&Path>) -> Result<()> {
    let map = match (file, spec) {
        (file, Some(spec)) => validate_spec(spec, file)?,
        (Some(file), None) => validate_file(file, &GlobalConfig::default())?,
        (None, None) => bail!("nothing to validate; pass a description or --spec"),
    };
    println!(
        "{}: {} registers, {} reserved spans, {:#x}..{:#x} ({}-bit words)",
        map.name(),
        map.registers().len(),
        map.reserved_spans().len(),
        map.base_address(),
        map.end_address(),
        map.word_width().bits()
    );
    for reg in map.registers() {
        println!(
            "  {:#010x} {:<16} {} reset={:#x}",
            reg.address(),
            reg.name(),
            reg.access().short(),
            reg.reset()
        );
    }
    Ok(())
}
