// Licensed under the Apache-2.0 license

//! Build driver: build specification in, artifacts out.

use crate::codegen::generate;
use crate::compiler::compile_with_config;
use crate::config::{BuildSpec, GlobalConfig};
use crate::description::RegisterMapDesc;
use crate::model::RegisterMap;
use crate::output::Artifact;
use crate::writer::{write_artifacts, WriteMode};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Loads and compiles the register map named by `spec`.
pub fn compile_spec(spec: &BuildSpec) -> Result<RegisterMap> {
    let desc = RegisterMapDesc::load(&spec.regmap)?;
    compile_with_config(&desc, &spec.globcfg)
        .with_context(|| format!("invalid register map {}", spec.regmap.display()))
}

/// Compiles the register map and runs the selected targets (all of them when
/// `target_names` is empty).
pub fn build(spec: &BuildSpec, target_names: &[String]) -> Result<Vec<Artifact>> {
    let targets = spec.select_targets(target_names)?;
    let map = compile_spec(spec)?;
    info!(
        "Compiled {}: {} registers, {} reserved spans",
        map.name(),
        map.registers().len(),
        map.reserved_spans().len()
    );
    Ok(generate(&map, targets.into_iter().map(|(_, t)| t)))
}

/// Builds from a build spec file. Artifacts land in `out_dir`, or next to
/// the build spec file when no directory is given.
pub fn build_file(
    spec_path: &Path,
    target_names: &[String],
    out_dir: Option<&Path>,
    mode: WriteMode,
) -> Result<Vec<Artifact>> {
    let spec = BuildSpec::load(spec_path)?;
    let artifacts = build(&spec, target_names)?;
    let out_dir = match out_dir {
        Some(dir) => dir,
        None => spec_path.parent().unwrap_or(Path::new(".")),
    };
    write_artifacts(out_dir, &artifacts, mode)?;
    Ok(artifacts)
}

/// Loads and compiles a description with the given configuration.
pub fn validate_file(path: &Path, config: &GlobalConfig) -> Result<RegisterMap> {
    let desc = RegisterMapDesc::load(path)?;
    compile_with_config(&desc, config)
        .with_context(|| format!("invalid register map {}", path.display()))
}

/// Compiles `file`, or the description named by the build spec, with
/// the build spec's global configuration.
pub fn validate_spec(spec_path: &Path, file: Option<&Path>) -> Result<RegisterMap> {
    let spec = BuildSpec::load(spec_path)?;
    match file {
        Some(file) => validate_file(file, &spec.globcfg),
        None => compile_spec(&spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESC: &str = r#"{
        "name": "gpio",
        "base_address": "0x1000",
        "registers": [
            { "name": "OUT", "address": "0x1000", "fields": [{ "name": "PINS", "width": 8 }] },
            { "name": "IN", "address": "0x1008", "fields": [{ "name": "PINS", "width": 8, "access": "ro" }] }
        ]
    }"#;

    const SPEC: &str = r#"
regmap = "gpio.json"

[targets.c]
generator = "c-header"
path = "sw/gpio.h"

[targets.rs]
generator = "rust"
path = "src/gpio.rs"
"#;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gpio.json"), DESC).unwrap();
        std::fs::write(dir.path().join("regbuild.toml"), SPEC).unwrap();
        dir
    }

    #[test]
    fn test_build_file_writes_next_to_spec() {
        let dir = project();
        let spec = dir.path().join("regbuild.toml");
        let artifacts = build_file(&spec, &[], None, WriteMode::Write).unwrap();
        assert_eq!(artifacts.len(), 2);
        let header = std::fs::read_to_string(dir.path().join("sw/gpio.h")).unwrap();
        assert!(header.contains("#define GPIO_IN_ADDR 0x1008\n"));
        assert!(header.contains("    __IO uint32_t RESERVED0[1];\n"));
        assert!(dir.path().join("src/gpio.rs").exists());

        build_file(&spec, &[], None, WriteMode::Check).unwrap();
    }

    #[test]
    fn test_build_selected_target_into_out_dir() {
        let dir = project();
        let out = tempfile::tempdir().unwrap();
        let spec = dir.path().join("regbuild.toml");
        build_file(&spec, &["rs".to_string()], Some(out.path()), WriteMode::Write).unwrap();
        assert!(out.path().join("src/gpio.rs").exists());
        assert!(!out.path().join("sw/gpio.h").exists());
    }

    #[test]
    fn test_check_detects_stale_output() {
        let dir = project();
        let spec = dir.path().join("regbuild.toml");
        build_file(&spec, &[], None, WriteMode::Write).unwrap();
        let desc = DESC.replace("0x1008", "0x1004");
        std::fs::write(dir.path().join("gpio.json"), desc).unwrap();
        let err = build_file(&spec, &[], None, WriteMode::Check).unwrap_err();
        assert!(format!("{err:#}").contains("out of date"));
    }

    #[test]
    fn test_validate_file_reports_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, DESC.replace("0x1008", "0x1000")).unwrap();
        let err = validate_file(&path, &GlobalConfig::default()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid register map"), "{msg}");
        assert!(msg.contains("both declared at address 0x1000"), "{msg}");
    }

    #[test]
    fn test_validate_with_build_spec_config() {
        let dir = tempfile::tempdir().unwrap();
        let desc = dir.path().join("io.json");
        std::fs::write(
            &desc,
            r#"{
                "name": "io",
                "registers": [
                    { "name": "PORT", "address": "0x2", "fields": [{ "name": "PIN", "width": 4 }] }
                ]
            }"#,
        )
        .unwrap();
        let spec = dir.path().join("regbuild.toml");
        std::fs::write(
            &spec,
            "regmap = \"io.json\"\n[globcfg]\ndata_width = 16\nbase_address = \"0x0\"\n",
        )
        .unwrap();

        // 0x2 is misaligned for the default 32-bit word
        let err = validate_file(&desc, &GlobalConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("not a multiple of the 4-byte word"));

        let map = validate_spec(&spec, None).unwrap();
        assert_eq!(map.word_width().bits(), 16);
        assert_eq!(map.reserved_spans().len(), 1);

        let other = dir.path().join("other.json");
        std::fs::write(&other, std::fs::read_to_string(&desc).unwrap()).unwrap();
        let map = validate_spec(&spec, Some(&other)).unwrap();
        assert_eq!(map.end_address(), 0x4);
    }
}
