// Licensed under the Apache-2.0 license

//! Writing generated artifacts to disk, or checking that they are current.

use crate::output::Artifact;
use anyhow::{bail, Context, Result};
use log::info;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Create parent directories and write every artifact.
    Write,
    /// Write nothing; fail if any file is missing or differs.
    Check,
}

pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact], mode: WriteMode) -> Result<()> {
    match mode {
        WriteMode::Write => {
            for a in artifacts {
                let dest = out_dir.join(&a.path);
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(&dest, &a.content)
                    .with_context(|| format!("failed to write {}", dest.display()))?;
                info!("Wrote {} ({})", dest.display(), a.language);
            }
        }
        WriteMode::Check => {
            let mut stale = Vec::new();
            for a in artifacts {
                let dest = out_dir.join(&a.path);
                match std::fs::read_to_string(&dest) {
                    Ok(existing) if existing == a.content => {
                        info!("{} is up to date", dest.display());
                    }
                    Ok(_) => stale.push(format!("{} differs", dest.display())),
                    Err(_) => stale.push(format!("{} is missing", dest.display())),
                }
            }
            if !stale.is_empty() {
                bail!(
                    "generated files are out of date:\n  {}\nRun `cargo xtask regmap build` to regenerate.",
                    stale.join("\n  ")
                );
            }
        }
    }
    Ok(())
}
