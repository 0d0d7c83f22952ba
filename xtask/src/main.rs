// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod regmap;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Register map tooling", long_about = None)]
struct Xtask {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile register maps and generate code
    Regmap {
        #[command(subcommand)]
        command: RegmapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum RegmapCommands {
    /// Generate the targets of a build specification
    Build {
        /// Build specification file
        #[arg(short, long, value_name = "FILE", default_value = "regbuild.toml")]
        spec: PathBuf,

        /// Target to generate (repeatable); `all` or no target selects every target
        #[arg(short, long = "target", value_name = "NAME")]
        targets: Vec<String>,

        /// Output directory (defaults to the directory of the build specification)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Check that the generated files are up to date instead of writing them
        #[arg(long)]
        check: bool,
    },
    /// Compile a register map description and report the first violation
    Validate {
        /// Register map description (.json or .toml); defaults to the build
        /// specification's `regmap`
        #[arg(value_name = "FILE", required_unless_present = "spec")]
        file: Option<PathBuf>,

        /// Build specification whose global configuration is applied
        #[arg(short, long, value_name = "FILE")]
        spec: Option<PathBuf>,
    },
}

fn main() {
    let cli = Xtask::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match &cli.xtask {
        Commands::Regmap { command } => match command {
            RegmapCommands::Build {
                spec,
                targets,
                out,
                check,
            } => regmap::build(spec, targets, out.as_deref(), *check),
            RegmapCommands::Validate { file, spec } => {
                regmap::validate(file.as_deref(), spec.as_deref())
            }
        },
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}
