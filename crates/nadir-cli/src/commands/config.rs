use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nadir_core::pipeline::config::RunConfig;
use nadir_core::stage::{CleanConfig, OrientConfig};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default RunConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let mut config = RunConfig::new("frames", "orientation.csv", "selected");
    config.orient = Some(OrientConfig::default());
    // No sensible default exists for the blur percentile; 10 is a placeholder to edit.
    config.clean = Some(CleanConfig::new(10.0));
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
