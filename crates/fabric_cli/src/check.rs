//! `fabric check-config`: validates a run directory.
//!
//! Loads `fabric.toml`, resolves the placer, then opens the chip database it
//! names (relative to the run directory) and applies the tuning to a fresh
//! context, so every error a real run would hit at startup surfaces here.

use std::path::Path;

use fabric_arch::{Context, Device};
use fabric_config::FabricConfig;

use crate::GlobalArgs;

/// Runs `fabric check-config`.
pub fn run(dir: &Path, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = fabric_config::load_config(dir)?;
    if !global.quiet {
        eprintln!("    Checking {}", dir.join(fabric_config::CONFIG_FILE_NAME).display());
    }
    print!("{}", summarize(&config)?);

    let chipdb = dir.join(&config.device.chipdb);
    let mut ctx = Context::new(Device::load(&chipdb)?);
    ctx.apply_config(&config)?;
    println!(
        "device {} ({}) opened: {} x {} tiles",
        ctx.device().chip_name(),
        ctx.device().family(),
        ctx.device().width(),
        ctx.device().height()
    );
    Ok(0)
}

/// Formats the effective settings of a configuration.
pub fn summarize(config: &FabricConfig) -> Result<String, fabric_config::ConfigError> {
    let est = config.estimator;
    Ok(format!(
        "chipdb:   {}\nplacer:   {}\nripup:    {} ps\ncluster:  {} bels\nbbox:     {} per unit above {}\n",
        config.device.chipdb,
        config.placer()?,
        config.route.ripup_delay_penalty,
        est.cluster_bels,
        est.bbox_cost_per_unit,
        est.bbox_cost_threshold
    ))
}
