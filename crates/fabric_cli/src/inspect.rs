//! `fabric info`, `pin`, `bel` and `estimate`: read-only device queries.
//!
//! Each command opens the database, formats its answer with a pure
//! `describe_*` function and prints it to stdout. Unknown names are errors
//! and exit non-zero.

use std::path::Path;

use fabric_arch::timing::delay_to_ns;
use fabric_arch::{Context, Device};
use fabric_chipdb::{ChipDbError, PinDir};

use crate::{EstimateArgs, GlobalArgs, ReportFormat};

type CmdResult = Result<i32, Box<dyn std::error::Error>>;

fn open(path: &Path, global: &GlobalArgs) -> Result<Device, ChipDbError> {
    if !global.quiet {
        eprintln!("     Loading {}", path.display());
    }
    Device::load(path)
}

/// Runs `fabric info`.
pub fn run_info(chipdb: &Path, format: ReportFormat, global: &GlobalArgs) -> CmdResult {
    let dev = open(chipdb, global)?;
    let report = match format {
        ReportFormat::Text => describe_info(&dev),
        ReportFormat::Json => serde_json::to_string_pretty(&info_json(&dev))?,
    };
    println!("{report}");
    Ok(0)
}

/// Runs `fabric pin`.
pub fn run_pin(chipdb: &Path, pin: &str, global: &GlobalArgs) -> CmdResult {
    let dev = open(chipdb, global)?;
    print!("{}", describe_pin(&dev, pin)?);
    Ok(0)
}

/// Runs `fabric bel`.
pub fn run_bel(chipdb: &Path, name: &str, global: &GlobalArgs) -> CmdResult {
    let dev = open(chipdb, global)?;
    print!("{}", describe_bel(&dev, name)?);
    Ok(0)
}

/// Runs `fabric estimate`, tuned by `--config` when given.
pub fn run_estimate(args: &EstimateArgs, global: &GlobalArgs) -> CmdResult {
    let mut ctx = Context::new(open(&args.chipdb, global)?);
    if let Some(dir) = &global.config {
        let config = fabric_config::load_config(dir)?;
        ctx.apply_config(&config)?;
    }
    print!("{}", describe_estimate(&ctx, &args.src, &args.dst)?);
    Ok(0)
}

fn info_json(dev: &Device) -> serde_json::Value {
    let info = dev.chipdb().info();
    serde_json::json!({
        "chip": dev.chip_name(),
        "family": dev.family().to_string(),
        "generator": info.generator,
        "width": dev.width(),
        "height": dev.height(),
        "tiles": dev.tile_count(),
        "tile_types": info.tile_types.len(),
        "bels": dev.bels().count(),
        "nodes": info.nodes.len(),
        "blacklisted_pips": dev.blacklist().len(),
        "timing": info.timing.is_some(),
        "checksum": dev.chipdb().checksum().to_string(),
    })
}

/// Formats the summary of a device.
pub fn describe_info(dev: &Device) -> String {
    let info = dev.chipdb().info();
    let rows = [
        ("chip", dev.chip_name().to_string()),
        ("family", dev.family().to_string()),
        ("grid", format!("{} x {}", dev.width(), dev.height())),
        ("tiles", dev.tile_count().to_string()),
        ("tile types", info.tile_types.len().to_string()),
        ("bels", dev.bels().count().to_string()),
        ("nodes", info.nodes.len().to_string()),
        ("blacklisted", format!("{} pips", dev.blacklist().len())),
        (
            "timing",
            if info.timing.is_some() { "present" } else { "absent" }.to_string(),
        ),
        ("checksum", dev.chipdb().checksum().to_string()),
    ];
    rows.iter()
        .map(|(key, value)| format!("{key:>12}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the site and bels behind a package pin.
pub fn describe_pin(dev: &Device, pin: &str) -> Result<String, String> {
    let site = dev
        .package_pin_site(pin)
        .ok_or_else(|| format!("package pin '{pin}' is not bonded on {}", dev.chip_name()))?;
    let (tile, _) = dev
        .site_by_name(site)
        .ok_or_else(|| format!("site '{site}' of pin '{pin}' is missing from the grid"))?;
    let mut out = format!("{pin} -> {site} in {}\n", dev.tile_name(tile));
    let (x, y) = dev.tile_xy(tile);
    for bel in dev.bels_by_tile(x, y) {
        if dev.bel_site_name(bel) == Some(site) {
            out.push_str(&format!(
                "  {} ({})\n",
                dev.bel_name(bel),
                dev.name_of(dev.bel_type(bel))
            ));
        }
    }
    Ok(out)
}

fn dir_name(dir: PinDir) -> &'static str {
    match dir {
        PinDir::Input => "in",
        PinDir::Output => "out",
        PinDir::Inout => "inout",
    }
}

/// Formats a bel's placement and pins.
pub fn describe_bel(dev: &Device, name: &str) -> Result<String, String> {
    let bel = dev
        .bel_by_name(name)
        .ok_or_else(|| format!("no bel named '{name}' on {}", dev.chip_name()))?;
    let loc = dev.bel_location(bel);
    let mut out = format!("{}\n", dev.bel_name(bel));
    out.push_str(&format!("  type:     {}\n", dev.name_of(dev.bel_type(bel))));
    out.push_str(&format!("  location: ({}, {}, {})\n", loc.x, loc.y, loc.z));
    out.push_str(&format!(
        "  tile:     {} ({})\n",
        dev.tile_name(bel.tile),
        dev.name_of(dev.bel_tile_type(bel))
    ));
    out.push_str(&format!("  site:     {}\n", dev.bel_site_name(bel).unwrap_or("-")));
    if let Some(inst) = dev.bel_timing_inst(bel) {
        out.push_str(&format!("  timing:   instance {inst}\n"));
    }
    out.push_str("  pins:\n");
    for pin in dev.bel_pins(bel) {
        let wire = dev
            .bel_pin_wire(bel, pin)
            .map(|w| dev.wire_name(w))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "    {:<8} {:<5} {wire}\n",
            dev.name_of(pin),
            dir_name(dev.bel_pin_type(bel, pin))
        ));
    }
    Ok(out)
}

/// Formats the delay estimate and routing bounds between two named wires.
pub fn describe_estimate(ctx: &Context, src: &str, dst: &str) -> Result<String, String> {
    let dev = ctx.device();
    let resolve = |name: &str| {
        dev.wire_by_name(name)
            .ok_or_else(|| format!("no wire named '{name}' on {}", dev.chip_name()))
    };
    let (src_wire, dst_wire) = (resolve(src)?, resolve(dst)?);
    let delay = ctx.estimate_delay(src_wire, dst_wire);
    let bounds = ctx.route_bounding_box(src_wire, dst_wire);
    Ok(format!(
        "{} -> {}\n  delay:    {delay} ps ({:.3} ns)\n  bounds:   x {}..{}, y {}..{}\n",
        dev.wire_name(src_wire),
        dev.wire_name(dst_wire),
        delay_to_ns(delay),
        bounds.x0,
        bounds.x1,
        bounds.y0,
        bounds.y1
    ))
}
