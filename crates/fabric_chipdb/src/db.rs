//! A loaded, validated device database.

use crate::error::ChipDbError;
use crate::family::ChipFamily;
use crate::known::{KNOWN_ID_COUNT, KNOWN_ID_NAMES};
use crate::records::{ChipInfo, TileInst, TileTypeInfo};
use fabric_common::{ContentHash, Ident, Interner};

/// A device database that passed structural validation.
///
/// Every table index inside [`ChipInfo`] is guaranteed to be in range, so
/// the backend indexes the tables directly.
#[derive(Debug)]
pub struct ChipDb {
    info: ChipInfo,
    family: ChipFamily,
    checksum: ContentHash,
}

impl ChipDb {
    /// Validates a decoded record.
    pub fn new(info: ChipInfo, checksum: ContentHash) -> Result<Self, ChipDbError> {
        validate(&info)?;
        let family = ChipFamily::detect(&info.name);
        Ok(Self {
            info,
            family,
            checksum,
        })
    }

    /// The database record.
    pub fn info(&self) -> &ChipInfo {
        &self.info
    }

    /// The detected chip family.
    pub fn family(&self) -> ChipFamily {
        self.family
    }

    /// Checksum of the encoded payload.
    pub fn checksum(&self) -> ContentHash {
        self.checksum
    }

    /// The tile instance at a row-major index.
    pub fn tile(&self, tile: u32) -> &TileInst {
        &self.info.tiles[tile as usize]
    }

    /// The shared layout of a tile instance.
    pub fn tile_type_of(&self, tile: u32) -> &TileTypeInfo {
        &self.info.tile_types[self.tile(tile).tile_type as usize]
    }

    /// Builds the identifier table: known identifiers first, then the
    /// database's extra identifiers at `known_id_count + i`.
    pub fn interner(&self) -> Result<Interner, ChipDbError> {
        let interner = Interner::new();
        for (i, name) in KNOWN_ID_NAMES
            .iter()
            .copied()
            .chain(self.info.extra_ids.iter().map(String::as_str))
            .enumerate()
        {
            let id = interner.get_or_intern(name);
            if id.as_raw() as usize != i {
                return Err(ChipDbError::IdTable {
                    reason: format!(
                        "identifier '{name}' expected at index {i}, already registered at {}",
                        id.as_raw()
                    ),
                });
            }
        }
        Ok(interner)
    }
}

fn malformed(reason: String) -> ChipDbError {
    ChipDbError::Malformed { reason }
}

fn validate(info: &ChipInfo) -> Result<(), ChipDbError> {
    if info.known_id_count != KNOWN_ID_COUNT {
        return Err(ChipDbError::IdTable {
            reason: format!(
                "database built against {} known identifiers, this build has {KNOWN_ID_COUNT}",
                info.known_id_count
            ),
        });
    }
    let id_count = KNOWN_ID_COUNT as usize + info.extra_ids.len();
    let check_id = |id: Ident, what: &dyn Fn() -> String| {
        if (id.as_raw() as usize) < id_count {
            Ok(())
        } else {
            Err(malformed(format!(
                "{} uses identifier {} beyond the table of {id_count}",
                what(),
                id.as_raw()
            )))
        }
    };

    let expected_tiles = info.width as usize * info.height as usize;
    if info.tiles.len() != expected_tiles {
        return Err(malformed(format!(
            "{} tiles for a {}x{} grid",
            info.tiles.len(),
            info.width,
            info.height
        )));
    }

    let timing_tables = info
        .timing
        .as_ref()
        .map_or(0, |t| t.tile_cell_timings.len());

    for (ti, tt) in info.tile_types.iter().enumerate() {
        let ctx = || format!("tile type {ti}");
        check_id(tt.type_name, &ctx)?;
        let nwires = tt.wires.len();
        let npips = tt.pips.len();
        let instances = match tt.timing_index {
            Some(idx) if idx as usize >= timing_tables => {
                return Err(malformed(format!(
                    "tile type {ti} references timing table {idx} of {timing_tables}"
                )));
            }
            Some(idx) => info
                .timing
                .as_ref()
                .map_or(0, |t| t.tile_cell_timings[idx as usize].instances.len()),
            None => 0,
        };
        for (bi, bel) in tt.bels.iter().enumerate() {
            let ctx = || format!("bel {bi} of tile type {ti}");
            check_id(bel.name, &ctx)?;
            check_id(bel.bel_type, &ctx)?;
            for pin in &bel.pins {
                check_id(pin.port, &ctx)?;
                if pin.wire as usize >= nwires {
                    return Err(malformed(format!("{} pin wire {} out of range", ctx(), pin.wire)));
                }
            }
            if let Some(inst) = bel.timing_inst {
                if inst as usize >= instances {
                    return Err(malformed(format!(
                        "{} timing instance {inst} out of range",
                        ctx()
                    )));
                }
            }
        }
        for (wi, wire) in tt.wires.iter().enumerate() {
            let ctx = || format!("wire {wi} of tile type {ti}");
            check_id(wire.name, &ctx)?;
            check_id(wire.intent, &ctx)?;
            if let Some(&p) = wire.uphill.iter().chain(&wire.downhill).find(|&&p| p as usize >= npips) {
                return Err(malformed(format!("{} references pip {p}", ctx())));
            }
            if let Some(pin) = wire.bel_pins.iter().find(|p| p.bel as usize >= tt.bels.len()) {
                return Err(malformed(format!("{} references bel {}", ctx(), pin.bel)));
            }
        }
        for (pi, pip) in tt.pips.iter().enumerate() {
            if pip.src as usize >= nwires || pip.dst as usize >= nwires {
                return Err(malformed(format!(
                    "pip {pi} of tile type {ti} connects {} -> {} with {nwires} wires",
                    pip.src, pip.dst
                )));
            }
            if let Some(bel) = pip.bel {
                check_id(bel, &|| format!("pip {pi} of tile type {ti}"))?;
            }
        }
    }

    for (t, tile) in info.tiles.iter().enumerate() {
        let Some(tt) = info.tile_types.get(tile.tile_type as usize) else {
            return Err(malformed(format!(
                "tile {t} references tile type {}",
                tile.tile_type
            )));
        };
        if tile.wire_to_node.len() != tt.wires.len() {
            return Err(malformed(format!(
                "tile {t} maps {} wires to nodes, its type has {}",
                tile.wire_to_node.len(),
                tt.wires.len()
            )));
        }
        if let Some(node) = tile
            .wire_to_node
            .iter()
            .flatten()
            .find(|&&n| n as usize >= info.nodes.len())
        {
            return Err(malformed(format!("tile {t} references node {node}")));
        }
        let nsites = tile.sites.len();
        let bad_site = tt
            .bels
            .iter()
            .filter_map(|b| b.site)
            .chain(tt.wires.iter().filter_map(|w| w.site))
            .chain(tt.pips.iter().filter_map(|p| p.site))
            .find(|&s| s as usize >= nsites);
        if let Some(site) = bad_site {
            return Err(malformed(format!(
                "tile {t} has {nsites} sites, its type references site {site}"
            )));
        }
    }

    for (n, node) in info.nodes.iter().enumerate() {
        check_id(node.intent, &|| format!("node {n}"))?;
        if node.tile_wires.is_empty() {
            return Err(malformed(format!("node {n} has no member wires")));
        }
        for tw in &node.tile_wires {
            let in_range = info.tiles.get(tw.tile as usize).is_some_and(|tile| {
                (tw.index as usize) < info.tile_types[tile.tile_type as usize].wires.len()
            });
            if !in_range {
                return Err(malformed(format!(
                    "node {n} member ({}, {}) out of range",
                    tw.tile, tw.index
                )));
            }
        }
    }

    Ok(())
}
