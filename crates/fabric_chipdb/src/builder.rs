//! Programmatic database construction for tooling and tests.

use crate::known::{KNOWN_ID_COUNT, KNOWN_ID_NAMES};
use crate::records::{
    BelInfo, BelPin, BelPinRef, CellPropDelay, CellTiming, ChipInfo, InstanceTiming, NodeInfo,
    PinDir, PipFlags, PipInfo, SiteInst, TileCellTiming, TileInst, TileTypeInfo, TileWireRef,
    TimingData, WireInfo,
};
use fabric_common::{Ident, Interner};
use std::collections::HashMap;

/// Incrementally builds a [`ChipInfo`].
///
/// Names are interned against the known identifier table, so the finished
/// record's identifiers line up with what the loader registers. Every grid
/// position starts as an empty `NULL` tile until [`set_tile`](Self::set_tile)
/// replaces it.
///
/// Index arguments are trusted; the finished record is checked by
/// [`ChipDb::new`](crate::ChipDb::new).
pub struct ChipDbBuilder {
    name: String,
    width: u32,
    height: u32,
    interner: Interner,
    tile_types: Vec<TileTypeInfo>,
    tiles: Vec<TileInst>,
    nodes: Vec<NodeInfo>,
    node_of: HashMap<(u32, u32), u32>,
    timing: Option<TimingData>,
}

impl ChipDbBuilder {
    /// Starts a database for a `width` x `height` grid.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let interner = Interner::new();
        for known in KNOWN_ID_NAMES {
            interner.get_or_intern(known);
        }
        let null_type = TileTypeInfo {
            type_name: interner.get_or_intern("NULL"),
            bels: Vec::new(),
            wires: Vec::new(),
            pips: Vec::new(),
            timing_index: None,
        };
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| TileInst {
                name: format!("NULL_X{x}Y{y}"),
                tile_type: 0,
                sites: Vec::new(),
                wire_to_node: Vec::new(),
            })
            .collect();
        Self {
            name: name.into(),
            width,
            height,
            interner,
            tile_types: vec![null_type],
            tiles,
            nodes: Vec::new(),
            node_of: HashMap::new(),
            timing: None,
        }
    }

    /// Interns a name.
    pub fn id(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Adds an empty tile type and returns its index.
    pub fn add_tile_type(&mut self, type_name: &str) -> u32 {
        let type_name = self.id(type_name);
        self.tile_types.push(TileTypeInfo {
            type_name,
            bels: Vec::new(),
            wires: Vec::new(),
            pips: Vec::new(),
            timing_index: None,
        });
        (self.tile_types.len() - 1) as u32
    }

    /// Adds a tile-local wire and returns its index.
    pub fn add_wire(&mut self, tt: u32, name: &str, intent: &str) -> u32 {
        let (name, intent) = (self.id(name), self.id(intent));
        let wires = &mut self.tile_types[tt as usize].wires;
        wires.push(WireInfo {
            name,
            intent,
            site: None,
            uphill: Vec::new(),
            downhill: Vec::new(),
            bel_pins: Vec::new(),
        });
        (wires.len() - 1) as u32
    }

    /// Marks a wire as internal to a site.
    pub fn set_wire_site(&mut self, tt: u32, wire: u32, site: u32) {
        self.tile_types[tt as usize].wires[wire as usize].site = Some(site);
    }

    /// Adds a general interconnect pip and returns its index.
    pub fn add_pip(&mut self, tt: u32, src: u32, dst: u32) -> u32 {
        self.push_pip(
            tt,
            PipInfo {
                src,
                dst,
                site: None,
                bel: None,
                flags: PipFlags::Tile,
                site_variant: None,
            },
        )
    }

    /// Adds a site-internal pip associated with a bel and returns its index.
    pub fn add_site_pip(&mut self, tt: u32, src: u32, dst: u32, site: u32, bel: &str) -> u32 {
        let bel = self.id(bel);
        self.push_pip(
            tt,
            PipInfo {
                src,
                dst,
                site: Some(site),
                bel: Some(bel),
                flags: PipFlags::SiteInternal,
                site_variant: None,
            },
        )
    }

    fn push_pip(&mut self, tt: u32, pip: PipInfo) -> u32 {
        let ty = &mut self.tile_types[tt as usize];
        let index = ty.pips.len() as u32;
        ty.wires[pip.src as usize].downhill.push(index);
        ty.wires[pip.dst as usize].uphill.push(index);
        ty.pips.push(pip);
        index
    }

    /// Adds a bel and returns its index.
    pub fn add_bel(&mut self, tt: u32, name: &str, bel_type: &str, z: u32, site: Option<u32>) -> u32 {
        let (name, bel_type) = (self.id(name), self.id(bel_type));
        let bels = &mut self.tile_types[tt as usize].bels;
        bels.push(BelInfo {
            name,
            bel_type,
            z,
            site,
            is_routing: false,
            pins: Vec::new(),
            timing_inst: None,
        });
        (bels.len() - 1) as u32
    }

    /// Attaches a bel pin to a tile wire.
    pub fn add_bel_pin(&mut self, tt: u32, bel: u32, port: &str, wire: u32, dir: PinDir) {
        let port = self.id(port);
        let ty = &mut self.tile_types[tt as usize];
        ty.bels[bel as usize].pins.push(BelPin { port, wire, dir });
        ty.wires[wire as usize].bel_pins.push(BelPinRef { bel, port });
    }

    /// Places a tile instance at a grid position and returns its tile index.
    pub fn set_tile(&mut self, x: u32, y: u32, name: &str, tt: u32) -> u32 {
        let index = y * self.width + x;
        let tile = &mut self.tiles[index as usize];
        tile.name = name.to_string();
        tile.tile_type = tt;
        index
    }

    /// Adds a site to a tile instance and returns its site index.
    pub fn add_site(
        &mut self,
        tile: u32,
        name: &str,
        site_type: &str,
        pin: &str,
        inter_xy: Option<(u32, u32)>,
    ) -> u32 {
        let sites = &mut self.tiles[tile as usize].sites;
        sites.push(SiteInst {
            name: name.to_string(),
            site_type: site_type.to_string(),
            pin: pin.to_string(),
            site_xy: (0, sites.len() as i32),
            inter_xy,
        });
        (sites.len() - 1) as u32
    }

    /// Joins `(tile, wire)` members into one node and returns its index.
    ///
    /// The first member is canonical for naming.
    pub fn add_node(&mut self, intent: &str, members: &[(u32, u32)]) -> u32 {
        let intent = self.id(intent);
        let index = self.nodes.len() as u32;
        for &member in members {
            self.node_of.insert(member, index);
        }
        self.nodes.push(NodeInfo {
            intent,
            tile_wires: members
                .iter()
                .map(|&(tile, index)| TileWireRef { tile, index })
                .collect(),
        });
        index
    }

    /// Adds a timing instance for a tile type and returns its index.
    pub fn add_timing_instance(&mut self, tt: u32) -> u32 {
        let timing = self.timing.get_or_insert_with(TimingData::default);
        let ty = &mut self.tile_types[tt as usize];
        let table = *ty.timing_index.get_or_insert_with(|| {
            timing.tile_cell_timings.push(TileCellTiming::default());
            (timing.tile_cell_timings.len() - 1) as u32
        });
        let instances = &mut timing.tile_cell_timings[table as usize].instances;
        instances.push(InstanceTiming::default());
        (instances.len() - 1) as u32
    }

    /// Marks a bel as routing-only.
    pub fn set_bel_routing(&mut self, tt: u32, bel: u32) {
        self.tile_types[tt as usize].bels[bel as usize].is_routing = true;
    }

    /// Associates a bel with a timing instance of its tile type.
    pub fn set_bel_timing_inst(&mut self, tt: u32, bel: u32, inst: u32) {
        self.tile_types[tt as usize].bels[bel as usize].timing_inst = Some(inst);
    }

    /// Records an arc delay for a cell variant of a timing instance.
    ///
    /// The tile type must already have a timing table from
    /// [`add_timing_instance`](Self::add_timing_instance); otherwise the
    /// call is ignored.
    pub fn add_cell_delay(
        &mut self,
        tt: u32,
        inst: u32,
        variant: &str,
        from_port: &str,
        to_port: &str,
        max_delay: i32,
    ) {
        let (variant, from_port, to_port) = (self.id(variant), self.id(from_port), self.id(to_port));
        let Some(table) = self.tile_types[tt as usize].timing_index else {
            return;
        };
        let Some(timing) = self.timing.as_mut() else {
            return;
        };
        let instance = &mut timing.tile_cell_timings[table as usize].instances[inst as usize];
        let cell = match instance.cell_types.iter().position(|c| c.variant == variant) {
            Some(pos) => &mut instance.cell_types[pos],
            None => {
                instance.cell_types.push(CellTiming {
                    variant,
                    delays: Vec::new(),
                });
                let last = instance.cell_types.len() - 1;
                &mut instance.cell_types[last]
            }
        };
        cell.delays.push(CellPropDelay {
            from_port,
            to_port,
            min_delay: max_delay,
            max_delay,
        });
    }

    /// Finishes the record: sizes node maps, sorts timing tables and
    /// collects the extra identifiers.
    pub fn finish(mut self) -> ChipInfo {
        for (t, tile) in self.tiles.iter_mut().enumerate() {
            let nwires = self.tile_types[tile.tile_type as usize].wires.len() as u32;
            tile.wire_to_node = (0..nwires)
                .map(|w| self.node_of.get(&(t as u32, w)).copied())
                .collect();
        }

        if let Some(timing) = self.timing.as_mut() {
            for instance in timing
                .tile_cell_timings
                .iter_mut()
                .flat_map(|t| t.instances.iter_mut())
            {
                instance.cell_types.sort_by_key(|c| c.variant);
                for cell in &mut instance.cell_types {
                    cell.delays.sort_by_key(|d| (d.to_port, d.from_port));
                }
            }
        }

        let extra_ids = (KNOWN_ID_COUNT..self.interner.len() as u32)
            .filter_map(|i| self.interner.try_resolve(Ident::from_raw(i)))
            .map(str::to_string)
            .collect();

        ChipInfo {
            name: self.name,
            generator: concat!("fabric_chipdb ", env!("CARGO_PKG_VERSION")).to_string(),
            width: self.width,
            height: self.height,
            known_id_count: KNOWN_ID_COUNT,
            extra_ids,
            tile_types: self.tile_types,
            tiles: self.tiles,
            nodes: self.nodes,
            timing: self.timing,
        }
    }
}
