//! The read-only device graph and its naming layer.
//!
//! [`Device`] wraps a validated [`ChipDb`] together with the identifier
//! table, the reverse name indices and the pip blacklist. All of these are
//! built eagerly in [`Device::new`]; afterwards the device is immutable and
//! can be shared across threads.

use crate::blacklist::PipBlacklist;
use crate::ids::{BelId, Loc, PipId, WireId};
use fabric_chipdb::{
    BelInfo, ChipDb, ChipDbError, ChipFamily, InstanceTiming, KnownId, PinDir, PipFlags, PipInfo,
    TileTypeInfo, TileWireRef, WireInfo,
};
use fabric_common::{FabricResult, Ident, Interner, InternalError};
use std::collections::HashMap;
use std::path::Path;

/// Tile types whose bels are logic slices sitting next to their interconnect.
const LOGIC_TILE_TYPES: [KnownId; 8] = [
    KnownId::CLEL_L,
    KnownId::CLEL_R,
    KnownId::CLEM,
    KnownId::CLEM_R,
    KnownId::CLBLL_L,
    KnownId::CLBLL_R,
    KnownId::CLBLM_L,
    KnownId::CLBLM_R,
];

/// An opened device: the database plus its derived lookup tables.
pub struct Device {
    db: ChipDb,
    interner: Interner,
    tile_by_name: HashMap<String, u32>,
    site_by_name: HashMap<String, (u32, u32)>,
    pin_to_site: HashMap<String, String>,
    blacklist: PipBlacklist,
}

impl Device {
    /// Opens a database: registers its identifiers, builds the name indices
    /// and evaluates the family's pip blacklist.
    pub fn new(db: ChipDb) -> Result<Self, ChipDbError> {
        let interner = db.interner()?;
        let info = db.info();

        let mut tile_by_name = HashMap::with_capacity(info.tiles.len());
        let mut site_by_name = HashMap::new();
        let mut pin_to_site = HashMap::new();
        for (t, tile) in info.tiles.iter().enumerate() {
            tile_by_name.insert(tile.name.clone(), t as u32);
            for (s, site) in tile.sites.iter().enumerate() {
                site_by_name.insert(site.name.clone(), (t as u32, s as u32));
                if !site.pin.is_empty() && !site.pin.starts_with('.') {
                    pin_to_site.insert(site.pin.clone(), site.name.clone());
                }
            }
        }

        let blacklist = match db.family() {
            ChipFamily::Xc7 => PipBlacklist::for_xc7(&db, &interner),
            ChipFamily::UltraScale => PipBlacklist::empty(),
        };

        Ok(Self {
            db,
            interner,
            tile_by_name,
            site_by_name,
            pin_to_site,
            blacklist,
        })
    }

    /// Loads a database file and opens it.
    pub fn load(path: &Path) -> Result<Self, ChipDbError> {
        Self::new(fabric_chipdb::load_chipdb(path)?)
    }

    /// The underlying database.
    pub fn chipdb(&self) -> &ChipDb {
        &self.db
    }

    /// The part name.
    pub fn chip_name(&self) -> &str {
        &self.db.info().name
    }

    /// The detected family.
    pub fn family(&self) -> ChipFamily {
        self.db.family()
    }

    /// Grid width in tiles.
    pub fn width(&self) -> i32 {
        self.db.info().width as i32
    }

    /// Grid height in tiles.
    pub fn height(&self) -> i32 {
        self.db.info().height as i32
    }

    /// The pip blacklist.
    pub fn blacklist(&self) -> &PipBlacklist {
        &self.blacklist
    }

    // -- identifiers --------------------------------------------------------

    /// Interns a name, registering it if it is new.
    ///
    /// The identifier table is shared and append-only: a new name gets the
    /// next free id, existing ids never change, and no device query answers
    /// differently afterwards. Use [`lookup_id`](Self::lookup_id) to resolve
    /// a name without registering it.
    pub fn id(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Looks up a name without registering it.
    pub fn lookup_id(&self, name: &str) -> Option<Ident> {
        self.interner.get(name)
    }

    /// The string of an identifier.
    pub fn name_of(&self, id: Ident) -> &str {
        self.interner.resolve(id)
    }

    // -- tiles --------------------------------------------------------------

    /// Number of tiles in the grid.
    pub fn tile_count(&self) -> u32 {
        self.db.info().tiles.len() as u32
    }

    /// Grid coordinate of a tile.
    pub fn tile_xy(&self, tile: u32) -> (i32, i32) {
        let w = self.db.info().width;
        ((tile % w) as i32, (tile / w) as i32)
    }

    /// Tile index at a grid coordinate.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some((y * self.width() + x) as u32)
    }

    /// Name of a tile instance.
    pub fn tile_name(&self, tile: u32) -> &str {
        &self.db.tile(tile).name
    }

    /// Looks up a tile by name.
    pub fn tile_by_name(&self, name: &str) -> Option<u32> {
        self.tile_by_name.get(name).copied()
    }

    /// Type name of a tile instance.
    pub fn tile_type_name(&self, tile: u32) -> Ident {
        self.tile_type(tile).type_name
    }

    fn tile_type(&self, tile: u32) -> &TileTypeInfo {
        self.db.tile_type_of(tile)
    }

    /// Number of sites in a tile instance.
    pub fn tile_site_count(&self, tile: u32) -> u32 {
        self.db.tile(tile).sites.len() as u32
    }

    /// Number of bel slots in a tile instance.
    pub fn tile_bel_count(&self, tile: u32) -> u32 {
        self.tile_type(tile).bels.len() as u32
    }

    /// Interconnect coordinate declared by a site, if it differs from its tile's.
    pub fn site_inter_xy(&self, tile: u32, site: u32) -> Option<(i32, i32)> {
        self.db
            .tile(tile)
            .sites
            .get(site as usize)
            .and_then(|s| s.inter_xy)
            .map(|(x, y)| (x as i32, y as i32))
    }

    /// Name of a site.
    pub fn site_name(&self, tile: u32, site: u32) -> &str {
        &self.db.tile(tile).sites[site as usize].name
    }

    /// Looks up a site by name, returning `(tile, site index)`.
    pub fn site_by_name(&self, name: &str) -> Option<(u32, u32)> {
        self.site_by_name.get(name).copied()
    }

    /// The site serving a package pin.
    pub fn package_pin_site(&self, pin: &str) -> Option<&str> {
        self.pin_to_site.get(pin).map(String::as_str)
    }

    // -- bels ---------------------------------------------------------------

    fn bel_info(&self, bel: BelId) -> &BelInfo {
        &self.tile_type(bel.tile).bels[bel.index as usize]
    }

    /// All bels of the device, tile by tile.
    pub fn bels(&self) -> impl Iterator<Item = BelId> + '_ {
        (0..self.tile_count()).flat_map(move |tile| {
            (0..self.tile_type(tile).bels.len() as u32).map(move |index| BelId { tile, index })
        })
    }

    /// Bels of the tile at a grid coordinate; empty outside the grid.
    pub fn bels_by_tile(&self, x: i32, y: i32) -> impl Iterator<Item = BelId> + '_ {
        let tile = self.tile_at(x, y);
        let count = tile.map_or(0, |t| self.tile_type(t).bels.len() as u32);
        (0..count).filter_map(move |index| tile.map(|tile| BelId { tile, index }))
    }

    /// Looks up a bel by `<site>/<bel>` or `<tile>/<bel>` name.
    pub fn bel_by_name(&self, name: &str) -> Option<BelId> {
        let (owner, local) = name.split_once('/')?;
        let local = self.lookup_id(local)?;
        let (tile, site) = match self.site_by_name.get(owner) {
            Some(&(tile, site)) => (tile, Some(site)),
            None => (self.tile_by_name(owner)?, None),
        };
        self.tile_type(tile)
            .bels
            .iter()
            .position(|b| b.name == local && (site.is_none() || b.site == site))
            .map(|index| BelId {
                tile,
                index: index as u32,
            })
    }

    /// Full name of a bel, prefixed with its site (or tile, for site-less bels).
    pub fn bel_name(&self, bel: BelId) -> String {
        let info = self.bel_info(bel);
        let owner = match info.site {
            Some(site) => &self.db.tile(bel.tile).sites[site as usize].name,
            None => &self.db.tile(bel.tile).name,
        };
        format!("{owner}/{}", self.name_of(info.name))
    }

    /// Bel type.
    pub fn bel_type(&self, bel: BelId) -> Ident {
        self.bel_info(bel).bel_type
    }

    /// Grid location of a bel.
    pub fn bel_location(&self, bel: BelId) -> Loc {
        let (x, y) = self.tile_xy(bel.tile);
        Loc::new(x, y, self.bel_info(bel).z as i32)
    }

    /// The bel at a grid location, if any.
    pub fn bel_by_location(&self, loc: Loc) -> Option<BelId> {
        let tile = self.tile_at(loc.x, loc.y)?;
        self.tile_type(tile)
            .bels
            .iter()
            .position(|b| b.z as i32 == loc.z)
            .map(|index| BelId {
                tile,
                index: index as u32,
            })
    }

    /// Whether a bel is a routing-only bel.
    pub fn bel_is_routing(&self, bel: BelId) -> bool {
        self.bel_info(bel).is_routing
    }

    /// Pin names of a bel.
    pub fn bel_pins(&self, bel: BelId) -> impl Iterator<Item = Ident> + '_ {
        self.bel_info(bel).pins.iter().map(|p| p.port)
    }

    /// The canonical wire attached to a bel pin.
    pub fn bel_pin_wire(&self, bel: BelId, pin: Ident) -> Option<WireId> {
        self.bel_info(bel)
            .pins
            .iter()
            .find(|p| p.port == pin)
            .map(|p| self.canonical_wire(bel.tile, p.wire))
    }

    /// Direction of a bel pin; unknown pins are reported as `Inout`.
    pub fn bel_pin_type(&self, bel: BelId, pin: Ident) -> PinDir {
        self.bel_info(bel)
            .pins
            .iter()
            .find(|p| p.port == pin)
            .map_or(PinDir::Inout, |p| p.dir)
    }

    /// Type name of the tile holding a bel.
    pub fn bel_tile_type(&self, bel: BelId) -> Ident {
        self.tile_type_name(bel.tile)
    }

    /// Name of the site holding a bel.
    pub fn bel_site_name(&self, bel: BelId) -> Option<&str> {
        let site = self.bel_info(bel).site?;
        Some(&self.db.tile(bel.tile).sites[site as usize].name)
    }

    /// Timing instance of a bel within its tile type's timing table.
    pub fn bel_timing_inst(&self, bel: BelId) -> Option<u32> {
        self.bel_info(bel).timing_inst
    }

    /// Timing table of a tile.
    pub fn tile_timing_index(&self, tile: u32) -> Option<u32> {
        self.tile_type(tile).timing_index
    }

    /// Timing instance record of a bel, if the database carries timing for it.
    pub fn instance_timing(&self, bel: BelId) -> Option<&InstanceTiming> {
        let table = self.tile_timing_index(bel.tile)?;
        let inst = self.bel_timing_inst(bel)?;
        self.db
            .info()
            .timing
            .as_ref()?
            .tile_cell_timings
            .get(table as usize)?
            .instances
            .get(inst as usize)
    }

    /// Whether a bel sits in a logic tile (CLB or CLE).
    pub fn is_logic_tile(&self, bel: BelId) -> bool {
        let tt = self.bel_tile_type(bel);
        LOGIC_TILE_TYPES.iter().any(|&known| tt == known)
    }

    /// Package pin of the site holding a bel; `None` when the bel has no
    /// site or the site has no pin.
    pub fn bel_package_pin(&self, bel: BelId) -> Option<&str> {
        let site = self.bel_info(bel).site?;
        let pin = &self.db.tile(bel.tile).sites[site as usize].pin;
        (!pin.is_empty()).then_some(pin.as_str())
    }

    // -- wires --------------------------------------------------------------

    /// Canonical handle of a tile-local wire: its node when it belongs to one.
    pub fn canonical_wire(&self, tile: u32, index: u32) -> WireId {
        match self.db.tile(tile).wire_to_node[index as usize] {
            Some(node) => WireId::Node(node),
            None => WireId::Tile { tile, index },
        }
    }

    fn canonical_member(&self, wire: WireId) -> TileWireRef {
        match wire {
            WireId::Tile { tile, index } => TileWireRef { tile, index },
            WireId::Node(node) => self.db.info().nodes[node as usize].tile_wires[0],
        }
    }

    /// Descriptor of a wire's canonical member.
    pub fn wire_info(&self, wire: WireId) -> &WireInfo {
        let tw = self.canonical_member(wire);
        &self.tile_type(tw.tile).wires[tw.index as usize]
    }

    /// Tile of a wire's canonical member.
    pub fn wire_tile(&self, wire: WireId) -> u32 {
        self.canonical_member(wire).tile
    }

    /// Member wires: the wire itself, or every member of its node.
    pub fn wire_members(&self, wire: WireId) -> impl Iterator<Item = TileWireRef> + '_ {
        let (single, node): (Option<TileWireRef>, &[TileWireRef]) = match wire {
            WireId::Tile { tile, index } => (Some(TileWireRef { tile, index }), &[]),
            WireId::Node(n) => (None, &self.db.info().nodes[n as usize].tile_wires),
        };
        single.into_iter().chain(node.iter().copied())
    }

    /// Number of member wires.
    pub fn wire_member_count(&self, wire: WireId) -> usize {
        match wire {
            WireId::Tile { .. } => 1,
            WireId::Node(n) => self.db.info().nodes[n as usize].tile_wires.len(),
        }
    }

    /// Descriptor of one member wire.
    pub fn member_info(&self, tw: TileWireRef) -> &WireInfo {
        &self.tile_type(tw.tile).wires[tw.index as usize]
    }

    /// Name of a wire as `<tile>/<wire>` of its canonical member.
    pub fn wire_name(&self, wire: WireId) -> String {
        let tw = self.canonical_member(wire);
        format!(
            "{}/{}",
            self.tile_name(tw.tile),
            self.name_of(self.member_info(tw).name)
        )
    }

    /// Looks up a wire by `<tile>/<wire>` name; any member name of a node
    /// resolves to the node.
    pub fn wire_by_name(&self, name: &str) -> Option<WireId> {
        let (tile_name, local) = name.split_once('/')?;
        let tile = self.tile_by_name(tile_name)?;
        let local = self.lookup_id(local)?;
        self.tile_type(tile)
            .wires
            .iter()
            .position(|w| w.name == local)
            .map(|index| self.canonical_wire(tile, index as u32))
    }

    /// Intent of a wire; nodes carry their own intent.
    pub fn wire_intent(&self, wire: WireId) -> Ident {
        match wire {
            WireId::Tile { .. } => self.wire_info(wire).intent,
            WireId::Node(n) => self.db.info().nodes[n as usize].intent,
        }
    }

    /// Site index of a wire's canonical member, for site-internal wires.
    pub fn wire_site(&self, wire: WireId) -> Option<u32> {
        self.wire_info(wire).site
    }

    /// Pips driving a wire, across all node members.
    pub fn pips_uphill(&self, wire: WireId) -> impl Iterator<Item = PipId> + '_ {
        self.wire_members(wire).flat_map(move |tw| {
            self.member_info(tw)
                .uphill
                .iter()
                .map(move |&index| PipId { tile: tw.tile, index })
        })
    }

    /// Pips driven by a wire, across all node members.
    pub fn pips_downhill(&self, wire: WireId) -> impl Iterator<Item = PipId> + '_ {
        self.wire_members(wire).flat_map(move |tw| {
            self.member_info(tw)
                .downhill
                .iter()
                .map(move |&index| PipId { tile: tw.tile, index })
        })
    }

    // -- pips ---------------------------------------------------------------

    /// Descriptor of a pip.
    pub fn pip_info(&self, pip: PipId) -> &PipInfo {
        &self.tile_type(pip.tile).pips[pip.index as usize]
    }

    /// Canonical source wire of a pip.
    pub fn pip_src_wire(&self, pip: PipId) -> WireId {
        self.canonical_wire(pip.tile, self.pip_info(pip).src)
    }

    /// Canonical destination wire of a pip.
    pub fn pip_dst_wire(&self, pip: PipId) -> WireId {
        self.canonical_wire(pip.tile, self.pip_info(pip).dst)
    }

    /// Whether a pip is excluded by the static blacklist.
    pub fn is_pip_blacklisted(&self, pip: PipId) -> bool {
        self.blacklist
            .contains(self.db.tile(pip.tile).tile_type, pip.index)
    }

    /// Name of a pip, regenerated from structure.
    ///
    /// Site-internal pips are `SITEPIP/<site>/<bel>/<src wire>`; all others
    /// are `<tile>/<src index>.<dst index>`.
    pub fn pip_name(&self, pip: PipId) -> String {
        let info = self.pip_info(pip);
        match (info.site, info.bel, info.flags) {
            (Some(site), Some(bel), PipFlags::SiteInternal) => format!(
                "SITEPIP/{}/{}/{}",
                self.db.tile(pip.tile).sites[site as usize].name,
                self.name_of(bel),
                self.name_of(self.tile_type(pip.tile).wires[info.src as usize].name)
            ),
            _ => format!("{}/{}.{}", self.tile_name(pip.tile), info.src, info.dst),
        }
    }

    /// Looks up a pip by a name produced by [`pip_name`](Self::pip_name).
    pub fn pip_by_name(&self, name: &str) -> Option<PipId> {
        if let Some(rest) = name.strip_prefix("SITEPIP/") {
            let mut parts = rest.splitn(3, '/');
            let (site_name, bel, src) = (parts.next()?, parts.next()?, parts.next()?);
            let (tile, site) = self.site_by_name(site_name)?;
            let (bel, src) = (self.lookup_id(bel)?, self.lookup_id(src)?);
            let tt = self.tile_type(tile);
            return tt
                .pips
                .iter()
                .position(|p| {
                    p.flags == PipFlags::SiteInternal
                        && p.site == Some(site)
                        && p.bel == Some(bel)
                        && tt.wires[p.src as usize].name == src
                })
                .map(|index| PipId {
                    tile,
                    index: index as u32,
                });
        }
        let (tile_name, pair) = name.rsplit_once('/')?;
        let (src, dst) = pair.split_once('.')?;
        let (src, dst): (u32, u32) = (src.parse().ok()?, dst.parse().ok()?);
        let tile = self.tile_by_name(tile_name)?;
        self.tile_type(tile)
            .pips
            .iter()
            .position(|p| p.src == src && p.dst == dst)
            .map(|index| PipId {
                tile,
                index: index as u32,
            })
    }

    // -- clock regions ------------------------------------------------------

    /// The HCLK tile serving the I/O tile next to an IOB bel.
    pub fn hclk_for_iob(&self, pad: BelId) -> FabricResult<u32> {
        let tile_type = self.name_of(self.bel_tile_type(pad));
        let ioi = if tile_type.starts_with("LIOB") {
            pad.tile.checked_add(1)
        } else if tile_type.starts_with("RIOB") {
            pad.tile.checked_sub(1)
        } else {
            return Err(InternalError::new(format!(
                "unknown IOB side for tile type '{tile_type}'"
            )));
        };
        match ioi {
            Some(ioi) if ioi < self.tile_count() => self.hclk_for_ioi(ioi),
            _ => Err(InternalError::new(format!(
                "IOB tile {} has no neighbouring IOI tile",
                self.tile_name(pad.tile)
            ))),
        }
    }

    /// The HCLK tile driving an I/O tile's `IOI_IOCLK0` wire.
    pub fn hclk_for_ioi(&self, ioi: u32) -> FabricResult<u32> {
        let ioclk0 = self
            .tile_type(ioi)
            .wires
            .iter()
            .position(|w| w.name == KnownId::IOI_IOCLK0 || w.name == KnownId::IOI_SING_IOCLK0)
            .map(|index| self.canonical_wire(ioi, index as u32))
            .ok_or_else(|| {
                InternalError::new(format!(
                    "tile {} has no IOI_IOCLK0 wire",
                    self.tile_name(ioi)
                ))
            })?;
        self.pips_uphill(ioclk0)
            .next()
            .map(|pip| pip.tile)
            .ok_or_else(|| {
                InternalError::new(format!(
                    "failed to find HCLK pips driving {}",
                    self.wire_name(ioclk0)
                ))
            })
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("chip", &self.chip_name())
            .field("family", &self.family())
            .field("tiles", &self.tile_count())
            .finish()
    }
}
