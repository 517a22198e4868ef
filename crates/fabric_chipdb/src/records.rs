//! Flat-table records of the device database.
//!
//! All cross-references are integer indices: tile-type, wire, pip, bel and
//! site indices are local to a tile type or tile instance, node indices are
//! global. Names that recur across many tiles are interned [`Ident`]s; tile
//! and site instance names are unique and stored inline.

use fabric_common::Ident;
use serde::{Deserialize, Serialize};

/// The top-level database record for one part.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChipInfo {
    /// The part name, e.g. `xc7a35tcsg324-1`.
    pub name: String,
    /// The tool that produced the database.
    pub generator: String,
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Number of statically known identifiers the database was built against.
    pub known_id_count: u32,
    /// Identifiers registered after the known ones, in index order.
    pub extra_ids: Vec<String>,
    /// Shared tile layouts.
    pub tile_types: Vec<TileTypeInfo>,
    /// Tile instances in row-major order; `tiles.len() == width * height`.
    pub tiles: Vec<TileInst>,
    /// Cross-tile nodes.
    pub nodes: Vec<NodeInfo>,
    /// Cell timing table, if the part has one.
    pub timing: Option<TimingData>,
}

/// A shared tile layout referenced by many tile instances.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileTypeInfo {
    /// The tile type name, e.g. `CLBLL_L`.
    pub type_name: Ident,
    /// Placement targets.
    pub bels: Vec<BelInfo>,
    /// Tile-local wires.
    pub wires: Vec<WireInfo>,
    /// Directed wire-to-wire connections.
    pub pips: Vec<PipInfo>,
    /// Index into [`TimingData::tile_cell_timings`].
    pub timing_index: Option<u32>,
}

/// A bel descriptor within a tile type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BelInfo {
    /// Bel name within its site, e.g. `A6LUT`.
    pub name: Ident,
    /// Bel type, e.g. `SLICE_LUTX`.
    pub bel_type: Ident,
    /// Stacking coordinate separating bels that share a tile.
    pub z: u32,
    /// Owning site index within the tile instance.
    pub site: Option<u32>,
    /// Routing-only bels are never placement targets.
    pub is_routing: bool,
    /// Pins and the tile wires they attach to.
    pub pins: Vec<BelPin>,
    /// Index into the tile's [`TileCellTiming::instances`].
    pub timing_inst: Option<u32>,
}

/// Direction of a bel pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDir {
    /// Driven into the bel.
    Input,
    /// Driven by the bel.
    Output,
    /// Bidirectional.
    Inout,
}

/// One pin of a bel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BelPin {
    /// Port name.
    pub port: Ident,
    /// Tile-local wire index.
    pub wire: u32,
    /// Pin direction.
    pub dir: PinDir,
}

/// A reference from a wire back to a bel pin on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BelPinRef {
    /// Bel index within the tile type.
    pub bel: u32,
    /// Port name.
    pub port: Ident,
}

/// A tile-local wire descriptor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireInfo {
    /// Wire name within the tile.
    pub name: Ident,
    /// Intent classification.
    pub intent: Ident,
    /// Owning site index, for site-internal wires.
    pub site: Option<u32>,
    /// Pips driving this wire.
    pub uphill: Vec<u32>,
    /// Pips driven by this wire.
    pub downhill: Vec<u32>,
    /// Bel pins attached to this wire.
    pub bel_pins: Vec<BelPinRef>,
}

/// Classification of a pip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipFlags {
    /// General interconnect pip.
    Tile,
    /// Pip inside a site, associated with a bel.
    SiteInternal,
    /// Pip from general routing into a site.
    SiteEntry,
    /// Pip from a site out to general routing.
    SiteExit,
}

/// A pip descriptor within a tile type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipInfo {
    /// Source wire index.
    pub src: u32,
    /// Destination wire index.
    pub dst: u32,
    /// Owning site index, for site pips.
    pub site: Option<u32>,
    /// Associated bel name, for site-internal pips.
    pub bel: Option<Ident>,
    /// Pip classification.
    pub flags: PipFlags,
    /// Site variant the pip belongs to.
    pub site_variant: Option<u32>,
}

/// A tile instance in the grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileInst {
    /// Unique tile name, e.g. `CLBLL_L_X2Y10`.
    pub name: String,
    /// Index into [`ChipInfo::tile_types`].
    pub tile_type: u32,
    /// Sites of this instance.
    pub sites: Vec<SiteInst>,
    /// Per tile-type wire: the node it belongs to, if any.
    pub wire_to_node: Vec<Option<u32>>,
}

/// A site instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteInst {
    /// Unique site name, e.g. `SLICE_X0Y0`.
    pub name: String,
    /// Site type name, e.g. `SLICEL`.
    pub site_type: String,
    /// Package pin, empty when the site has none.
    pub pin: String,
    /// Site coordinate in the vendor's site grid.
    pub site_xy: (i32, i32),
    /// Tile coordinate of the interconnect that serves this site, if it differs from the tile's own.
    pub inter_xy: Option<(u32, u32)>,
}

/// A set of wires across tiles that are electrically one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Intent classification of the node.
    pub intent: Ident,
    /// Member wires; the first is canonical for naming.
    pub tile_wires: Vec<TileWireRef>,
}

/// One member wire of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileWireRef {
    /// Tile index.
    pub tile: u32,
    /// Wire index within the tile's type.
    pub index: u32,
}

/// The auxiliary cell timing table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingData {
    /// Per tile type, referenced by [`TileTypeInfo::timing_index`].
    pub tile_cell_timings: Vec<TileCellTiming>,
}

/// Timing instances of one tile type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TileCellTiming {
    /// Referenced by [`BelInfo::timing_inst`].
    pub instances: Vec<InstanceTiming>,
}

/// Timing of one bel instance, per cell variant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstanceTiming {
    /// Sorted by `variant`.
    pub cell_types: Vec<CellTiming>,
}

/// Propagation delays of one cell variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CellTiming {
    /// Variant name.
    pub variant: Ident,
    /// Sorted by `(to_port, from_port)`.
    pub delays: Vec<CellPropDelay>,
}

/// A combinational arc delay, in picoseconds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CellPropDelay {
    /// Input port.
    pub from_port: Ident,
    /// Output port.
    pub to_port: Ident,
    /// Fastest corner delay.
    pub min_delay: i32,
    /// Slowest corner delay.
    pub max_delay: i32,
}
