//! The logical netlist being mapped onto the device.
//!
//! Cells and nets are stored densely and addressed by [`CellId`] / [`NetId`].
//! A net records its driver and users as [`PortRef`]s and, once routed, the
//! tree of wires it owns together with the pip driving each wire.

use crate::binding::{PipMap, Strength};
use crate::ids::{BelId, CellId, NetId, WireId};
use fabric_chipdb::PinDir;
use fabric_common::{FabricResult, Ident, InternalError};
use std::collections::{BTreeMap, HashMap};

/// Name of the packer's power pseudo-net.
pub const VCC_NET: &str = "$PACKER_VCC_NET";
/// Name of the packer's ground pseudo-net.
pub const GND_NET: &str = "$PACKER_GND_NET";

/// A port of a specific cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PortRef {
    /// The cell.
    pub cell: CellId,
    /// The port name.
    pub port: Ident,
}

/// A cell port and the net attached to it.
#[derive(Clone, Debug)]
pub struct PortInfo {
    /// Port name.
    pub name: Ident,
    /// Direction seen from the cell.
    pub dir: PinDir,
    /// The attached net, if connected.
    pub net: Option<NetId>,
}

/// A netlist cell, optionally placed on a bel.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Unique name.
    pub name: String,
    /// Primitive type.
    pub cell_type: Ident,
    /// The bel the cell is placed on.
    pub bel: Option<BelId>,
    /// Strength of the placement.
    pub bel_strength: Strength,
    /// Ports, ordered by name.
    pub ports: BTreeMap<Ident, PortInfo>,
    /// Cell port to bel pin; ports without an entry use their own name.
    pub pin_map: HashMap<Ident, Ident>,
    /// Attributes, including those applied from constraint files.
    pub attrs: BTreeMap<String, String>,
}

impl Cell {
    /// The bel pin a cell port is mapped to.
    pub fn bel_pin(&self, port: Ident) -> Ident {
        self.pin_map.get(&port).copied().unwrap_or(port)
    }

    /// The net attached to a port.
    pub fn port_net(&self, port: Ident) -> Option<NetId> {
        self.ports.get(&port).and_then(|p| p.net)
    }
}

/// A net: one driver, any number of users, and its routing.
#[derive(Clone, Debug, Default)]
pub struct Net {
    /// Unique name.
    pub name: String,
    /// The driving port.
    pub driver: Option<PortRef>,
    /// The sink ports.
    pub users: Vec<PortRef>,
    /// Routed wires and the pip driving each.
    pub wires: HashMap<WireId, PipMap>,
}

/// Cells and nets with name indices.
#[derive(Clone, Debug, Default)]
pub struct Netlist {
    cells: Vec<Cell>,
    nets: Vec<Net>,
    cell_by_name: HashMap<String, CellId>,
    net_by_name: HashMap<String, NetId>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unplaced cell without ports and returns its ID.
    ///
    /// Cell names are unique; reusing one is an error.
    pub fn add_cell(&mut self, name: impl Into<String>, cell_type: Ident) -> FabricResult<CellId> {
        let name = name.into();
        if self.cell_by_name.contains_key(&name) {
            return Err(InternalError::new(format!("duplicate cell '{name}'")));
        }
        let id = CellId::from_raw(self.cells.len() as u32);
        self.cell_by_name.insert(name.clone(), id);
        self.cells.push(Cell {
            name,
            cell_type,
            bel: None,
            bel_strength: Strength::Weak,
            ports: BTreeMap::new(),
            pin_map: HashMap::new(),
            attrs: BTreeMap::new(),
        });
        Ok(id)
    }

    /// Adds an empty net and returns its ID.
    pub fn add_net(&mut self, name: impl Into<String>) -> NetId {
        let name = name.into();
        let id = NetId::from_raw(self.nets.len() as u32);
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Net {
            name,
            ..Net::default()
        });
        id
    }

    /// Declares an unconnected port on a cell.
    pub fn add_port(&mut self, cell: CellId, name: Ident, dir: PinDir) {
        self.cell_mut(cell).ports.insert(
            name,
            PortInfo {
                name,
                dir,
                net: None,
            },
        );
    }

    /// Connects a declared port to a net: outputs become the driver, all
    /// other directions become users.
    pub fn connect(&mut self, cell: CellId, port: Ident, net: NetId) -> FabricResult<()> {
        let c = self.cell(cell);
        let info = c
            .ports
            .get(&port)
            .ok_or_else(|| InternalError::new(format!("cell '{}' has no such port", c.name)))?;
        if info.net.is_some() {
            return Err(InternalError::new(format!(
                "port of cell '{}' is already connected",
                c.name
            )));
        }
        let dir = info.dir;
        if dir == PinDir::Output && self.net(net).driver.is_some() {
            return Err(InternalError::new(format!(
                "net '{}' already has a driver",
                self.net(net).name
            )));
        }

        if let Some(info) = self.cell_mut(cell).ports.get_mut(&port) {
            info.net = Some(net);
        }
        let port_ref = PortRef { cell, port };
        let n = self.net_mut(net);
        if dir == PinDir::Output {
            n.driver = Some(port_ref);
        } else {
            n.users.push(port_ref);
        }
        Ok(())
    }

    /// Returns the cell with the given ID.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the cell with the given ID.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.as_raw() as usize]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the net with the given ID.
    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        &mut self.nets[id.as_raw() as usize]
    }

    /// Looks up a cell by name.
    pub fn cell_by_name(&self, name: &str) -> Option<CellId> {
        self.cell_by_name.get(name).copied()
    }

    /// Looks up a net by name.
    pub fn net_by_name(&self, name: &str) -> Option<NetId> {
        self.net_by_name.get(name).copied()
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// All cell IDs in insertion order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len() as u32).map(CellId::from_raw)
    }

    /// All net IDs ordered by net name.
    pub fn nets_by_name(&self) -> Vec<NetId> {
        let mut ids: Vec<NetId> = (0..self.nets.len() as u32).map(NetId::from_raw).collect();
        ids.sort_by(|&a, &b| self.net(a).name.cmp(&self.net(b).name));
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_common::Interner;

    #[test]
    fn connect_sets_driver_and_users() {
        let names = Interner::new();
        let (o, i) = (names.get_or_intern("O"), names.get_or_intern("I"));
        let mut nl = Netlist::new();
        let buf = nl.add_cell("buf", names.get_or_intern("BUFGCTRL")).unwrap();
        let ff = nl.add_cell("ff", names.get_or_intern("SLICE_FFX")).unwrap();
        nl.add_port(buf, o, PinDir::Output);
        nl.add_port(ff, i, PinDir::Input);
        let clk = nl.add_net("clk");
        nl.connect(buf, o, clk).unwrap();
        nl.connect(ff, i, clk).unwrap();

        let net = nl.net(clk);
        assert_eq!(net.driver, Some(PortRef { cell: buf, port: o }));
        assert_eq!(net.users, vec![PortRef { cell: ff, port: i }]);
        assert_eq!(nl.cell(ff).port_net(i), Some(clk));
    }

    #[test]
    fn second_driver_is_rejected() {
        let names = Interner::new();
        let o = names.get_or_intern("O");
        let ty = names.get_or_intern("BUFGCTRL");
        let mut nl = Netlist::new();
        let a = nl.add_cell("a", ty).unwrap();
        let b = nl.add_cell("b", ty).unwrap();
        nl.add_port(a, o, PinDir::Output);
        nl.add_port(b, o, PinDir::Output);
        let n = nl.add_net("n");
        nl.connect(a, o, n).unwrap();
        assert!(nl.connect(b, o, n).is_err());
        assert!(nl.connect(a, names.get_or_intern("X"), n).is_err());
    }

    #[test]
    fn duplicate_cell_name_is_rejected() {
        let names = Interner::new();
        let ty = names.get_or_intern("SLICE_FFX");
        let mut nl = Netlist::new();
        let first = nl.add_cell("ff", ty).unwrap();
        let err = nl.add_cell("ff", names.get_or_intern("SLICE_LUTX")).unwrap_err();
        assert!(err.to_string().contains("'ff'"));
        assert_eq!(nl.cell_by_name("ff"), Some(first));
        assert_eq!(nl.cell(first).cell_type, ty);
        assert_eq!(nl.cell_ids().count(), 1);
    }

    #[test]
    fn pin_map_defaults_to_port_name() {
        let names = Interner::new();
        let (a, b) = (names.get_or_intern("I0"), names.get_or_intern("A3"));
        let mut nl = Netlist::new();
        let c = nl.add_cell("lut", names.get_or_intern("SLICE_LUTX")).unwrap();
        assert_eq!(nl.cell(c).bel_pin(a), a);
        nl.cell_mut(c).pin_map.insert(a, b);
        assert_eq!(nl.cell(c).bel_pin(a), b);
    }

    #[test]
    fn lookups_and_name_order() {
        let mut nl = Netlist::new();
        let z = nl.add_net("zeta");
        let a = nl.add_net("alpha");
        assert_eq!(nl.net_by_name("zeta"), Some(z));
        assert_eq!(nl.net_by_name("missing"), None);
        assert_eq!(nl.nets_by_name(), vec![a, z]);
        assert_eq!(nl.cell_by_name("nope"), None);
    }
}
