//! Mutable implementation state on top of an opened device.
//!
//! The [`Context`] owns the device, the netlist and every piece of state that
//! placement and routing mutate: wire and pip ownership, per-tile bel
//! occupancy and site variants, and the sink locations discovered before
//! routing. All mutation goes through `&mut self`; callers that parallelize
//! must partition ownership themselves.

use crate::binding::{BindError, Binding, PipMap, Strength};
use crate::device::Device;
use crate::ids::{BelId, CellId, NetId, PipId, WireId};
use crate::netlist::{Netlist, PortRef};
use fabric_common::Ident;
use fabric_config::{ConfigError, EstimatorConfig, FabricConfig, PlacerKind};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
struct TileStatus {
    bound_cells: Vec<Option<CellId>>,
    site_variants: Vec<Option<u32>>,
}

/// A device, a netlist and the binding state between them.
pub struct Context {
    device: Device,
    /// The design being implemented.
    pub netlist: Netlist,
    /// Per-run settings; `placer` overrides the configured placer.
    pub settings: BTreeMap<String, String>,
    /// Design attributes written by the flow (e.g. `step`).
    pub attrs: BTreeMap<String, String>,
    /// Emit per-arc debug notes from the routing passes.
    pub debug: bool,
    wire_bindings: HashMap<WireId, Binding>,
    pip_bindings: HashMap<PipId, Binding>,
    tile_status: Vec<TileStatus>,
    sink_locations: HashMap<WireId, (i32, i32)>,
    estimator: EstimatorConfig,
    ripup_delay_penalty: i32,
    default_placer: PlacerKind,
}

impl Context {
    /// Creates a context with an empty netlist and default tuning.
    pub fn new(device: Device) -> Self {
        let tile_status = (0..device.tile_count())
            .map(|tile| TileStatus {
                bound_cells: vec![None; device.tile_bel_count(tile) as usize],
                site_variants: vec![None; device.tile_site_count(tile) as usize],
            })
            .collect();
        Self {
            device,
            netlist: Netlist::new(),
            settings: BTreeMap::new(),
            attrs: BTreeMap::new(),
            debug: false,
            wire_bindings: HashMap::new(),
            pip_bindings: HashMap::new(),
            tile_status,
            sink_locations: HashMap::new(),
            estimator: EstimatorConfig::default(),
            ripup_delay_penalty: 250,
            default_placer: PlacerKind::Sa,
        }
    }

    /// Applies the tuning and placer selection of a run configuration.
    pub fn apply_config(&mut self, config: &FabricConfig) -> Result<(), ConfigError> {
        self.default_placer = config.placer()?;
        self.estimator = config.estimator;
        self.ripup_delay_penalty = config.route.ripup_delay_penalty;
        Ok(())
    }

    /// The opened device.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Interns a name in the device's identifier table.
    pub fn id(&self, name: &str) -> Ident {
        self.device.id(name)
    }

    /// Estimator tuning in effect.
    pub fn estimator(&self) -> EstimatorConfig {
        self.estimator
    }

    /// Base rip-up penalty in effect.
    pub fn ripup_delay_penalty(&self) -> i32 {
        self.ripup_delay_penalty
    }

    /// Placer used when `settings` does not name one.
    pub fn default_placer(&self) -> PlacerKind {
        self.default_placer
    }

    // -- wires and pips -----------------------------------------------------

    /// Ownership record of a wire.
    pub fn wire_binding(&self, wire: WireId) -> Binding {
        self.wire_bindings.get(&wire).copied().unwrap_or_default()
    }

    /// Ownership record of a pip.
    pub fn pip_binding(&self, pip: PipId) -> Binding {
        self.pip_bindings.get(&pip).copied().unwrap_or_default()
    }

    /// The net owning a wire.
    pub fn bound_wire_net(&self, wire: WireId) -> Option<NetId> {
        self.wire_binding(wire).net()
    }

    /// The net owning a pip.
    pub fn bound_pip_net(&self, pip: PipId) -> Option<NetId> {
        self.pip_binding(pip).net()
    }

    /// Whether a wire is unbound.
    pub fn check_wire_avail(&self, wire: WireId) -> bool {
        self.bound_wire_net(wire).is_none()
    }

    /// Whether a pip is usable and unbound.
    pub fn check_pip_avail(&self, pip: PipId) -> bool {
        !self.device.is_pip_blacklisted(pip) && self.bound_pip_net(pip).is_none()
    }

    /// Whether a pip is usable and either unbound or already owned by `net`.
    pub fn check_pip_avail_for_net(&self, pip: PipId, net: NetId) -> bool {
        !self.device.is_pip_blacklisted(pip)
            && self.bound_pip_net(pip).map_or(true, |owner| owner == net)
    }

    /// Number of bound wires.
    pub fn bound_wire_count(&self) -> usize {
        self.wire_bindings.len()
    }

    /// Number of bound pips.
    pub fn bound_pip_count(&self) -> usize {
        self.pip_bindings.len()
    }

    /// Binds a wire to a net with no driving pip.
    ///
    /// A weaker binding held by another net is evicted together with the
    /// pip that drove it.
    pub fn bind_wire(
        &mut self,
        wire: WireId,
        net: NetId,
        strength: Strength,
    ) -> Result<(), BindError> {
        let held = self.wire_binding(wire);
        if let (false, Some(holder), Some(held)) =
            (held.admits(net, strength), held.net(), held.strength())
        {
            return Err(BindError::WireConflict { wire, holder, held });
        }
        if held.net().is_some_and(|owner| owner != net) {
            self.release_wire(wire);
        }

        let bound = self.wire_binding(wire).rebound(net, strength);
        self.wire_bindings.insert(wire, bound);
        let strength = bound.strength().unwrap_or(strength);
        self.netlist
            .net_mut(net)
            .wires
            .entry(wire)
            .and_modify(|m| m.strength = strength)
            .or_insert(PipMap {
                pip: None,
                strength,
            });
        Ok(())
    }

    /// Binds a pip and its destination wire to a net.
    pub fn bind_pip(&mut self, pip: PipId, net: NetId, strength: Strength) -> Result<(), BindError> {
        if self.device.is_pip_blacklisted(pip) {
            return Err(BindError::Blacklisted(pip));
        }
        let dst = self.device.pip_dst_wire(pip);
        let pip_held = self.pip_binding(pip);
        if let (false, Some(holder), Some(held)) =
            (pip_held.admits(net, strength), pip_held.net(), pip_held.strength())
        {
            return Err(BindError::PipConflict { pip, holder, held });
        }
        let wire_held = self.wire_binding(dst);
        if let (false, Some(holder), Some(held)) =
            (wire_held.admits(net, strength), wire_held.net(), wire_held.strength())
        {
            return Err(BindError::WireConflict {
                wire: dst,
                holder,
                held,
            });
        }

        if pip_held.net().is_some_and(|owner| owner != net) {
            self.release_pip(pip);
        }
        if self.bound_wire_net(dst).is_some_and(|owner| owner != net) {
            self.release_wire(dst);
        }
        let previous = self.netlist.net(net).wires.get(&dst).and_then(|m| m.pip);
        if let Some(previous) = previous.filter(|&p| p != pip) {
            self.pip_bindings.remove(&previous);
        }

        let pip_bound = self.pip_binding(pip).rebound(net, strength);
        self.pip_bindings.insert(pip, pip_bound);
        let wire_bound = self.wire_binding(dst).rebound(net, strength);
        self.wire_bindings.insert(dst, wire_bound);
        self.netlist.net_mut(net).wires.insert(
            dst,
            PipMap {
                pip: Some(pip),
                strength: wire_bound.strength().unwrap_or(strength),
            },
        );
        Ok(())
    }

    /// Releases a wire and the pip driving it. Locked wires need `force`.
    pub fn unbind_wire(&mut self, wire: WireId, force: bool) -> Result<(), BindError> {
        match self.wire_binding(wire) {
            Binding::Unbound => Err(BindError::NotBound(self.device.wire_name(wire))),
            Binding::Locked(_) if !force => Err(BindError::Locked(self.device.wire_name(wire))),
            _ => {
                self.release_wire(wire);
                Ok(())
            }
        }
    }

    /// Releases a pip and the destination wire it drives. Locked pips need `force`.
    pub fn unbind_pip(&mut self, pip: PipId, force: bool) -> Result<(), BindError> {
        match self.pip_binding(pip) {
            Binding::Unbound => Err(BindError::NotBound(self.device.pip_name(pip))),
            Binding::Locked(_) if !force => Err(BindError::Locked(self.device.pip_name(pip))),
            _ => {
                self.release_pip(pip);
                Ok(())
            }
        }
    }

    fn release_wire(&mut self, wire: WireId) {
        let Some(owner) = self.wire_bindings.remove(&wire).and_then(Binding::net) else {
            return;
        };
        if let Some(pip) = self
            .netlist
            .net_mut(owner)
            .wires
            .remove(&wire)
            .and_then(|m| m.pip)
        {
            self.pip_bindings.remove(&pip);
        }
    }

    fn release_pip(&mut self, pip: PipId) {
        let Some(owner) = self.pip_bindings.remove(&pip).and_then(Binding::net) else {
            return;
        };
        let dst = self.device.pip_dst_wire(pip);
        let wires = &mut self.netlist.net_mut(owner).wires;
        if wires.get(&dst).is_some_and(|m| m.pip == Some(pip)) {
            wires.remove(&dst);
            self.wire_bindings.remove(&dst);
        }
    }

    // -- bels ---------------------------------------------------------------

    /// The cell occupying a bel.
    pub fn bound_bel_cell(&self, bel: BelId) -> Option<CellId> {
        self.tile_status[bel.tile as usize].bound_cells[bel.index as usize]
    }

    /// Whether a bel can take a cell: free and not routing-only.
    pub fn check_bel_avail(&self, bel: BelId) -> bool {
        !self.device().bel_is_routing(bel) && self.bound_bel_cell(bel).is_none()
    }

    /// Places a cell on a bel, moving it off any bel it held before.
    pub fn bind_bel(&mut self, bel: BelId, cell: CellId, strength: Strength) -> Result<(), BindError> {
        if let Some(other) = self.bound_bel_cell(bel).filter(|&c| c != cell) {
            return Err(BindError::BelOccupied { bel, cell: other });
        }
        if let Some(old) = self.netlist.cell(cell).bel.filter(|&b| b != bel) {
            self.tile_status[old.tile as usize].bound_cells[old.index as usize] = None;
        }
        self.tile_status[bel.tile as usize].bound_cells[bel.index as usize] = Some(cell);
        let c = self.netlist.cell_mut(cell);
        c.bel = Some(bel);
        c.bel_strength = strength;
        Ok(())
    }

    /// Removes the cell from a bel. Locked placements are refused.
    pub fn unbind_bel(&mut self, bel: BelId) -> Result<CellId, BindError> {
        let cell = self
            .bound_bel_cell(bel)
            .ok_or_else(|| BindError::NotBound(self.device.bel_name(bel)))?;
        if self.netlist.cell(cell).bel_strength == Strength::Locked {
            return Err(BindError::Locked(self.device.bel_name(bel)));
        }
        self.tile_status[bel.tile as usize].bound_cells[bel.index as usize] = None;
        self.netlist.cell_mut(cell).bel = None;
        Ok(cell)
    }

    /// Variant selected for a site.
    pub fn site_variant(&self, tile: u32, site: u32) -> Option<u32> {
        self.tile_status[tile as usize].site_variants[site as usize]
    }

    /// Selects a variant for a site.
    pub fn set_site_variant(&mut self, tile: u32, site: u32, variant: Option<u32>) {
        self.tile_status[tile as usize].site_variants[site as usize] = variant;
    }

    // -- net endpoints ------------------------------------------------------

    /// The wire driven by a net's placed driver.
    pub fn source_wire(&self, net: NetId) -> Option<WireId> {
        self.port_wire(self.netlist.net(net).driver?)
    }

    /// The wire feeding a placed sink port.
    pub fn sink_wire(&self, user: PortRef) -> Option<WireId> {
        self.port_wire(user)
    }

    fn port_wire(&self, port: PortRef) -> Option<WireId> {
        let cell = self.netlist.cell(port.cell);
        self.device.bel_pin_wire(cell.bel?, cell.bel_pin(port.port))
    }

    // -- sink locations -----------------------------------------------------

    /// The discovered physical location of a sink wire.
    pub fn sink_location(&self, wire: WireId) -> Option<(i32, i32)> {
        self.sink_locations.get(&wire).copied()
    }

    /// Records a sink location unless the wire already has one.
    pub fn set_sink_location(&mut self, wire: WireId, xy: (i32, i32)) -> bool {
        if self.sink_locations.contains_key(&wire) {
            return false;
        }
        self.sink_locations.insert(wire, xy);
        true
    }

    /// Number of wires with a discovered location.
    pub fn sink_location_count(&self) -> usize {
        self.sink_locations.len()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("device", &self.device)
            .field("cells", &self.netlist.cell_count())
            .field("nets", &self.netlist.net_count())
            .field("bound_wires", &self.wire_bindings.len())
            .field("bound_pips", &self.pip_bindings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_chipdb::{ChipDb, ChipDbBuilder, PinDir};
    use fabric_common::ContentHash;

    /// One interconnect tile: `A -> B` and `C -> B`, plus a slice with a bel.
    fn context() -> Context {
        let mut b = ChipDbBuilder::new("xc7bind", 1, 1);
        let tt = b.add_tile_type("CLBLL_L");
        let a = b.add_wire(tt, "A", "NODE_SINGLE");
        let bw = b.add_wire(tt, "B", "NODE_PINFEED");
        let c = b.add_wire(tt, "C", "NODE_DOUBLE");
        b.add_pip(tt, a, bw);
        b.add_pip(tt, c, bw);
        let lut = b.add_bel(tt, "A6LUT", "SLICE_LUTX", 0, Some(0));
        b.add_bel_pin(tt, lut, "A1", bw, PinDir::Input);
        let t = b.set_tile(0, 0, "CLBLL_L_X0Y0", tt);
        b.add_site(t, "SLICE_X0Y0", "SLICEL", "", None);
        let db = ChipDb::new(b.finish(), ContentHash::from_bytes(b"bind")).unwrap();
        Context::new(Device::new(db).unwrap())
    }

    fn wire(ctx: &Context, name: &str) -> WireId {
        ctx.device().wire_by_name(&format!("CLBLL_L_X0Y0/{name}")).unwrap()
    }

    const P_AB: PipId = PipId { tile: 0, index: 0 };
    const P_CB: PipId = PipId { tile: 0, index: 1 };

    #[test]
    fn site_variant_is_per_site_state() {
        let mut ctx = context();
        assert_eq!(ctx.site_variant(0, 0), None);
        ctx.set_site_variant(0, 0, Some(2));
        assert_eq!(ctx.site_variant(0, 0), Some(2));
        ctx.set_site_variant(0, 0, None);
        assert_eq!(ctx.site_variant(0, 0), None);
    }

    #[test]
    fn weaker_request_fails_and_keeps_owner() {
        let mut ctx = context();
        let (n1, n2) = (ctx.netlist.add_net("n1"), ctx.netlist.add_net("n2"));
        let w = wire(&ctx, "A");
        ctx.bind_wire(w, n1, Strength::Strong).unwrap();
        let err = ctx.bind_wire(w, n2, Strength::Strong).unwrap_err();
        assert_eq!(
            err,
            BindError::WireConflict {
                wire: w,
                holder: n1,
                held: Strength::Strong
            }
        );
        assert!(ctx.bind_wire(w, n2, Strength::Weak).is_err());
        assert_eq!(ctx.bound_wire_net(w), Some(n1));
    }

    #[test]
    fn stronger_request_evicts() {
        let mut ctx = context();
        let (n1, n2) = (ctx.netlist.add_net("n1"), ctx.netlist.add_net("n2"));
        let w = wire(&ctx, "A");
        ctx.bind_wire(w, n1, Strength::Weak).unwrap();
        ctx.bind_wire(w, n2, Strength::Locked).unwrap();
        assert_eq!(ctx.bound_wire_net(w), Some(n2));
        assert!(ctx.netlist.net(n1).wires.is_empty());
        assert!(ctx.bind_wire(w, n1, Strength::Locked).is_err());
    }

    #[test]
    fn same_net_keeps_stronger_strength() {
        let mut ctx = context();
        let n = ctx.netlist.add_net("n");
        let w = wire(&ctx, "A");
        ctx.bind_wire(w, n, Strength::Locked).unwrap();
        ctx.bind_wire(w, n, Strength::Weak).unwrap();
        assert_eq!(ctx.wire_binding(w), Binding::Locked(n));
        assert_eq!(ctx.netlist.net(n).wires[&w].strength, Strength::Locked);
    }

    #[test]
    fn bind_pip_claims_destination() {
        let mut ctx = context();
        let n = ctx.netlist.add_net("n");
        ctx.bind_pip(P_AB, n, Strength::Strong).unwrap();
        let b = wire(&ctx, "B");
        assert_eq!(ctx.bound_wire_net(b), Some(n));
        assert_eq!(ctx.netlist.net(n).wires[&b].pip, Some(P_AB));
        assert!(!ctx.check_pip_avail(P_AB));
        assert!(ctx.check_pip_avail_for_net(P_AB, n));

        // rerouting the same net through the other pip drops the first one
        ctx.bind_pip(P_CB, n, Strength::Strong).unwrap();
        assert!(ctx.check_pip_avail(P_AB));
        assert_eq!(ctx.netlist.net(n).wires[&b].pip, Some(P_CB));
    }

    #[test]
    fn conflicting_pip_leaves_state_untouched() {
        let mut ctx = context();
        let (n1, n2) = (ctx.netlist.add_net("n1"), ctx.netlist.add_net("n2"));
        ctx.bind_pip(P_AB, n1, Strength::Strong).unwrap();
        assert!(ctx.bind_pip(P_CB, n2, Strength::Weak).is_err());
        assert_eq!(ctx.bound_pip_net(P_CB), None);
        assert_eq!(ctx.bound_wire_net(wire(&ctx, "B")), Some(n1));
    }

    #[test]
    fn locked_release_needs_force() {
        let mut ctx = context();
        let n = ctx.netlist.add_net("n");
        ctx.bind_pip(P_AB, n, Strength::Locked).unwrap();
        assert!(matches!(ctx.unbind_pip(P_AB, false), Err(BindError::Locked(_))));
        ctx.unbind_pip(P_AB, true).unwrap();
        assert!(ctx.check_pip_avail(P_AB));
        assert!(ctx.check_wire_avail(wire(&ctx, "B")));
        assert!(matches!(ctx.unbind_pip(P_AB, false), Err(BindError::NotBound(_))));
    }

    #[test]
    fn unbind_wire_drops_driving_pip() {
        let mut ctx = context();
        let n = ctx.netlist.add_net("n");
        ctx.bind_pip(P_AB, n, Strength::Weak).unwrap();
        ctx.unbind_wire(wire(&ctx, "B"), false).unwrap();
        assert_eq!(ctx.bound_pip_count(), 0);
        assert_eq!(ctx.bound_wire_count(), 0);
    }

    #[test]
    fn bel_occupancy() {
        let mut ctx = context();
        let ty = ctx.id("SLICE_LUTX");
        let c1 = ctx.netlist.add_cell("c1", ty).unwrap();
        let c2 = ctx.netlist.add_cell("c2", ty).unwrap();
        let bel = BelId { tile: 0, index: 0 };
        ctx.bind_bel(bel, c1, Strength::Strong).unwrap();
        assert_eq!(
            ctx.bind_bel(bel, c2, Strength::Strong),
            Err(BindError::BelOccupied { bel, cell: c1 })
        );
        assert_eq!(ctx.unbind_bel(bel), Ok(c1));
        assert!(ctx.check_bel_avail(bel));
        assert_eq!(ctx.netlist.cell(c1).bel, None);
    }

    #[test]
    fn endpoints_follow_pin_map() {
        let mut ctx = context();
        let ty = ctx.id("SLICE_LUTX");
        let (i0, a1) = (ctx.id("I0"), ctx.id("A1"));
        let c = ctx.netlist.add_cell("lut", ty).unwrap();
        ctx.netlist.add_port(c, i0, PinDir::Input);
        let user = PortRef { cell: c, port: i0 };
        assert_eq!(ctx.sink_wire(user), None);

        ctx.bind_bel(BelId { tile: 0, index: 0 }, c, Strength::Strong).unwrap();
        assert_eq!(ctx.sink_wire(user), None);
        ctx.netlist.cell_mut(c).pin_map.insert(i0, a1);
        assert_eq!(ctx.sink_wire(user), Some(wire(&ctx, "B")));
    }

    #[test]
    fn sink_locations_are_first_write_wins() {
        let mut ctx = context();
        let w = wire(&ctx, "B");
        assert!(ctx.set_sink_location(w, (3, 4)));
        assert!(!ctx.set_sink_location(w, (5, 6)));
        assert_eq!(ctx.sink_location(w), Some((3, 4)));
    }

    #[test]
    fn routing_bels_are_not_placement_targets() {
        let mut b = ChipDbBuilder::new("xc7route", 1, 1);
        let tt = b.add_tile_type("CLBLL_L");
        let lut = b.add_bel(tt, "A6LUT", "SLICE_LUTX", 0, Some(0));
        let mux = b.add_bel(tt, "AOUTMUX", "SELMUX2_1", 1, Some(0));
        b.set_bel_routing(tt, mux);
        let t = b.set_tile(0, 0, "CLBLL_L_X0Y0", tt);
        b.add_site(t, "SLICE_X0Y0", "SLICEL", "", None);
        let db = ChipDb::new(b.finish(), ContentHash::from_bytes(b"route")).unwrap();
        let ctx = Context::new(Device::new(db).unwrap());

        let dev = ctx.device();
        assert!(!dev.bel_is_routing(BelId { tile: 0, index: lut }));
        assert!(dev.bel_is_routing(BelId { tile: 0, index: mux }));
        assert!(ctx.check_bel_avail(BelId { tile: 0, index: lut }));
        assert!(!ctx.check_bel_avail(BelId { tile: 0, index: mux }));
    }
}
