//! Pre-routing of power, ground and global clock nets.
//!
//! Each arc is routed by a breadth-first search walking uphill from the sink
//! wire until it reaches a wire already owned by the net. The discovered path
//! is then bound from that wire back down to the sink. The same search shape,
//! without binding, estimates where non-logic sinks actually join the general
//! interconnect.

use crate::binding::Strength;
use crate::context::Context;
use crate::ids::{NetId, PipId, WireId};
use crate::netlist::{PortRef, GND_NET, VCC_NET};
use fabric_chipdb::KnownId;
use fabric_common::{FabricResult, Ident, InternalError};
use fabric_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::{HashMap, VecDeque};

/// Cell types whose `O` output drives a global clock network.
const CLOCK_BUFFER_TYPES: [KnownId; 4] = [
    KnownId::BUFGCTRL,
    KnownId::BUFCE_BUFG_PS,
    KnownId::BUFCE_BUFCE,
    KnownId::BUFGCE_DIV_BUFGCE_DIV,
];

/// General interconnect intents the clock pass never routes through.
const CLOCK_EXCLUDED_INTENTS: [KnownId; 18] = [
    KnownId::NODE_DOUBLE,
    KnownId::NODE_HLONG,
    KnownId::NODE_HQUAD,
    KnownId::NODE_VLONG,
    KnownId::NODE_VQUAD,
    KnownId::NODE_SINGLE,
    KnownId::NODE_CLE_OUTPUT,
    KnownId::NODE_OPTDELAY,
    KnownId::BENTQUAD,
    KnownId::DOUBLE,
    KnownId::HLONG,
    KnownId::HQUAD,
    KnownId::OPTDELAY,
    KnownId::SINGLE,
    KnownId::VLONG,
    KnownId::VLONG12,
    KnownId::VQUAD,
    KnownId::PINBOUNCE,
];

/// Intents that still belong to a sink's local feed network.
const SINK_FEED_INTENTS: [KnownId; 8] = [
    KnownId::NODE_PINFEED,
    KnownId::PSEUDO_VCC,
    KnownId::PSEUDO_GND,
    KnownId::INTENT_DEFAULT,
    KnownId::NODE_DEDICATED,
    KnownId::NODE_OPTDELAY,
    KnownId::PINFEED,
    KnownId::INPUT,
];

/// Expansions allowed per sink when locating it.
const SINK_SEARCH_LIMIT: usize = 500;

fn code(number: u16) -> DiagnosticCode {
    DiagnosticCode::new(Category::Route, number)
}

fn listed(intent: Ident, list: &[KnownId]) -> bool {
    list.iter().any(|&k| intent == k)
}

/// Totals of one dedicated routing pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RouteReport {
    /// Nets the pass handled.
    pub nets: usize,
    /// Arcs connected to their net.
    pub arcs_routed: usize,
    /// Arcs left for the general router.
    pub arcs_left: usize,
    /// Pips bound by the pass.
    pub pips_bound: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pass {
    Constant,
    Clock,
}

impl Pass {
    fn strength(self) -> Strength {
        match self {
            Pass::Constant => Strength::Strong,
            Pass::Clock => Strength::Locked,
        }
    }

    fn admits_intent(self, intent: Ident) -> bool {
        match self {
            Pass::Constant => true,
            Pass::Clock => !listed(intent, &CLOCK_EXCLUDED_INTENTS),
        }
    }
}

impl Context {
    /// Routes the power and ground pseudo-nets onto their dedicated tie-off
    /// network at strong strength.
    ///
    /// Every sink must reach the net; a sink without a wire or without a path
    /// is an internal error.
    pub fn route_constant_nets(&mut self, diags: &DiagnosticSink) -> FabricResult<RouteReport> {
        let mut report = RouteReport::default();
        for name in [VCC_NET, GND_NET] {
            let Some(net) = self.netlist.net_by_name(name) else {
                continue;
            };
            diags.emit(Diagnostic::note(
                code(1),
                format!("routing {name} connections"),
            ));
            self.route_dedicated(net, Pass::Constant, diags, &mut report)?;
        }
        Ok(report)
    }

    /// Routes nets driven by global clock buffers through dedicated clock
    /// resources at locked strength.
    ///
    /// Sinks that cannot be reached without general interconnect are left
    /// unrouted for the general router.
    pub fn route_clocks(&mut self, diags: &DiagnosticSink) -> FabricResult<RouteReport> {
        diags.emit(Diagnostic::note(code(2), "routing global clocks"));
        let mut report = RouteReport::default();
        for net in self.netlist.nets_by_name() {
            let Some(driver) = self.netlist.net(net).driver else {
                continue;
            };
            let cell = self.netlist.cell(driver.cell);
            if !listed(cell.cell_type, &CLOCK_BUFFER_TYPES) || driver.port != KnownId::O {
                continue;
            }
            let name = self.netlist.net(net).name.clone();
            if cell.bel.is_none() {
                diags.emit(
                    Diagnostic::warning(
                        code(4),
                        format!("clock buffer '{}' is not placed", cell.name),
                    )
                    .with_note(format!("clock '{name}' is left to the general router")),
                );
                report.arcs_left += self.netlist.net(net).users.len();
                continue;
            }
            diags.emit(Diagnostic::note(code(3), format!("routing clock '{name}'")));
            self.route_dedicated(net, Pass::Clock, diags, &mut report)?;
        }
        Ok(report)
    }

    fn route_dedicated(
        &mut self,
        net: NetId,
        pass: Pass,
        diags: &DiagnosticSink,
        report: &mut RouteReport,
    ) -> FabricResult<()> {
        let name = self.netlist.net(net).name.clone();
        let source = self
            .source_wire(net)
            .ok_or_else(|| InternalError::new(format!("net '{name}' has no driver wire")))?;
        self.bind_wire(source, net, pass.strength())
            .map_err(|e| InternalError::new(format!("cannot bind source of '{name}': {e}")))?;
        report.nets += 1;

        let users = self.netlist.net(net).users.clone();
        for user in users {
            let Some(sink) = self.sink_wire(user) else {
                if pass == Pass::Constant {
                    return Err(InternalError::new(format!(
                        "pin '{}' has no associated wire",
                        self.describe_port(user)
                    )));
                }
                self.debug_note(diags, format!("{} has no wire", self.describe_port(user)));
                report.arcs_left += 1;
                continue;
            };
            if self.debug {
                self.debug_note(
                    diags,
                    format!(
                        "routing arc to {} (wire {})",
                        self.describe_port(user),
                        self.device().wire_name(sink)
                    ),
                );
            }

            if !self.wire_binding(sink).admits(net, pass.strength()) {
                let held = format!(
                    "wire {} of {} is held by another net",
                    self.device().wire_name(sink),
                    self.describe_port(user)
                );
                if pass == Pass::Constant {
                    return Err(InternalError::new(format!("cannot route net '{name}': {held}")));
                }
                self.debug_note(diags, held);
                report.arcs_left += 1;
                continue;
            }

            let Some(path) = self.search_uphill(sink, net, pass) else {
                if pass == Pass::Constant {
                    return Err(InternalError::new(format!(
                        "no route from net '{name}' to wire {}",
                        self.device().wire_name(sink)
                    )));
                }
                self.debug_note(diags, "failed to find a route using dedicated resources".into());
                report.arcs_left += 1;
                continue;
            };

            for pip in path {
                self.bind_pip(pip, net, pass.strength()).map_err(|e| {
                    InternalError::new(format!("cannot bind dedicated path of '{name}': {e}"))
                })?;
                if self.debug {
                    let dev = self.device();
                    self.debug_note(
                        diags,
                        format!(
                            "bind pip {} --> {}",
                            dev.pip_name(pip),
                            dev.wire_name(dev.pip_dst_wire(pip))
                        ),
                    );
                }
                report.pips_bound += 1;
            }
            report.arcs_routed += 1;
        }
        Ok(())
    }

    /// Searches uphill from `sink` for a wire owned by `net` and returns the
    /// pips from that wire down to the sink, in binding order.
    fn search_uphill(&self, sink: WireId, net: NetId, pass: Pass) -> Option<Vec<PipId>> {
        let dev = self.device();
        let mut backtrace: HashMap<WireId, Option<PipId>> = HashMap::new();
        backtrace.insert(sink, None);
        let mut visit = VecDeque::from([sink]);

        let mut dest = None;
        while let Some(curr) = visit.pop_front() {
            if self.bound_wire_net(curr) == Some(net) {
                dest = Some(curr);
                break;
            }
            for pip in dev.pips_uphill(curr) {
                if !self.check_pip_avail_for_net(pip, net) {
                    continue;
                }
                let src = dev.pip_src_wire(pip);
                if backtrace.contains_key(&src) || !pass.admits_intent(dev.wire_intent(src)) {
                    continue;
                }
                if self.bound_wire_net(src).is_some_and(|owner| owner != net) {
                    continue;
                }
                backtrace.insert(src, Some(pip));
                visit.push_back(src);
            }
        }

        let mut cursor = dest?;
        let mut path = Vec::new();
        while let Some(&Some(pip)) = backtrace.get(&cursor) {
            path.push(pip);
            cursor = dev.pip_dst_wire(pip);
        }
        Some(path)
    }

    /// Estimates where non-logic sinks join the general interconnect.
    ///
    /// Returns the number of sinks that were located. Sinks that are not
    /// located within the search limit keep their own tile coordinate.
    pub fn find_sink_locations(&mut self, diags: &DiagnosticSink) -> usize {
        let mut located = 0;
        for net in self.netlist.nets_by_name() {
            let users = self.netlist.net(net).users.clone();
            for user in users {
                let Some(bel) = self.netlist.cell(user.cell).bel else {
                    continue;
                };
                if self.device().is_logic_tile(bel) {
                    continue;
                }
                let Some(sink) = self.sink_wire(user) else {
                    continue;
                };
                if self.sink_location(sink).is_some() {
                    continue;
                }
                let Some((exit, trail)) = self.locate_sink(sink) else {
                    continue;
                };
                let dev = self.device();
                let xy = dev.tile_xy(dev.wire_tile(exit));
                if self.debug {
                    self.debug_note(
                        diags,
                        format!("{} <---- {}", dev.wire_name(sink), dev.wire_name(exit)),
                    );
                }
                self.set_sink_location(sink, xy);
                for wire in trail {
                    self.set_sink_location(wire, xy);
                }
                located += 1;
            }
        }
        diags.emit(Diagnostic::note(
            code(8),
            format!("located {located} non-logic sinks"),
        ));
        located
    }

    /// Bounded uphill search for the first wire outside the sink's local feed
    /// network. Returns that wire and the wires between it and the sink.
    fn locate_sink(&self, sink: WireId) -> Option<(WireId, Vec<WireId>)> {
        let dev = self.device();
        let mut backtrace: HashMap<WireId, Option<WireId>> = HashMap::new();
        backtrace.insert(sink, None);
        let mut visit = VecDeque::from([sink]);

        let mut iterations = 0;
        while let Some(cursor) = visit.pop_front() {
            if iterations >= SINK_SEARCH_LIMIT {
                break;
            }
            iterations += 1;
            if dev.wire_site(cursor).is_none() && !listed(dev.wire_intent(cursor), &SINK_FEED_INTENTS)
            {
                let mut trail = Vec::new();
                let mut at = cursor;
                while let Some(&Some(next)) = backtrace.get(&at) {
                    trail.push(next);
                    at = next;
                }
                return Some((cursor, trail));
            }
            for pip in dev.pips_uphill(cursor) {
                let src = dev.pip_src_wire(pip);
                if !backtrace.contains_key(&src) {
                    backtrace.insert(src, Some(cursor));
                    visit.push_back(src);
                }
            }
        }
        None
    }

    fn describe_port(&self, port: PortRef) -> String {
        let cell = self.netlist.cell(port.cell);
        format!("{}.{}", cell.name, self.device().name_of(port.port))
    }

    fn debug_note(&self, diags: &DiagnosticSink, message: String) {
        if self.debug {
            diags.emit(Diagnostic::note(code(5), message));
        }
    }
}
