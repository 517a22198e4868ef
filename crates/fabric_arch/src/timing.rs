//! Cell timing: arc delays, port classes and clocking information.

use crate::context::Context;
use crate::estimate::Delay;
use crate::ids::CellId;
use fabric_chipdb::{KnownId, PinDir};
use fabric_common::Ident;

/// Lists shorter than this are scanned linearly instead of bisected.
const LINEAR_SCAN_LIMIT: usize = 7;
/// Fallback LUT input-to-output delay.
const LUT_DEFAULT_DELAY: Delay = 200;
/// Fallback wide-mux delay.
const MUX_DEFAULT_DELAY: Delay = 100;
/// Clock buffer input-to-output delay.
const BUFG_DELAY: Delay = 200;
/// Stacking slot of the 5-input half of a LUT pair.
const BEL_5LUT: u32 = 1;
/// Bels with z below this sit in the SLICEM half of a CLBLM tile.
const SLICEM_Z_LIMIT: u32 = 64;

const LUT_INPUTS: [KnownId; 6] = [
    KnownId::A1,
    KnownId::A2,
    KnownId::A3,
    KnownId::A4,
    KnownId::A5,
    KnownId::A6,
];

/// The role a cell port plays in timing analysis.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimingPortClass {
    /// Not analyzed.
    Ignore,
    /// Input of a combinational arc.
    CombInput,
    /// Output of a combinational arc.
    CombOutput,
    /// Clock input of a register.
    ClockInput,
    /// Data input captured by a clock.
    RegisterInput,
    /// Output launched by a clock.
    RegisterOutput,
    /// A path starts here without a clock.
    Startpoint,
    /// A path ends here without a clock.
    Endpoint,
}

/// Active clock edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClockEdge {
    /// Rising edge.
    Rising,
    /// Falling edge.
    Falling,
}

/// Clocking constraints of a register port.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimingClockingInfo {
    /// Setup time.
    pub setup: Delay,
    /// Hold time.
    pub hold: Delay,
    /// Clock-to-output delay.
    pub clock_to_q: Delay,
    /// The clock port the constraint is relative to.
    pub clock_port: Ident,
    /// The active edge.
    pub edge: ClockEdge,
}

/// Converts nanoseconds to delay units.
pub fn delay_from_ns(ns: f64) -> Delay {
    (ns * 1000.0).round() as Delay
}

/// Converts delay units to nanoseconds.
pub fn delay_to_ns(delay: Delay) -> f64 {
    f64::from(delay) / 1000.0
}

/// Finds the entry with `key` in a list sorted by `key_of`.
fn find_sorted<T, K: Ord>(list: &[T], key: K, key_of: impl Fn(&T) -> K) -> Option<&T> {
    if list.len() < LINEAR_SCAN_LIMIT {
        list.iter().find(|item| key_of(item) == key)
    } else {
        list.binary_search_by(|item| key_of(item).cmp(&key))
            .ok()
            .map(|i| &list[i])
    }
}

fn is_wide_mux(cell_type: Ident) -> bool {
    cell_type == KnownId::F7MUX
        || cell_type == KnownId::F8MUX
        || cell_type == KnownId::F9MUX
        || cell_type == KnownId::SELMUX2_1
}

impl Context {
    fn clock_port(&self) -> Ident {
        if self.device().family().is_xc7() {
            KnownId::CK.ident()
        } else {
            KnownId::CLK.ident()
        }
    }

    /// Looks up a stored arc delay for a placed cell's timing instance.
    fn timing_lookup(&self, cell: CellId, variant: Ident, from: Ident, to: Ident) -> Option<Delay> {
        let bel = self.netlist.cell(cell).bel?;
        let inst = self.device().instance_timing(bel)?;
        let cell_timing = find_sorted(&inst.cell_types, variant, |c| c.variant)?;
        find_sorted(&cell_timing.delays, (to, from), |d| (d.to_port, d.from_port))
            .map(|d| d.max_delay)
    }

    /// Delay of the arc `from -> to` through a cell; `None` when the arc is
    /// not modelled.
    pub fn cell_delay(&self, cell: CellId, from: Ident, to: Ident) -> Option<Delay> {
        let c = self.netlist.cell(cell);
        let dev = self.device();
        let timed_bel = c
            .bel
            .filter(|&bel| dev.family().is_xc7() && dev.bel_timing_inst(bel).is_some());

        if c.cell_type == KnownId::SLICE_LUTX {
            if let Some(bel) = timed_bel {
                let z = dev.bel_location(bel).z as u32;
                let tile_type = dev.bel_tile_type(bel);
                let is_lut5 = (z & 0xF) == BEL_5LUT;
                let is_slicem = (tile_type == KnownId::CLBLM_L || tile_type == KnownId::CLBLM_R)
                    && z < SLICEM_Z_LIMIT;
                let variant = match (is_slicem, is_lut5) {
                    (true, true) => KnownId::LUT_OR_MEM5LRAM,
                    (true, false) => KnownId::LUT_OR_MEM6LRAM,
                    (false, true) => KnownId::LUT5,
                    (false, false) => KnownId::LUT6,
                };
                if from == KnownId::CLK {
                    return None;
                }
                let from = if is_lut5 && from == KnownId::A6 { KnownId::A5.ident() } else { from };
                let to = if is_lut5 && to == KnownId::O6 { KnownId::O5.ident() } else { to };
                return self.timing_lookup(cell, variant.ident(), from, to);
            }
            let is_input = LUT_INPUTS.iter().any(|&a| from == a);
            let is_output = to == KnownId::O5 || to == KnownId::O6;
            return (is_input && is_output).then_some(LUT_DEFAULT_DELAY);
        }
        if c.cell_type == KnownId::CARRY4 {
            return timed_bel.and_then(|_| self.timing_lookup(cell, KnownId::CARRY4.ident(), from, to));
        }
        if is_wide_mux(c.cell_type) {
            return match timed_bel {
                Some(_) => self.timing_lookup(cell, c.cell_type, from, to),
                None => Some(MUX_DEFAULT_DELAY),
            };
        }
        if c.cell_type == KnownId::BUFGCTRL
            && (from == KnownId::I0 || from == KnownId::I1)
            && to == KnownId::O
        {
            return Some(BUFG_DELAY);
        }
        None
    }

    /// Timing class of a cell port and the number of clocking records it has.
    pub fn port_timing_class(&self, cell: CellId, port: Ident) -> (TimingPortClass, u32) {
        use TimingPortClass::*;
        let c = self.netlist.cell(cell);
        let ty = c.cell_type;

        if ty == KnownId::SLICE_LUTX {
            let drives = |out: KnownId| c.port_net(out.ident()).is_some();
            if !drives(KnownId::O5) && !drives(KnownId::O6) {
                return (Ignore, 0);
            }
            if LUT_INPUTS.iter().any(|&a| port == a) {
                return (CombInput, 0);
            }
            if port == KnownId::O5 || port == KnownId::O6 {
                return (CombOutput, 0);
            }
        } else if ty == KnownId::CARRY4 && c.bel.is_some() {
            return match c.ports.get(&port).map(|p| p.dir) {
                Some(PinDir::Output) => (CombOutput, 0),
                Some(_) => (CombInput, 0),
                None => (Ignore, 0),
            };
        } else if ty == KnownId::SLICE_FFX {
            return if port == self.clock_port() {
                (ClockInput, 0)
            } else if port == KnownId::Q {
                (RegisterOutput, 1)
            } else {
                (RegisterInput, 1)
            };
        } else if is_wide_mux(ty) {
            return if port == KnownId::OUT {
                (CombOutput, 0)
            } else {
                (CombInput, 0)
            };
        } else if ty == KnownId::IOB_IBUFCTRL {
            if port == KnownId::O {
                return (Startpoint, 0);
            }
        } else if ty == KnownId::IOB_OUTBUF {
            if port == KnownId::I {
                return (Endpoint, 0);
            }
        } else if ty == KnownId::BUFGCTRL {
            if port == KnownId::I0 || port == KnownId::I1 {
                return (CombInput, 0);
            }
            if port == KnownId::O {
                return (CombOutput, 0);
            }
        }
        (Ignore, 0)
    }

    /// Clocking record `index` of a register port.
    pub fn port_clocking_info(&self, _cell: CellId, _port: Ident, _index: u32) -> TimingClockingInfo {
        let t = delay_from_ns(0.1);
        TimingClockingInfo {
            setup: t,
            hold: t,
            clock_to_q: t,
            clock_port: self.clock_port(),
            edge: ClockEdge::Rising,
        }
    }
}
