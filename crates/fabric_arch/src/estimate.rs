//! Heuristic delay and cost estimates.
//!
//! None of these functions search the routing graph. Each endpoint is
//! reduced to an approximate grid coordinate and a clipped-linear Manhattan
//! model is applied, with fixed adjustments for the source wire's intent.

use crate::context::Context;
use crate::ids::{NetId, WireId};
use crate::netlist::PortRef;
use fabric_chipdb::KnownId;
use fabric_common::Ident;

/// A delay in picoseconds.
pub type Delay = i32;

/// Node members scanned when approximating a node source's coordinate.
const NODE_SCAN_LIMIT: usize = 200;
/// Estimate for a device-wide power/ground source.
const GLOBAL_PSEUDO_DELAY: Delay = 15000;
/// Estimate when source and destination meet at a discovered sink location.
const SINK_LOCAL_DELAY: Delay = 1000;
/// Stacking slot of the second flip-flop of a cluster.
const BEL_FF2: i32 = 3;

/// Clipped-linear Manhattan model: `near` per step up to `knee`, `far` beyond.
#[derive(Clone, Copy, Debug)]
struct AxisCost {
    near: Delay,
    knee: i32,
    far: Delay,
}

impl AxisCost {
    fn apply(self, distance: i32) -> Delay {
        let d = distance.abs();
        self.near * d.min(self.knee) + self.far * (d - self.knee).max(0)
    }
}

const ROUTE_X: AxisCost = AxisCost {
    near: 30,
    knee: 18,
    far: 10,
};
const ROUTE_Y: AxisCost = AxisCost {
    near: 60,
    knee: 6,
    far: 20,
};
const ROUTE_BASE: Delay = 300;

const PREDICT_X: AxisCost = AxisCost {
    near: 70,
    knee: 18,
    far: 50,
};
const PREDICT_Y: AxisCost = AxisCost {
    near: 210,
    knee: 6,
    far: 150,
};
const PREDICT_BASE: Delay = 500;

/// An axis-aligned rectangle of grid coordinates, inclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ArcBounds {
    /// Left column.
    pub x0: i32,
    /// Bottom row.
    pub y0: i32,
    /// Right column.
    pub x1: i32,
    /// Top row.
    pub y1: i32,
}

impl ArcBounds {
    /// The rectangle spanning two points.
    pub fn spanning((ax, ay): (i32, i32), (bx, by): (i32, i32)) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    /// Whether a point lies inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Manhattan distance from a point to the rectangle; zero inside.
    pub fn distance(&self, x: i32, y: i32) -> i32 {
        let dx = (self.x0 - x).max(0) + (x - self.x1).max(0);
        let dy = (self.y0 - y).max(0) + (y - self.y1).max(0);
        dx + dy
    }
}

/// How a source endpoint was resolved.
enum SourceAnchor {
    /// A device-wide power/ground wire; it has no useful coordinate.
    Global,
    /// A grid coordinate.
    At(i32, i32),
}

fn is_pseudo_power(intent: Ident) -> bool {
    intent == KnownId::PSEUDO_GND || intent == KnownId::PSEUDO_VCC
}

impl Context {
    /// Coordinate of a tile-local wire or node: a discovered sink location,
    /// else its site's interconnect coordinate, else its tile's coordinate.
    fn wire_anchor(&self, wire: WireId) -> (i32, i32) {
        if let Some(xy) = self.sink_location(wire) {
            return xy;
        }
        let dev = self.device();
        match wire {
            WireId::Tile { tile, .. } if dev.tile_site_count(tile) > 0 => {
                let site = dev.wire_site(wire).unwrap_or(0);
                dev.site_inter_xy(tile, site)
                    .unwrap_or_else(|| dev.tile_xy(tile))
            }
            _ => dev.tile_xy(dev.wire_tile(wire)),
        }
    }

    /// Coordinate of a source wire relative to a destination coordinate.
    ///
    /// Power/ground nodes sit at their tile, or mid-row for row-wide wires.
    /// Other nodes take the member nearest the destination on each axis
    /// independently, among members that drive something.
    fn source_anchor(&self, src: WireId, dst_xy: (i32, i32)) -> SourceAnchor {
        let dev = self.device();
        let WireId::Node(_) = src else {
            let (x, y) = self.wire_anchor(src);
            return SourceAnchor::At(x, y);
        };
        if let Some((x, y)) = self.sink_location(src) {
            return SourceAnchor::At(x, y);
        }

        let intent = dev.wire_intent(src);
        if is_pseudo_power(intent) {
            let name = dev.wire_info(src).name;
            if name == KnownId::PSEUDO_GND_WIRE_GLBL || name == KnownId::PSEUDO_VCC_WIRE_GLBL {
                return SourceAnchor::Global;
            }
            let (mut x, y) = dev.tile_xy(dev.wire_tile(src));
            if name == KnownId::PSEUDO_GND_WIRE_ROW || name == KnownId::PSEUDO_VCC_WIRE_ROW {
                x = dev.width() / 2;
            }
            return SourceAnchor::At(x, y);
        }

        let (dst_x, dst_y) = dst_xy;
        let mut best: Option<(i32, i32)> = None;
        for tw in dev.wire_members(src).take(NODE_SCAN_LIMIT) {
            if dev.member_info(tw).downhill.is_empty() && intent != KnownId::NODE_PINFEED {
                continue;
            }
            let (tx, ty) = dev.tile_xy(tw.tile);
            best = Some(match best {
                None => (tx, ty),
                Some((bx, by)) => (
                    if (tx - dst_x).abs() < (bx - dst_x).abs() { tx } else { bx },
                    if (ty - dst_y).abs() < (by - dst_y).abs() { ty } else { by },
                ),
            });
        }
        let (x, y) = best.unwrap_or_else(|| dev.tile_xy(dev.wire_tile(src)));
        SourceAnchor::At(x, y)
    }

    /// Estimated delay of routing from `src` to `dst`; zero only when they
    /// are the same wire.
    pub fn estimate_delay(&self, src: WireId, dst: WireId) -> Delay {
        if src == dst {
            return 0;
        }
        let dev = self.device();
        let dst_sink = self.sink_location(dst);
        if let Some(dst_loc) = dst_sink {
            if dev.wire_tile(src) == dev.wire_tile(dst) || self.sink_location(src) == Some(dst_loc) {
                return SINK_LOCAL_DELAY;
            }
        }

        let (dst_x, dst_y) = self.wire_anchor(dst);
        let (src_x, src_y) = match self.source_anchor(src, (dst_x, dst_y)) {
            SourceAnchor::Global => return GLOBAL_PSEUDO_DELAY,
            SourceAnchor::At(x, y) => (x, y),
        };

        let mut base = ROUTE_X.apply(dst_x - src_x) + ROUTE_Y.apply(dst_y - src_y) + ROUTE_BASE;
        if dev.family().is_xc7() {
            base = base * 3 / 2;
        }

        let intent = dev.wire_intent(src);
        let same_xy = (src_x, src_y) == (dst_x, dst_y);
        if dst_sink.is_some() {
            base += 1000;
        }
        if intent == KnownId::NODE_PINFEED && same_xy {
            base -= 200;
        } else if (intent == KnownId::NODE_LOCAL || intent == KnownId::NODE_PINBOUNCE) && same_xy {
            base -= 100;
        }
        if intent == KnownId::NODE_CLE_OUTPUT {
            base -= 80;
        }
        base
    }

    /// The rectangle spanning the approximate coordinates of both endpoints.
    pub fn route_bounding_box(&self, src: WireId, dst: WireId) -> ArcBounds {
        let dst_xy = self.wire_anchor(dst);
        let src_xy = match self.source_anchor(src, dst_xy) {
            SourceAnchor::At(x, y) => (x, y),
            SourceAnchor::Global => self.device().tile_xy(self.device().wire_tile(src)),
        };
        ArcBounds::spanning(src_xy, dst_xy)
    }

    /// Extra cost for leaving the bounding box by `distance` tiles.
    pub fn bounding_box_cost(&self, src: WireId, distance: i32) -> Delay {
        let est = self.estimator();
        if matches!(src, WireId::Node(_)) && is_pseudo_power(self.device().wire_intent(src)) {
            return 0;
        }
        if distance < est.bbox_cost_threshold {
            return 0;
        }
        (distance - est.bbox_cost_threshold) * est.bbox_cost_per_unit
    }

    /// Penalty for ripping up a net from a wire; pin feeds are dearer.
    pub fn wire_ripup_delay_penalty(&self, wire: WireId) -> Delay {
        let base = self.ripup_delay_penalty();
        if self.device().wire_intent(wire) == KnownId::NODE_PINFEED {
            base * 3 / 2
        } else {
            base
        }
    }

    /// Placement-time estimate from a net's driver bel to a sink bel.
    ///
    /// Zero when either end is unplaced.
    pub fn predict_delay(&self, net: NetId, sink: PortRef) -> Delay {
        let Some(driver) = self.netlist.net(net).driver else {
            return 0;
        };
        let (Some(src_bel), Some(dst_bel)) = (
            self.netlist.cell(driver.cell).bel,
            self.netlist.cell(sink.cell).bel,
        ) else {
            return 0;
        };
        let dev = self.device();
        let (src, dst) = (dev.bel_location(src_bel), dev.bel_location(dst_bel));

        if src_bel.tile == dst_bel.tile {
            let cluster = self.estimator().cluster_bels.max(1) as i32;
            return if src.z / cluster == dst.z / cluster {
                0
            } else if dst.z % cluster == BEL_FF2 {
                700
            } else {
                150
            };
        }
        PREDICT_X.apply(dst.x - src.x) + PREDICT_Y.apply(dst.y - src.y) + PREDICT_BASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_cost_is_clipped_linear() {
        assert_eq!(ROUTE_X.apply(0), 0);
        assert_eq!(ROUTE_X.apply(18), 540);
        assert_eq!(ROUTE_X.apply(-20), 560);
        assert_eq!(ROUTE_Y.apply(7), 380);
        assert_eq!(PREDICT_Y.apply(6), 1260);
    }

    #[test]
    fn bounds_contain_and_measure() {
        let b = ArcBounds::spanning((4, 1), (2, 3));
        assert_eq!(
            b,
            ArcBounds {
                x0: 2,
                y0: 1,
                x1: 4,
                y1: 3
            }
        );
        assert!(b.contains(3, 2));
        assert!(!b.contains(5, 2));
        assert_eq!(b.distance(3, 2), 0);
        assert_eq!(b.distance(6, 0), 3);
    }
}
