//! Architecture backend for the fabric place-and-route flow.
//!
//! Wraps an opened device database in a queryable [`Device`] and layers the
//! mutable implementation state on top of it in a [`Context`]: resource
//! ownership with ordered strengths, bel occupancy, heuristic delay
//! estimates, the dedicated-net router and cell timing lookups.
//!
//! # Pipeline
//!
//! 1. **Open**: [`Device::load`] maps the database and builds name indices
//! 2. **Constrain**: [`xdc::parse_xdc`] applies port properties to the netlist
//! 3. **Place**: [`flow::place`] hands a [`PlacerSetup`] to an external engine
//! 4. **Route**: [`flow::route`] routes power, ground and clocks, locates
//!    non-logic sinks, then runs an external general router
//!
//! # Usage
//!
//! ```ignore
//! use fabric_arch::{Context, Device};
//!
//! let mut ctx = Context::new(Device::load(path)?);
//! let summary = fabric_arch::flow::pre_route(&mut ctx, &sink)?;
//! ```

#![warn(missing_docs)]

pub mod binding;
pub mod blacklist;
pub mod context;
pub mod dedicated;
pub mod device;
pub mod estimate;
pub mod flow;
pub mod ids;
pub mod netlist;
pub mod timing;
pub mod xdc;

pub use binding::{BindError, Binding, PipMap, Strength};
pub use blacklist::PipBlacklist;
pub use context::Context;
pub use dedicated::RouteReport;
pub use device::Device;
pub use estimate::{ArcBounds, Delay};
pub use flow::{FlowError, GeneralRouter, PlacementEngine, PlacerSetup, PreRouteSummary};
pub use ids::{BelId, CellId, Loc, NetId, PipId, WireId};
pub use netlist::{Cell, Net, Netlist, PortInfo, PortRef, GND_NET, VCC_NET};
pub use timing::{ClockEdge, TimingClockingInfo, TimingPortClass};
pub use xdc::ConstraintError;
