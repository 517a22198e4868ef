//! Place and route entry points.
//!
//! The placement and general routing engines live outside this crate and
//! plug in through [`PlacementEngine`] and [`GeneralRouter`]. The flow
//! functions prepare their inputs, run the dedicated-net passes and record
//! the completed step in the context attributes.

use crate::context::Context;
use crate::dedicated::RouteReport;
use fabric_chipdb::KnownId;
use fabric_common::{FabricResult, Ident, InternalError};
use fabric_config::{ConfigError, PlacerKind};
use fabric_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Criticality exponent used by the analytical placer.
const HEAP_CRITICALITY_EXPONENT: u32 = 7;

/// Cell types the analytical placer treats as fixed I/O buffers.
const HEAP_IO_BUF_TYPES: [KnownId; 4] = [
    KnownId::IOB_IBUFCTRL,
    KnownId::IOB_OUTBUF,
    KnownId::PSEUDO_GND,
    KnownId::PSEUDO_VCC,
];

/// Settings handed to a placement engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacerSetup {
    /// The selected placer.
    pub kind: PlacerKind,
    /// Exponent applied to net criticality, if the placer uses one.
    pub criticality_exponent: Option<u32>,
    /// Cell types treated as I/O buffers.
    pub io_buf_types: Vec<Ident>,
}

impl PlacerSetup {
    /// The tuned setup for a placer.
    pub fn for_kind(kind: PlacerKind) -> Self {
        match kind {
            PlacerKind::Heap => Self {
                kind,
                criticality_exponent: Some(HEAP_CRITICALITY_EXPONENT),
                io_buf_types: HEAP_IO_BUF_TYPES.iter().map(|k| k.ident()).collect(),
            },
            PlacerKind::Sa => Self {
                kind,
                criticality_exponent: None,
                io_buf_types: Vec::new(),
            },
        }
    }
}

/// A placement algorithm.
pub trait PlacementEngine {
    /// Places every cell, binding bels through the context. Returns `false`
    /// if placement did not converge.
    fn place(
        &mut self,
        ctx: &mut Context,
        setup: &PlacerSetup,
        diags: &DiagnosticSink,
    ) -> FabricResult<bool>;
}

/// A general-purpose router run after the dedicated passes.
pub trait GeneralRouter {
    /// Routes every remaining arc. Returns `false` if routing did not converge.
    fn route(&mut self, ctx: &mut Context, diags: &DiagnosticSink) -> FabricResult<bool>;
}

/// A failed flow step.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The run configuration or settings are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A structural invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Totals of the passes run before general routing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PreRouteSummary {
    /// The power/ground pass.
    pub constants: RouteReport,
    /// The global clock pass.
    pub clocks: RouteReport,
    /// Sinks whose physical location was discovered.
    pub sinks_located: usize,
}

/// The placer selected by the `placer` setting, else the configured default.
pub fn selected_placer(ctx: &Context) -> Result<PlacerKind, ConfigError> {
    match ctx.settings.get("placer") {
        Some(name) => PlacerKind::parse(name),
        None => Ok(ctx.default_placer()),
    }
}

/// Runs placement with the selected placer.
pub fn place(
    ctx: &mut Context,
    engine: &mut dyn PlacementEngine,
    diags: &DiagnosticSink,
) -> Result<bool, FlowError> {
    let kind = selected_placer(ctx)?;
    let setup = PlacerSetup::for_kind(kind);
    diags.emit(Diagnostic::note(
        DiagnosticCode::new(Category::Place, 1),
        format!("placing with the '{kind}' placer"),
    ));
    if !engine.place(ctx, &setup, diags)? {
        return Ok(false);
    }
    ctx.attrs.insert("step".into(), "place".into());
    Ok(true)
}

/// Runs the dedicated-net passes without the general router.
pub fn pre_route(ctx: &mut Context, diags: &DiagnosticSink) -> FabricResult<PreRouteSummary> {
    let constants = ctx.route_constant_nets(diags)?;
    let clocks = ctx.route_clocks(diags)?;
    let sinks_located = ctx.find_sink_locations(diags);
    Ok(PreRouteSummary {
        constants,
        clocks,
        sinks_located,
    })
}

/// Routes the design: dedicated nets first, then the general router.
pub fn route(
    ctx: &mut Context,
    router: &mut dyn GeneralRouter,
    diags: &DiagnosticSink,
) -> Result<bool, FlowError> {
    let summary = pre_route(ctx, diags)?;
    diags.emit(Diagnostic::note(
        DiagnosticCode::new(Category::Route, 9),
        format!(
            "dedicated routing bound {} pips; {} clock arcs left for the general router",
            summary.constants.pips_bound + summary.clocks.pips_bound,
            summary.clocks.arcs_left
        ),
    ));
    let routed = router.route(ctx, diags)?;
    ctx.attrs.insert("step".into(), "route".into());
    Ok(routed)
}
