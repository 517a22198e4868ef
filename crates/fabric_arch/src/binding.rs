//! Resource ownership with ordered strengths.
//!
//! Every wire and pip is either unbound or owned by exactly one net at one
//! [`Strength`]. A bind request wins if the resource is free, already owned
//! by the same net, or owned at a strictly weaker strength. Locked
//! ownership is never taken away.

use crate::ids::{BelId, CellId, NetId, PipId, WireId};
use serde::{Deserialize, Serialize};

/// Priority of a binding; later variants override earlier ones.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Strength {
    /// Tentative ownership the general router may rip up.
    Weak,
    /// Ownership from placement or the constant-net pass.
    Strong,
    /// Ownership from the clock pass; never evicted.
    Locked,
}

/// The ownership record of one wire or pip.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Binding {
    /// Free.
    #[default]
    Unbound,
    /// Owned at [`Strength::Weak`].
    Weak(NetId),
    /// Owned at [`Strength::Strong`].
    Strong(NetId),
    /// Owned at [`Strength::Locked`].
    Locked(NetId),
}

impl Binding {
    /// Creates a bound record.
    pub fn bound(net: NetId, strength: Strength) -> Self {
        match strength {
            Strength::Weak => Binding::Weak(net),
            Strength::Strong => Binding::Strong(net),
            Strength::Locked => Binding::Locked(net),
        }
    }

    /// The owning net, if bound.
    pub fn net(self) -> Option<NetId> {
        match self {
            Binding::Unbound => None,
            Binding::Weak(n) | Binding::Strong(n) | Binding::Locked(n) => Some(n),
        }
    }

    /// The strength of the ownership, if bound.
    pub fn strength(self) -> Option<Strength> {
        match self {
            Binding::Unbound => None,
            Binding::Weak(_) => Some(Strength::Weak),
            Binding::Strong(_) => Some(Strength::Strong),
            Binding::Locked(_) => Some(Strength::Locked),
        }
    }

    /// Whether a request by `net` at `strength` may take this resource.
    pub fn admits(self, net: NetId, strength: Strength) -> bool {
        match (self.net(), self.strength()) {
            (Some(owner), Some(held)) => owner == net || strength > held,
            _ => true,
        }
    }

    /// The record after `net` binds at `strength`; rebinding the owner keeps the stronger strength.
    pub fn rebound(self, net: NetId, strength: Strength) -> Self {
        match (self.net(), self.strength()) {
            (Some(owner), Some(held)) if owner == net => Binding::bound(net, held.max(strength)),
            _ => Binding::bound(net, strength),
        }
    }
}

/// A routed wire of a net and the pip driving it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PipMap {
    /// The driving pip, `None` for the net's source wire or a directly bound wire.
    pub pip: Option<PipId>,
    /// The strength the wire was bound at.
    pub strength: Strength,
}

/// A refused binding operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The wire is owned by another net at an equal or stronger strength.
    #[error("wire {wire:?} is held by net {holder} at {held:?}")]
    WireConflict {
        /// The contested wire.
        wire: WireId,
        /// The current owner.
        holder: NetId,
        /// The owner's strength.
        held: Strength,
    },
    /// The pip is owned by another net at an equal or stronger strength.
    #[error("pip {pip:?} is held by net {holder} at {held:?}")]
    PipConflict {
        /// The contested pip.
        pip: PipId,
        /// The current owner.
        holder: NetId,
        /// The owner's strength.
        held: Strength,
    },
    /// The pip is architecturally unusable.
    #[error("pip {0:?} is blacklisted")]
    Blacklisted(PipId),
    /// Releasing a locked binding without force.
    #[error("{0} is locked")]
    Locked(String),
    /// The resource is not bound.
    #[error("{0} is not bound")]
    NotBound(String),
    /// The bel already holds another cell.
    #[error("bel {bel:?} is occupied by cell {cell}")]
    BelOccupied {
        /// The contested bel.
        bel: BelId,
        /// The occupying cell.
        cell: CellId,
    },
}
