//! Statically known identifiers.
//!
//! These names occupy the first [`KNOWN_ID_COUNT`] slots of every database's
//! identifier table, in declaration order, so backend code can compare an
//! interned name against a constant without a string lookup. Names used
//! only by some devices are stored in the database as extra identifiers and
//! registered after these.

use fabric_common::Ident;

macro_rules! known_ids {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        /// An identifier whose index is fixed across all databases.
        #[repr(u32)]
        #[allow(non_camel_case_types, missing_docs)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum KnownId {
            $($(#[$meta])* $name,)*
        }

        /// The strings of all known identifiers, indexed by [`KnownId`] discriminant.
        pub const KNOWN_ID_NAMES: &[&str] = &[$(stringify!($name),)*];

        impl KnownId {
            const ALL: &'static [KnownId] = &[$(KnownId::$name,)*];
        }
    };
}

known_ids! {
    // wire intents
    INTENT_DEFAULT,
    NODE_DOUBLE,
    NODE_HLONG,
    NODE_HQUAD,
    NODE_VLONG,
    NODE_VQUAD,
    NODE_SINGLE,
    NODE_CLE_OUTPUT,
    NODE_OPTDELAY,
    NODE_PINFEED,
    NODE_PINBOUNCE,
    NODE_LOCAL,
    NODE_DEDICATED,
    NODE_OUTPUT,
    NODE_GLOBAL_BUFG,
    NODE_GLOBAL_HROUTE,
    NODE_GLOBAL_VROUTE,
    NODE_GLOBAL_HDISTR,
    NODE_GLOBAL_VDISTR,
    NODE_GLOBAL_LEAF,
    BENTQUAD,
    DOUBLE,
    HLONG,
    HQUAD,
    OPTDELAY,
    SINGLE,
    VLONG,
    VLONG12,
    VQUAD,
    PINBOUNCE,
    PINFEED,
    INPUT,
    OUTPUT,
    // intents and bel types of the constant drivers
    PSEUDO_GND,
    PSEUDO_VCC,
    // cell types
    SLICE_LUTX,
    SLICE_FFX,
    CARRY4,
    F7MUX,
    F8MUX,
    F9MUX,
    SELMUX2_1,
    BUFGCTRL,
    BUFCE_BUFG_PS,
    BUFCE_BUFCE,
    BUFGCE_DIV_BUFGCE_DIV,
    IOB_IBUFCTRL,
    IOB_OUTBUF,
    PAD,
    // timing variants
    LUT5,
    LUT6,
    LUT_OR_MEM5LRAM,
    LUT_OR_MEM6LRAM,
    // ports
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    O5,
    O6,
    CLK,
    CK,
    CE,
    SR,
    D,
    Q,
    I,
    I0,
    I1,
    O,
    OUT,
    // logic tile types
    CLBLL_L,
    CLBLL_R,
    CLBLM_L,
    CLBLM_R,
    CLEL_L,
    CLEL_R,
    CLEM,
    CLEM_R,
    // wire names
    PSEUDO_GND_WIRE_GLBL,
    PSEUDO_VCC_WIRE_GLBL,
    PSEUDO_GND_WIRE_ROW,
    PSEUDO_VCC_WIRE_ROW,
    IOI_IOCLK0,
    IOI_SING_IOCLK0,
}

/// The number of statically known identifiers.
pub const KNOWN_ID_COUNT: u32 = KNOWN_ID_NAMES.len() as u32;

impl KnownId {
    /// The interned identifier of this name.
    pub const fn ident(self) -> Ident {
        Ident::from_raw(self as u32)
    }

    /// Returns the known identifier with the given index, if it is one.
    pub fn from_ident(ident: Ident) -> Option<KnownId> {
        Self::ALL.get(ident.as_raw() as usize).copied()
    }

    /// The string form of this identifier.
    pub fn name(self) -> &'static str {
        KNOWN_ID_NAMES[self as usize]
    }
}

impl PartialEq<KnownId> for Ident {
    fn eq(&self, other: &KnownId) -> bool {
        *self == other.ident()
    }
}
