//! Static pip blacklist.
//!
//! Some 7-series clock-management pips are known to be broken or to create
//! unroutable feedback. They are excluded by name-pattern rules evaluated
//! once per tile type when the device is opened, and memoized into one
//! bitset per tile type so the availability check is a single bit test.

use bitvec::vec::BitVec;
use fabric_chipdb::ChipDb;
use fabric_common::Interner;

#[derive(Clone, Copy, Debug)]
enum TypeMatch {
    Prefix(&'static str),
    Contains(&'static str),
}

impl TypeMatch {
    fn matches(self, type_name: &str) -> bool {
        match self {
            TypeMatch::Prefix(p) => type_name.starts_with(p),
            TypeMatch::Contains(p) => type_name.contains(p),
        }
    }
}

/// One rule: a tile type pattern and optional substrings the pip's wire
/// names must contain. A rule without wire patterns blacklists every pip
/// of the matching type.
#[derive(Clone, Copy, Debug)]
struct BlacklistRule {
    tile_type: TypeMatch,
    dst_contains: Option<&'static str>,
    src_contains: Option<&'static str>,
}

/// Rules in priority order; a tile type uses the first rule it matches.
const XC7_RULES: &[BlacklistRule] = &[
    BlacklistRule {
        tile_type: TypeMatch::Prefix("HCLK_CMT"),
        dst_contains: Some("FREQ_REF"),
        src_contains: None,
    },
    BlacklistRule {
        tile_type: TypeMatch::Prefix("CMT_TOP_L_LOWER"),
        dst_contains: None,
        src_contains: None,
    },
    BlacklistRule {
        tile_type: TypeMatch::Prefix("HCLK_IOI3"),
        dst_contains: Some("RCLK_BEFORE_DIV"),
        src_contains: Some("IMUX"),
    },
    BlacklistRule {
        tile_type: TypeMatch::Contains("IOI3"),
        dst_contains: Some("CLKB"),
        src_contains: Some("IMUX22"),
    },
];

/// Per tile type set of blacklisted pip indices.
#[derive(Debug, Default)]
pub struct PipBlacklist {
    per_type: Vec<BitVec>,
}

impl PipBlacklist {
    /// A blacklist that excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Evaluates the 7-series rules against every tile type of a database.
    pub fn for_xc7(db: &ChipDb, interner: &Interner) -> Self {
        let per_type = db
            .info()
            .tile_types
            .iter()
            .map(|tt| {
                let type_name = interner.resolve(tt.type_name);
                let mut bits = BitVec::new();
                let Some(rule) = XC7_RULES.iter().find(|r| r.tile_type.matches(type_name)) else {
                    return bits;
                };
                bits.resize(tt.pips.len(), false);
                for (i, pip) in tt.pips.iter().enumerate() {
                    let wire_has = |wire: u32, pattern: Option<&str>| match pattern {
                        Some(p) => interner.resolve(tt.wires[wire as usize].name).contains(p),
                        None => true,
                    };
                    if wire_has(pip.dst, rule.dst_contains) && wire_has(pip.src, rule.src_contains) {
                        bits.set(i, true);
                    }
                }
                bits
            })
            .collect();
        Self { per_type }
    }

    /// Whether pip `pip` of tile type `tile_type` is blacklisted.
    pub fn contains(&self, tile_type: u32, pip: u32) -> bool {
        self.per_type
            .get(tile_type as usize)
            .and_then(|bits| bits.get(pip as usize).map(|b| *b))
            .unwrap_or(false)
    }

    /// Total number of blacklisted pips across all tile types.
    pub fn len(&self) -> usize {
        self.per_type.iter().map(|bits| bits.count_ones()).sum()
    }

    /// Returns `true` if no pip is blacklisted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
