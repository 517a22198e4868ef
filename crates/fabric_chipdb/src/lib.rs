//! The binary device database: tiles, sites, bels, wires, pips, cross-tile
//! nodes and the cell timing table of one FPGA part.
//!
//! A database file is a fixed header (magic, format version, payload
//! checksum) followed by a `bincode`-encoded [`ChipInfo`] whose
//! cross-references are plain integer indices into flat tables. Files are
//! memory-mapped and decoded once; gzip-compressed files are inflated first.
//! [`ChipDbBuilder`] constructs databases programmatically for tooling and tests.

#![warn(missing_docs)]

pub mod builder;
pub mod db;
pub mod error;
pub mod family;
pub mod format;
pub mod known;
pub mod loader;
pub mod records;

pub use builder::ChipDbBuilder;
pub use db::ChipDb;
pub use error::ChipDbError;
pub use family::ChipFamily;
pub use format::{decode_chipdb, encode_chipdb, CHIPDB_FORMAT_VERSION};
pub use known::{KnownId, KNOWN_ID_COUNT, KNOWN_ID_NAMES};
pub use loader::{load_chipdb, write_chipdb};
pub use records::*;
