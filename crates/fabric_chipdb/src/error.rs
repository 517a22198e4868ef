//! Error types for device database loading.

use std::path::PathBuf;

/// Errors raised while opening, decoding or validating a device database.
///
/// Every variant is fatal: there is no partial or degraded load.
#[derive(Debug, thiserror::Error)]
pub enum ChipDbError {
    /// The database file could not be opened or read.
    #[error("unable to read chipdb {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file does not start with the database magic bytes.
    #[error("not a chip database (bad magic)")]
    BadMagic,

    /// The file is shorter than the fixed header.
    #[error("chip database truncated: {len} bytes")]
    Truncated {
        /// Length of the data that was read.
        len: usize,
    },

    /// The database was written in a different format version.
    #[error("chip database format version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The version this build understands.
        expected: u32,
        /// The version found in the file.
        actual: u32,
    },

    /// The stored checksum does not match the payload.
    #[error("chip database checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The checksum stored in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// The payload could not be encoded or decoded.
    #[error("chip database serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// The identifier table does not line up with the statically known identifiers.
    #[error("chip database identifier table mismatch: {reason}")]
    IdTable {
        /// Description of the misalignment.
        reason: String,
    },

    /// A table index points outside its target table.
    #[error("malformed chip database: {reason}")]
    Malformed {
        /// Description of the structural problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = ChipDbError::Io {
            path: PathBuf::from("/tmp/xc7a35t.bin"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(format!("{err}").starts_with("unable to read chipdb /tmp/xc7a35t.bin"));
    }

    #[test]
    fn display_version() {
        let err = ChipDbError::VersionMismatch {
            expected: 1,
            actual: 9,
        };
        assert_eq!(
            format!("{err}"),
            "chip database format version mismatch: expected 1, got 9"
        );
    }

    #[test]
    fn display_malformed() {
        let err = ChipDbError::Malformed {
            reason: "tile 3 references tile type 12".into(),
        };
        assert_eq!(
            format!("{err}"),
            "malformed chip database: tile 3 references tile type 12"
        );
    }
}
