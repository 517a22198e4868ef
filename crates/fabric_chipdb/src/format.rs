//! The on-disk database format.
//!
//! ```text
//! offset  size  field
//! 0       4     magic b"FCDB"
//! 4       4     format version, little-endian u32
//! 8       16    XXH3-128 checksum of the payload
//! 24      ..    bincode-encoded ChipInfo
//! ```

use crate::error::ChipDbError;
use crate::records::ChipInfo;
use fabric_common::ContentHash;

/// Magic bytes identifying a device database.
const CHIPDB_MAGIC: [u8; 4] = *b"FCDB";

/// Current database format version. Increment on breaking changes to the
/// header or any record.
pub const CHIPDB_FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 16;

/// Encodes a database into its on-disk form.
pub fn encode_chipdb(info: &ChipInfo) -> Result<Vec<u8>, ChipDbError> {
    let payload = bincode::serde::encode_to_vec(info, bincode::config::standard()).map_err(|e| {
        ChipDbError::Serialization {
            reason: e.to_string(),
        }
    })?;
    let checksum = ContentHash::from_bytes(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&CHIPDB_MAGIC);
    out.extend_from_slice(&CHIPDB_FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(checksum.as_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decodes an uncompressed database, checking magic, version and checksum.
///
/// Returns the record and the payload checksum.
pub fn decode_chipdb(data: &[u8]) -> Result<(ChipInfo, ContentHash), ChipDbError> {
    if data.len() < 4 || data[..4] != CHIPDB_MAGIC {
        return Err(ChipDbError::BadMagic);
    }
    if data.len() < HEADER_LEN {
        return Err(ChipDbError::Truncated { len: data.len() });
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&data[4..8]);
    let version = u32::from_le_bytes(version);
    if version != CHIPDB_FORMAT_VERSION {
        return Err(ChipDbError::VersionMismatch {
            expected: CHIPDB_FORMAT_VERSION,
            actual: version,
        });
    }

    let mut stored = [0u8; 16];
    stored.copy_from_slice(&data[8..HEADER_LEN]);
    let stored = ContentHash::from_raw(stored);
    let payload = &data[HEADER_LEN..];
    let actual = ContentHash::from_bytes(payload);
    if actual != stored {
        return Err(ChipDbError::ChecksumMismatch {
            expected: stored.to_string(),
            actual: actual.to_string(),
        });
    }

    let (info, _) = bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .map_err(|e| ChipDbError::Serialization {
            reason: e.to_string(),
        })?;
    Ok((info, actual))
}
