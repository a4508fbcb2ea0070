//! Chemical additive records and variable-length additive lists
//!
//! An additive is dosed either into the soil or the atmosphere and is
//! identified by a numeric code plus a concentration. Lists are stored as a
//! count (held by the enclosing structure) followed by `count * 8` bytes of
//! payload; the count is bounded by [`ADDITIVE_LIMIT`] so an overflow is
//! rejected before any allocation happens.

use serde::{Deserialize, Serialize};

use crate::error::{AdfError, Result};
use crate::wire::{Reader, Truncated, Writer};

/// Maximum number of additives in a single list, and in the container-wide
/// additive-code table.
pub const ADDITIVE_LIMIT: usize = 1024;

/// Encoded size of one additive: code (4) + concentration (4).
pub const ADDITIVE_SIZE: usize = 8;

/// One chemical additive dose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Additive {
    /// Numeric substance identifier
    pub code: u32,
    /// Concentration in the unit implied by the quantity's precision entry
    pub concentration: f32,
}

impl Additive {
    pub fn new(code: u32, concentration: f32) -> Self {
        Self {
            code,
            concentration,
        }
    }

    pub fn encode(&self, w: &mut Writer) {
        w.put_u32(self.code);
        w.put_f32(self.concentration);
    }

    pub fn decode(r: &mut Reader<'_>) -> std::result::Result<Self, Truncated> {
        Ok(Self {
            code: r.read_u32()?,
            concentration: r.read_f32()?,
        })
    }
}

/// Reject a list length that exceeds [`ADDITIVE_LIMIT`].
///
/// Called both on the mutation path (before a series enters a container)
/// and on the decode path (before the list buffer is allocated).
pub fn check_additive_count(count: usize) -> Result<()> {
    if count > ADDITIVE_LIMIT {
        return Err(AdfError::additive_overflow(count, ADDITIVE_LIMIT));
    }
    Ok(())
}

/// Append `count * 8` bytes of additive payload.
pub fn encode_list(w: &mut Writer, additives: &[Additive]) {
    for additive in additives {
        additive.encode(w);
    }
}

/// Decode exactly `count` additives. The caller has already validated
/// `count` against [`ADDITIVE_LIMIT`].
pub fn decode_list(r: &mut Reader<'_>, count: usize) -> std::result::Result<Vec<Additive>, Truncated> {
    let mut additives = Vec::with_capacity(count);
    for _ in 0..count {
        additives.push(Additive::decode(r)?);
    }
    Ok(additives)
}
