//! Container metadata: record counts, interval period, lifecycle timestamps
//!
//! Unlike the header, metadata changes as series are added and removed. The
//! additive-code table tracks every distinct additive code ever used across
//! all series, deduplicated in first-use order.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::additive::check_additive_count;
use crate::error::{AdfError, Result};
use crate::wire::{Reader, Writer};

/// Encoded metadata size with an empty additive-code table, CRC included.
pub const METADATA_BASE_SIZE: usize = 36;

/// Mutable bookkeeping for a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Number of series currently stored
    pub size_series: u32,
    /// Repeat-weighted total of series ever recorded; never decremented,
    /// so it doubles as an identity/version counter
    pub n_series: u64,
    /// Seconds covered by one chunk interval
    pub period_sec: u32,
    /// Unix timestamp of seeding; 0 when unset
    pub seeded: u64,
    /// Unix timestamp of harvest; 0 while the crop is still growing
    pub harvested: u64,
    /// Distinct additive codes used across all series, in first-use order
    pub additive_codes: Vec<u32>,
}

impl Metadata {
    /// Metadata for a freshly created container.
    pub fn new(period_sec: u32) -> Self {
        Self {
            size_series: 0,
            n_series: 0,
            period_sec,
            seeded: 0,
            harvested: 0,
            additive_codes: Vec::new(),
        }
    }

    /// Seeding instant, if one has been recorded.
    pub fn seeded_at(&self) -> Option<OffsetDateTime> {
        if self.seeded == 0 {
            return None;
        }
        OffsetDateTime::from_unix_timestamp(self.seeded as i64).ok()
    }

    /// Harvest instant, if the crop has been harvested.
    pub fn harvested_at(&self) -> Option<OffsetDateTime> {
        if self.harvested == 0 {
            return None;
        }
        OffsetDateTime::from_unix_timestamp(self.harvested as i64).ok()
    }

    /// Fold new additive codes into the table, deduplicated, preserving
    /// first-use order. Fails without mutating if the table would exceed
    /// the additive limit.
    pub fn merge_additive_codes<I>(&mut self, codes: I) -> Result<()>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut fresh: Vec<u32> = Vec::new();
        for code in codes {
            if !self.additive_codes.contains(&code) && !fresh.contains(&code) {
                fresh.push(code);
            }
        }
        check_additive_count(self.additive_codes.len() + fresh.len())?;
        self.additive_codes.extend(fresh);
        Ok(())
    }

    /// Encoded size in bytes, CRC included.
    pub fn encoded_size(&self) -> usize {
        METADATA_BASE_SIZE + self.additive_codes.len() * 4
    }

    /// Append the metadata section, CRC included.
    pub fn encode(&self, w: &mut Writer) {
        let start = w.len();
        w.put_u32(self.size_series);
        w.put_u64(self.n_series);
        w.put_u32(self.period_sec);
        w.put_u64(self.seeded);
        w.put_u64(self.harvested);
        w.put_u16(self.additive_codes.len() as u16);
        for &code in &self.additive_codes {
            w.put_u32(code);
        }
        let crc = w.crc_since(start);
        w.put_u16(crc);
    }

    /// Decode and validate a metadata section.
    ///
    /// The additive count is bounds-checked before the table is allocated;
    /// everything else is covered by the section CRC.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let truncated = |_| AdfError::metadata_corrupted("truncated metadata section");
        let start = r.position();

        let size_series = r.read_u32().map_err(truncated)?;
        let n_series = r.read_u64().map_err(truncated)?;
        let period_sec = r.read_u32().map_err(truncated)?;
        let seeded = r.read_u64().map_err(truncated)?;
        let harvested = r.read_u64().map_err(truncated)?;
        let n_additives = r.read_u16().map_err(truncated)? as usize;
        check_additive_count(n_additives)?;
        let mut additive_codes = Vec::with_capacity(n_additives);
        for _ in 0..n_additives {
            additive_codes.push(r.read_u32().map_err(truncated)?);
        }

        let computed_crc = r.crc_since(start);
        let stored_crc = r.read_u16().map_err(truncated)?;
        if computed_crc != stored_crc {
            return Err(AdfError::metadata_corrupted(format!(
                "crc mismatch: computed {computed_crc:#06x}, stored {stored_crc:#06x}"
            )));
        }

        if period_sec == 0 {
            return Err(AdfError::metadata_corrupted("period_sec must be positive"));
        }
        if harvested != 0 && seeded != 0 && harvested < seeded {
            return Err(AdfError::metadata_corrupted(
                "harvest timestamp precedes seed timestamp",
            ));
        }

        Ok(Self {
            size_series,
            n_series,
            period_sec,
            seeded,
            harvested,
            additive_codes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::additive::ADDITIVE_LIMIT;

    fn sample_metadata() -> Metadata {
        Metadata {
            size_series: 2,
            n_series: 5,
            period_sec: 86_400,
            seeded: 1_715_000_000,
            harvested: 1_725_000_000,
            additive_codes: vec![12, 1, 2000],
        }
    }

    #[test]
    fn test_fresh_metadata() {
        let meta = Metadata::new(3600);
        assert_eq!(meta.size_series, 0);
        assert_eq!(meta.n_series, 0);
        assert_eq!(meta.period_sec, 3600);
        assert_eq!(meta.seeded, 0);
        assert_eq!(meta.harvested, 0);
        assert!(meta.additive_codes.is_empty());
        assert!(meta.seeded_at().is_none());
        assert!(meta.harvested_at().is_none());
    }

    #[test]
    fn test_roundtrip() {
        let meta = sample_metadata();
        let mut w = Writer::default();
        meta.encode(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), meta.encoded_size());
        let decoded = Metadata::decode(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn test_single_byte_corruption_never_misparses() {
        let mut w = Writer::default();
        sample_metadata().encode(&mut w);
        let bytes = w.into_bytes();
        for i in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[i] ^= 0xFF;
            let err = Metadata::decode(&mut Reader::new(&corrupted)).unwrap_err();
            // Corrupting the additive count can surface as an overflow
            // before the CRC is reachable; anything else must be caught by
            // the CRC.
            assert!(
                matches!(
                    err,
                    AdfError::MetadataCorrupted { .. } | AdfError::AdditiveOverflow { .. }
                ),
                "byte {i}: unexpected error {err:?}"
            );
        }
    }

    #[test]
    fn test_merge_additive_codes_dedups_in_order() {
        let mut meta = Metadata::new(3600);
        meta.merge_additive_codes([12, 1, 12]).unwrap();
        meta.merge_additive_codes([1, 7]).unwrap();
        assert_eq!(meta.additive_codes, vec![12, 1, 7]);
    }

    #[test]
    fn test_merge_rejects_table_overflow_without_mutating() {
        let mut meta = Metadata::new(3600);
        meta.additive_codes = (0..ADDITIVE_LIMIT as u32).collect();
        let before = meta.additive_codes.clone();
        assert!(meta.merge_additive_codes([u32::MAX]).is_err());
        assert_eq!(meta.additive_codes, before);
        // Re-merging already known codes is still fine.
        meta.merge_additive_codes([0, 1]).unwrap();
    }

    #[test]
    fn test_timestamp_accessors() {
        let meta = sample_metadata();
        assert_eq!(meta.seeded_at().unwrap().unix_timestamp(), 1_715_000_000);
        assert_eq!(meta.harvested_at().unwrap().unix_timestamp(), 1_725_000_000);
    }

    #[test]
    fn test_inverted_lifecycle_timestamps_rejected() {
        let mut meta = sample_metadata();
        meta.seeded = meta.harvested + 1;
        let mut w = Writer::default();
        meta.encode(&mut w);
        let bytes = w.into_bytes();
        assert!(Metadata::decode(&mut Reader::new(&bytes)).is_err());
    }
}
