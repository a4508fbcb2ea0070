//! Container engine: one header, one metadata block, an ordered series list
//!
//! `Adf` owns its parts outright; disposal is scoped ownership (`Drop`), so
//! resources are released on every exit path including errors. All mutating
//! operations are all-or-nothing: a failed operation leaves the container
//! exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AdfError, Result};
use crate::header::{HEADER_SIZE, Header};
use crate::metadata::Metadata;
use crate::series::Series;
use crate::wire::{Reader, Writer};

/// An in-memory ADF container.
///
/// Created either fresh via [`Adf::new`] or from bytes via
/// [`Adf::unmarshal`]. The header is immutable after creation; metadata and
/// the series sequence mutate together through the methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adf {
    header: Header,
    metadata: Metadata,
    series: Vec<Series>,
}

impl Adf {
    /// Create an empty container for the given growing conditions.
    ///
    /// `period_sec` is the duration of one chunk interval and must be
    /// positive; the period constants in [`crate::period`] cover the
    /// common calendar intervals.
    pub fn new(header: Header, period_sec: u32) -> Result<Self> {
        header.validate()?;
        if period_sec == 0 {
            return Err(AdfError::runtime("period_sec must be positive"));
        }
        debug!(n_chunks = header.n_chunks, period_sec, "creating container");
        Ok(Self {
            header,
            metadata: Metadata::new(period_sec),
            series: Vec::new(),
        })
    }

    /// Restore a container from its canonical byte representation.
    ///
    /// Decodes the header, then metadata, then exactly
    /// `metadata.size_series` series. Fails as a whole on the first bad
    /// section; no partial container is ever returned. Trailing bytes after
    /// the last series are ignored.
    pub fn unmarshal(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let header = Header::decode(&mut r).inspect_err(|e| {
            warn!(error = %e, "header rejected");
        })?;
        let metadata = Metadata::decode(&mut r).inspect_err(|e| {
            warn!(error = %e, "metadata rejected");
        })?;
        // size_series comes off the wire; cap the capacity at the input
        // length so a corrupt count cannot drive an oversized allocation.
        let mut series = Vec::with_capacity((metadata.size_series as usize).min(r.remaining()));
        for index in 0..metadata.size_series {
            let record = Series::decode(&mut r, &header, index).inspect_err(|e| {
                warn!(error = %e, index, "series rejected");
            })?;
            series.push(record);
        }
        debug!(
            size_series = metadata.size_series,
            bytes = bytes.len(),
            "container unmarshalled"
        );
        Ok(Self {
            header,
            metadata,
            series,
        })
    }

    /// Exact marshalled size in bytes.
    pub fn size_bytes(&self) -> usize {
        HEADER_SIZE
            + self.metadata.encoded_size()
            + self.series.iter().map(Series::encoded_size).sum::<usize>()
    }

    /// Serialize to the canonical byte representation.
    ///
    /// The buffer is sized exactly up front; `unmarshal(marshal(x))`
    /// reproduces `x` field for field.
    pub fn marshal(&self) -> Result<Vec<u8>> {
        let size = self.size_bytes();
        let mut w = Writer::with_capacity(size);
        self.header.encode(&mut w);
        self.metadata.encode(&mut w);
        for series in &self.series {
            series.encode(&mut w);
        }
        debug_assert_eq!(w.len(), size);
        debug!(bytes = size, "container marshalled");
        Ok(w.into_bytes())
    }

    /// Append a series.
    ///
    /// Rejects, without touching the container, a series with
    /// `repeated == 0`, matrices that do not match the header's shapes, or
    /// oversized additive lists. On success the series' additive codes are
    /// merged into the metadata table and `n_series` advances by the
    /// series' repetition count.
    pub fn add_series(&mut self, series: Series) -> Result<()> {
        if series.repeated == 0 {
            return Err(AdfError::ZeroRepeatedSeries);
        }
        let index = self.metadata.size_series;
        series.validate_fields(index)?;
        series.validate_shapes(&self.header, index)?;
        self.metadata.merge_additive_codes(series.additive_codes())?;
        self.metadata.size_series += 1;
        self.metadata.n_series += series.repeated as u64;
        self.series.push(series);
        debug!(
            size_series = self.metadata.size_series,
            n_series = self.metadata.n_series,
            "series added"
        );
        Ok(())
    }

    /// Replace the series at the chunk position `time_sec` falls into
    /// (`time_sec / period_sec`).
    ///
    /// Fails with [`AdfError::TimeOutOfBound`] when the position is outside
    /// the stored range. The replacement is validated exactly like
    /// [`Adf::add_series`]; `n_series` is not changed.
    pub fn update_series(&mut self, series: Series, time_sec: u64) -> Result<()> {
        let index = time_sec / self.metadata.period_sec as u64;
        if index >= self.metadata.size_series as u64 {
            return Err(AdfError::time_out_of_bound(format!(
                "time {time_sec}s maps to series {index}, container holds {}",
                self.metadata.size_series
            )));
        }
        let index = index as u32;
        if series.repeated == 0 {
            return Err(AdfError::ZeroRepeatedSeries);
        }
        series.validate_fields(index)?;
        series.validate_shapes(&self.header, index)?;
        self.metadata.merge_additive_codes(series.additive_codes())?;
        self.series[index as usize] = series;
        debug!(index, "series updated");
        Ok(())
    }

    /// Remove and return the most recently added series.
    ///
    /// `n_series` keeps counting removed series (it is an identity
    /// counter), and the additive-code table keeps codes that only the
    /// removed series used.
    pub fn remove_series(&mut self) -> Result<Series> {
        let removed = self.series.pop().ok_or(AdfError::EmptySeries)?;
        self.metadata.size_series -= 1;
        debug!(size_series = self.metadata.size_series, "series removed");
        Ok(removed)
    }

    /// Remove every stored series, returning how many were dropped.
    pub fn remove_all_series(&mut self) -> Result<u32> {
        if self.series.is_empty() {
            return Err(AdfError::EmptySeries);
        }
        let removed = self.metadata.size_series;
        self.series.clear();
        self.metadata.size_series = 0;
        debug!(removed, "all series removed");
        Ok(removed)
    }

    /// Record the seeding instant as a Unix timestamp.
    pub fn set_seed_time(&mut self, timestamp: u64) -> Result<()> {
        if self.metadata.harvested != 0 && timestamp != 0 && timestamp > self.metadata.harvested {
            return Err(AdfError::time_out_of_bound(
                "seed time would follow the recorded harvest time",
            ));
        }
        self.metadata.seeded = timestamp;
        Ok(())
    }

    /// Record the harvest instant as a Unix timestamp.
    ///
    /// Once both are set, the harvest must not precede the seeding.
    pub fn set_harvest_time(&mut self, timestamp: u64) -> Result<()> {
        if self.metadata.seeded != 0 && timestamp != 0 && timestamp < self.metadata.seeded {
            return Err(AdfError::time_out_of_bound(
                "harvest time would precede the recorded seed time",
            ));
        }
        self.metadata.harvested = timestamp;
        Ok(())
    }

    /// The immutable growing-condition parameters.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The container bookkeeping block.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// All stored series, in insertion order.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Re-check every cross-structure invariant.
    ///
    /// The binary decoder enforces all of this inline; this exists for
    /// containers arriving through the interchange formats (JSON/CBOR),
    /// which carry no CRCs.
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        if self.metadata.period_sec == 0 {
            return Err(AdfError::metadata_corrupted("period_sec must be positive"));
        }
        if self.metadata.size_series as usize != self.series.len() {
            return Err(AdfError::metadata_corrupted(format!(
                "size_series is {} but {} series are present",
                self.metadata.size_series,
                self.series.len()
            )));
        }
        if self.metadata.harvested != 0
            && self.metadata.seeded != 0
            && self.metadata.harvested < self.metadata.seeded
        {
            return Err(AdfError::metadata_corrupted(
                "harvest timestamp precedes seed timestamp",
            ));
        }
        crate::additive::check_additive_count(self.metadata.additive_codes.len())?;
        for (index, series) in self.series.iter().enumerate() {
            let index = index as u32;
            series.validate_fields(index)?;
            series.validate_shapes(&self.header, index)?;
            for code in series.additive_codes() {
                if !self.metadata.additive_codes.contains(&code) {
                    return Err(AdfError::metadata_corrupted(format!(
                        "additive code {code} used by series {index} is missing from the table"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::additive::Additive;
    use crate::header::{
        FarmingTechnique, PrecisionInfo, ReductionInfo, SoilDepthInfo, WaveInfo,
    };
    use crate::matrix::Matrix;
    use crate::period;

    fn sample_header() -> Header {
        Header::new(
            FarmingTechnique::Hydroponics,
            WaveInfo::new(400, 700, 4),
            SoilDepthInfo::new(300, 3),
            ReductionInfo::default(),
            PrecisionInfo::default(),
            10,
        )
    }

    fn sample_series() -> Series {
        Series::new(
            Matrix::zeros(4, 10),
            Matrix::zeros(3, 10),
            Matrix::zeros(1, 10),
            Matrix::zeros(1, 10),
            65,
            1.0,
            1350.0,
            vec![Additive::new(12, 34.67)],
            vec![Additive::new(1, 4.99)],
            1,
        )
    }

    #[test]
    fn test_fresh_container_metadata() {
        let adf = Adf::new(sample_header(), period::DAY).unwrap();
        let meta = adf.metadata();
        assert_eq!(meta.size_series, 0);
        assert_eq!(meta.n_series, 0);
        assert_eq!(meta.period_sec, 86_400);
        assert_eq!(meta.seeded, 0);
        assert_eq!(meta.harvested, 0);
        assert!(meta.additive_codes.is_empty());
    }

    #[test]
    fn test_new_rejects_zero_period() {
        assert!(Adf::new(sample_header(), 0).is_err());
    }

    #[test]
    fn test_add_series_updates_counters_and_codes() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        adf.add_series(sample_series()).unwrap();
        assert_eq!(adf.metadata().size_series, 1);
        assert_eq!(adf.metadata().n_series, 1);
        assert_eq!(adf.metadata().additive_codes, vec![12, 1]);

        let mut repeated = sample_series();
        repeated.repeated = 3;
        adf.add_series(repeated).unwrap();
        assert_eq!(adf.metadata().size_series, 2);
        assert_eq!(adf.metadata().n_series, 4);
    }

    #[test]
    fn test_add_series_zero_repeated_leaves_state_untouched() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        let mut series = sample_series();
        series.repeated = 0;
        assert_eq!(
            adf.add_series(series).unwrap_err(),
            AdfError::ZeroRepeatedSeries
        );
        assert_eq!(adf.metadata().size_series, 0);
        assert!(adf.metadata().additive_codes.is_empty());
    }

    #[test]
    fn test_add_series_shape_mismatch_rejected() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        let mut series = sample_series();
        series.soil_temp_c = Matrix::zeros(2, 10);
        let err = adf.add_series(series).unwrap_err();
        assert!(matches!(err, AdfError::SeriesCorrupted { .. }));
        assert_eq!(adf.metadata().size_series, 0);
        assert!(adf.metadata().additive_codes.is_empty());
    }

    #[test]
    fn test_update_series_replaces_by_time_index() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        adf.add_series(sample_series()).unwrap();
        adf.add_series(sample_series()).unwrap();

        let mut replacement = sample_series();
        replacement.ph = 70;
        replacement.soil_additives = vec![Additive::new(99, 0.25)];
        // 1.5 days into the recording -> second series.
        adf.update_series(replacement.clone(), period::DAY as u64 * 3 / 2)
            .unwrap();
        assert_eq!(adf.series()[1], replacement);
        assert_eq!(adf.series()[0].ph, 65);
        assert_eq!(adf.metadata().additive_codes, vec![12, 1, 99]);
        // Replacement does not create a new series identity.
        assert_eq!(adf.metadata().n_series, 2);
    }

    #[test]
    fn test_update_series_out_of_bound() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        adf.add_series(sample_series()).unwrap();
        let before = adf.clone();
        let err = adf
            .update_series(sample_series(), period::DAY as u64 * 5)
            .unwrap_err();
        assert!(matches!(err, AdfError::TimeOutOfBound { .. }));
        assert_eq!(adf, before);
    }

    #[test]
    fn test_remove_series_is_lifo() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        let mut second = sample_series();
        second.ph = 70;
        adf.add_series(sample_series()).unwrap();
        adf.add_series(second.clone()).unwrap();

        let removed = adf.remove_series().unwrap();
        assert_eq!(removed, second);
        assert_eq!(adf.metadata().size_series, 1);
        // Identity counter and additive table are not rolled back.
        assert_eq!(adf.metadata().n_series, 2);
        assert_eq!(adf.metadata().additive_codes, vec![12, 1]);

        adf.remove_series().unwrap();
        assert_eq!(adf.remove_series().unwrap_err(), AdfError::EmptySeries);
    }

    #[test]
    fn test_remove_all_series() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        assert_eq!(adf.remove_all_series().unwrap_err(), AdfError::EmptySeries);
        adf.add_series(sample_series()).unwrap();
        adf.add_series(sample_series()).unwrap();
        assert_eq!(adf.remove_all_series().unwrap(), 2);
        assert_eq!(adf.metadata().size_series, 0);
        assert!(adf.series().is_empty());
    }

    #[test]
    fn test_seed_and_harvest_ordering() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        adf.set_seed_time(1_715_000_000).unwrap();
        assert!(adf.set_harvest_time(1_714_000_000).is_err());
        adf.set_harvest_time(1_725_000_000).unwrap();
        assert!(adf.set_seed_time(1_726_000_000).is_err());
        assert_eq!(adf.metadata().seeded, 1_715_000_000);
        assert_eq!(adf.metadata().harvested, 1_725_000_000);
    }

    #[test]
    fn test_accessors_do_not_mutate() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        adf.add_series(sample_series()).unwrap();
        let snapshot = adf.clone();
        for _ in 0..3 {
            let _ = adf.header();
            let _ = adf.metadata();
            let _ = adf.series();
        }
        assert_eq!(adf, snapshot);
    }

    #[test]
    fn test_unmarshal_rejects_oversized_wire_shapes() {
        // A CRC-valid header can still declare absurd shapes; the series
        // decoder must reject them instead of allocating what they imply.
        let mut header = sample_header();
        header.wave_info = WaveInfo::new(0, u16::MAX, u16::MAX);
        header.n_chunks = u32::MAX;
        let mut metadata = Metadata::new(period::DAY);
        metadata.size_series = 1;
        let mut w = Writer::default();
        header.encode(&mut w);
        metadata.encode(&mut w);
        let err = Adf::unmarshal(&w.into_bytes()).unwrap_err();
        assert!(matches!(err, AdfError::SeriesCorrupted { .. }));
    }

    #[test]
    fn test_unmarshal_rejects_oversized_series_count() {
        let mut metadata = Metadata::new(period::DAY);
        metadata.size_series = u32::MAX;
        let mut w = Writer::default();
        sample_header().encode(&mut w);
        metadata.encode(&mut w);
        let err = Adf::unmarshal(&w.into_bytes()).unwrap_err();
        assert!(matches!(err, AdfError::SeriesCorrupted { .. }));
    }

    #[test]
    fn test_validate_catches_inconsistent_counts() {
        let mut adf = Adf::new(sample_header(), period::DAY).unwrap();
        adf.add_series(sample_series()).unwrap();
        assert!(adf.validate().is_ok());
        adf.metadata.size_series = 5;
        assert!(adf.validate().is_err());
    }
}
