//! Test utilities for generating mock containers
//!
//! This module provides helper functions for building headers, series, and
//! whole containers with plausible measurement data, for use across
//! different test modules. Enabled with the `test-utils` feature.

use rand::rngs::StdRng;
use rand::{Rng, RngExt, SeedableRng};

use crate::additive::Additive;
use crate::container::Adf;
use crate::header::{
    FarmingTechnique, Header, PrecisionInfo, ReductionCode, ReductionInfo, SoilDepthInfo, WaveInfo,
};
use crate::matrix::Matrix;
use crate::period;
use crate::series::Series;

/// A fixed four-band, three-depth, ten-chunk hydroponics header.
pub fn mock_header() -> Header {
    Header::new(
        FarmingTechnique::Hydroponics,
        WaveInfo::new(400, 700, 4),
        SoilDepthInfo::new(300, 3),
        ReductionInfo::uniform(ReductionCode::Average),
        PrecisionInfo::default(),
        10,
    )
}

/// A row-major matrix whose rows ramp in 0.25 steps.
pub fn ramp_matrix(rows: u32, columns: u32) -> Matrix {
    let mut m = Matrix::zeros(rows, columns);
    for row in 0..rows {
        let mut value = row as f32;
        for column in 0..columns {
            m.set(row, column, value);
            value += 0.25;
        }
    }
    m
}

/// A series with ramped matrices and randomized scalars/additives, shaped
/// to fit `header`.
pub fn mock_series(header: &Header, rng: &mut impl Rng) -> Series {
    let n_additives = rng.random_range(0..4);
    let soil_additives = (0..n_additives)
        .map(|_| Additive::new(rng.random_range(1..50), rng.random::<f32>() * 20.0))
        .collect();
    let atm_additives = (0..rng.random_range(0..3))
        .map(|_| Additive::new(rng.random_range(50..100), rng.random::<f32>()))
        .collect();
    Series::new(
        ramp_matrix(header.n_wavelengths(), header.n_chunks),
        ramp_matrix(header.n_depth(), header.n_chunks),
        ramp_matrix(1, header.n_chunks),
        ramp_matrix(1, header.n_chunks),
        rng.random_range(40..=90),
        1.0 + rng.random::<f32>() * 0.05,
        1200.0 + rng.random::<f32>() * 400.0,
        soil_additives,
        atm_additives,
        rng.random_range(1..=3),
    )
}

/// A populated daily container with `n_series` mock series, reproducible
/// from `seed`.
pub fn mock_adf(n_series: usize, seed: u64) -> Adf {
    let header = mock_header();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut adf = Adf::new(header, period::DAY).expect("mock header is valid");
    for _ in 0..n_series {
        adf.add_series(mock_series(&header, &mut rng))
            .expect("mock series fits the mock header");
    }
    adf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_adf_is_reproducible() {
        assert_eq!(mock_adf(3, 42), mock_adf(3, 42));
        assert_ne!(mock_adf(3, 42), mock_adf(3, 43));
    }

    #[test]
    fn test_mock_series_fits_header() {
        let header = mock_header();
        let mut rng = StdRng::seed_from_u64(7);
        let series = mock_series(&header, &mut rng);
        assert!(series.validate_shapes(&header, 0).is_ok());
        assert!(series.validate_fields(0).is_ok());
    }

    #[test]
    fn test_ramp_matrix_values() {
        let m = ramp_matrix(2, 3);
        assert_eq!(m.at(0, 0), Some(0.0));
        assert_eq!(m.at(0, 2), Some(0.5));
        assert_eq!(m.at(1, 0), Some(1.0));
    }
}
