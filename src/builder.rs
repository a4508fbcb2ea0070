//! Ergonomic builders for headers and series
//!
//! Series matrices must agree exactly with the header's shapes, which makes
//! literal construction noisy. `SeriesBuilder` starts from zero-filled
//! matrices of the right shape and validates the result, so a series that
//! builds successfully is always accepted by the container.

use crate::additive::Additive;
use crate::error::Result;
use crate::header::{
    FarmingTechnique, Header, PrecisionInfo, ReductionInfo, SoilDepthInfo, WaveInfo,
};
use crate::matrix::Matrix;
use crate::series::Series;

/// Builder for [`Header`].
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    farming_tec: FarmingTechnique,
    wave_info: WaveInfo,
    soil_info: SoilDepthInfo,
    reduction_info: ReductionInfo,
    precision_info: PrecisionInfo,
    n_chunks: u32,
}

impl HeaderBuilder {
    /// Start from a sensible single-band, single-depth daily layout.
    pub fn new() -> Self {
        Self {
            farming_tec: FarmingTechnique::Regular,
            wave_info: WaveInfo::new(380, 780, 1),
            soil_info: SoilDepthInfo::new(300, 1),
            reduction_info: ReductionInfo::default(),
            precision_info: PrecisionInfo::default(),
            n_chunks: 1,
        }
    }

    pub fn farming_technique(mut self, tec: FarmingTechnique) -> Self {
        self.farming_tec = tec;
        self
    }

    pub fn wave_info(mut self, info: WaveInfo) -> Self {
        self.wave_info = info;
        self
    }

    pub fn soil_info(mut self, info: SoilDepthInfo) -> Self {
        self.soil_info = info;
        self
    }

    pub fn reduction_info(mut self, info: ReductionInfo) -> Self {
        self.reduction_info = info;
        self
    }

    pub fn precision_info(mut self, info: PrecisionInfo) -> Self {
        self.precision_info = info;
        self
    }

    pub fn n_chunks(mut self, n: u32) -> Self {
        self.n_chunks = n;
        self
    }

    /// Validate and build the header.
    pub fn build(self) -> Result<Header> {
        let header = Header::new(
            self.farming_tec,
            self.wave_info,
            self.soil_info,
            self.reduction_info,
            self.precision_info,
            self.n_chunks,
        );
        header.validate()?;
        Ok(header)
    }
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Series`], shaped by a [`Header`].
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    header: Header,
    light_exposure: Matrix,
    soil_temp_c: Matrix,
    env_temp_c: Matrix,
    water_use_ml: Matrix,
    ph: u8,
    p_bar: f32,
    soil_density_kg_m3: f32,
    soil_additives: Vec<Additive>,
    atm_additives: Vec<Additive>,
    repeated: u32,
}

impl SeriesBuilder {
    /// Start from zero-filled matrices matching `header`'s shapes, neutral
    /// pH, and a repetition count of 1.
    pub fn for_header(header: &Header) -> Self {
        Self {
            header: *header,
            light_exposure: Matrix::zeros(header.n_wavelengths(), header.n_chunks),
            soil_temp_c: Matrix::zeros(header.n_depth(), header.n_chunks),
            env_temp_c: Matrix::zeros(1, header.n_chunks),
            water_use_ml: Matrix::zeros(1, header.n_chunks),
            ph: 70,
            p_bar: 1.013,
            soil_density_kg_m3: 0.0,
            soil_additives: Vec::new(),
            atm_additives: Vec::new(),
            repeated: 1,
        }
    }

    pub fn light_exposure(mut self, matrix: Matrix) -> Self {
        self.light_exposure = matrix;
        self
    }

    pub fn soil_temp_c(mut self, matrix: Matrix) -> Self {
        self.soil_temp_c = matrix;
        self
    }

    /// Per-chunk environment temperature, single row.
    pub fn env_temp_c(mut self, row: Vec<f32>) -> Self {
        self.env_temp_c = Matrix::from_row(row);
        self
    }

    /// Per-chunk water use in millilitres, single row.
    pub fn water_use_ml(mut self, row: Vec<f32>) -> Self {
        self.water_use_ml = Matrix::from_row(row);
        self
    }

    /// Soil pH as a real number; stored at ten times its value.
    pub fn ph(mut self, ph: f32) -> Self {
        self.ph = (ph * 10.0).round() as u8;
        self
    }

    pub fn pressure_bar(mut self, p_bar: f32) -> Self {
        self.p_bar = p_bar;
        self
    }

    pub fn soil_density_kg_m3(mut self, density: f32) -> Self {
        self.soil_density_kg_m3 = density;
        self
    }

    pub fn add_soil_additive(mut self, additive: Additive) -> Self {
        self.soil_additives.push(additive);
        self
    }

    pub fn add_atm_additive(mut self, additive: Additive) -> Self {
        self.atm_additives.push(additive);
        self
    }

    pub fn repeated(mut self, repeated: u32) -> Self {
        self.repeated = repeated;
        self
    }

    /// Validate shapes and fields and build the series.
    pub fn build(self) -> Result<Series> {
        let series = Series::new(
            self.light_exposure,
            self.soil_temp_c,
            self.env_temp_c,
            self.water_use_ml,
            self.ph,
            self.p_bar,
            self.soil_density_kg_m3,
            self.soil_additives,
            self.atm_additives,
            self.repeated,
        );
        series.validate_fields(0)?;
        series.validate_shapes(&self.header, 0)?;
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdfError;

    fn sample_header() -> Header {
        HeaderBuilder::new()
            .farming_technique(FarmingTechnique::Fogponics)
            .wave_info(WaveInfo::new(400, 700, 2))
            .soil_info(SoilDepthInfo::new(200, 2))
            .n_chunks(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_header_builder_validates() {
        assert!(HeaderBuilder::new().n_chunks(0).build().is_err());
        let header = sample_header();
        assert_eq!(header.n_chunks, 4);
        assert_eq!(header.farming_tec, FarmingTechnique::Fogponics);
    }

    #[test]
    fn test_series_builder_defaults_fit_header() {
        let header = sample_header();
        let series = SeriesBuilder::for_header(&header).build().unwrap();
        assert!(series.validate_shapes(&header, 0).is_ok());
        assert_eq!(series.repeated, 1);
        assert_eq!(series.ph_value(), 7.0);
    }

    #[test]
    fn test_series_builder_full() {
        let header = sample_header();
        let series = SeriesBuilder::for_header(&header)
            .env_temp_c(vec![20.0, 21.0, 22.0, 21.5])
            .water_use_ml(vec![500.0, 500.0, 480.0, 510.0])
            .ph(6.5)
            .pressure_bar(1.02)
            .soil_density_kg_m3(1400.0)
            .add_soil_additive(Additive::new(12, 34.67))
            .add_atm_additive(Additive::new(1, 4.99))
            .repeated(2)
            .build()
            .unwrap();
        assert_eq!(series.ph, 65);
        assert_eq!(series.soil_additives.len(), 1);
        assert_eq!(series.repeated, 2);
    }

    #[test]
    fn test_series_builder_rejects_bad_shape() {
        let header = sample_header();
        let err = SeriesBuilder::for_header(&header)
            .env_temp_c(vec![20.0, 21.0]) // header wants 4 chunks
            .build()
            .unwrap_err();
        assert!(matches!(err, AdfError::SeriesCorrupted { .. }));
    }

    #[test]
    fn test_series_builder_rejects_zero_repeated() {
        let header = sample_header();
        let err = SeriesBuilder::for_header(&header)
            .repeated(0)
            .build()
            .unwrap_err();
        assert_eq!(err, AdfError::ZeroRepeatedSeries);
    }
}
