//! Per-repetition measurement records
//!
//! A series spans every chunk of one repetition cycle: four matrices shaped
//! by the container header, scalar soil/atmosphere readings, the additive
//! doses applied, and a repetition count. Series are the only
//! variable-length part of a container, so their encoded size depends on
//! their additive lists.

use serde::{Deserialize, Serialize};

use crate::additive::{self, Additive, check_additive_count};
use crate::error::{AdfError, Result};
use crate::header::Header;
use crate::matrix::Matrix;
use crate::wire::{Reader, Writer};

/// Highest plausible stored pH. pH is stored as `u8` at ten times its
/// value, so 140 encodes pH 14.0.
pub const MAX_PH_RAW: u8 = 140;

/// Fixed per-series overhead: pH (1) + pressure (4) + soil density (4) +
/// two additive counts (2 + 2) + repeated (4) + CRC (2).
const SERIES_FIXED_SIZE: usize = 19;

/// One measurement record for one repetition cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Light exposure in W/m², one row per sampled wavelength band
    pub light_exposure: Matrix,
    /// Soil temperature in °C, one row per sampled depth
    pub soil_temp_c: Matrix,
    /// Environment temperature in °C, single row
    pub env_temp_c: Matrix,
    /// Water use in millilitres, single row
    pub water_use_ml: Matrix,
    /// Soil pH, stored at ten times its value
    pub ph: u8,
    /// Atmospheric pressure in bar
    pub p_bar: f32,
    pub soil_density_kg_m3: f32,
    pub soil_additives: Vec<Additive>,
    pub atm_additives: Vec<Additive>,
    /// How many physical measurement cycles this record represents; never 0
    pub repeated: u32,
}

impl Series {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
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
    ) -> Self {
        Self {
            light_exposure,
            soil_temp_c,
            env_temp_c,
            water_use_ml,
            ph,
            p_bar,
            soil_density_kg_m3,
            soil_additives,
            atm_additives,
            repeated,
        }
    }

    /// Soil pH as a real number.
    pub fn ph_value(&self) -> f32 {
        self.ph as f32 / 10.0
    }

    /// Distinct additive codes used by this series, soil first.
    pub fn additive_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.soil_additives
            .iter()
            .chain(self.atm_additives.iter())
            .map(|a| a.code)
    }

    /// Check that all four matrices match the shapes the header implies.
    pub fn validate_shapes(&self, header: &Header, index: u32) -> Result<()> {
        let expected = [
            ("light_exposure", &self.light_exposure, header.n_wavelengths()),
            ("soil_temp_c", &self.soil_temp_c, header.n_depth()),
            ("env_temp_c", &self.env_temp_c, 1),
            ("water_use_ml", &self.water_use_ml, 1),
        ];
        for (name, matrix, rows) in expected {
            if matrix.shape() != (rows, header.n_chunks) {
                return Err(AdfError::series_corrupted(
                    index,
                    format!(
                        "{name} matrix is {:?}, header implies ({rows}, {})",
                        matrix.shape(),
                        header.n_chunks
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Check scalar invariants: plausible pH, non-zero repetition count,
    /// additive lists within the limit.
    pub fn validate_fields(&self, index: u32) -> Result<()> {
        if self.ph > MAX_PH_RAW {
            return Err(AdfError::series_corrupted(
                index,
                format!("implausible pH {} (max {MAX_PH_RAW})", self.ph),
            ));
        }
        if self.repeated == 0 {
            return Err(AdfError::ZeroRepeatedSeries);
        }
        check_additive_count(self.soil_additives.len())?;
        check_additive_count(self.atm_additives.len())?;
        Ok(())
    }

    /// Encoded size in bytes, CRC included. Varies with the additive-list
    /// lengths; the matrix sizes are fixed by the header.
    pub fn encoded_size(&self) -> usize {
        self.light_exposure.encoded_size()
            + self.soil_temp_c.encoded_size()
            + self.env_temp_c.encoded_size()
            + self.water_use_ml.encoded_size()
            + (self.soil_additives.len() + self.atm_additives.len()) * additive::ADDITIVE_SIZE
            + SERIES_FIXED_SIZE
    }

    /// Append one series section, CRC included.
    pub fn encode(&self, w: &mut Writer) {
        let start = w.len();
        self.light_exposure.encode(w);
        self.soil_temp_c.encode(w);
        self.env_temp_c.encode(w);
        self.water_use_ml.encode(w);
        w.put_u8(self.ph);
        w.put_f32(self.p_bar);
        w.put_f32(self.soil_density_kg_m3);
        w.put_u16(self.soil_additives.len() as u16);
        w.put_u16(self.atm_additives.len() as u16);
        additive::encode_list(w, &self.soil_additives);
        additive::encode_list(w, &self.atm_additives);
        w.put_u32(self.repeated);
        let crc = w.crc_since(start);
        w.put_u16(crc);
    }

    /// Decode the series at position `index`, shaping its matrices from
    /// `header`.
    pub fn decode(r: &mut Reader<'_>, header: &Header, index: u32) -> Result<Self> {
        let truncated = move |_| AdfError::series_corrupted(index, "truncated series section");
        let start = r.position();

        let light_exposure =
            Matrix::decode(r, header.n_wavelengths(), header.n_chunks).map_err(truncated)?;
        let soil_temp_c =
            Matrix::decode(r, header.n_depth(), header.n_chunks).map_err(truncated)?;
        let env_temp_c = Matrix::decode(r, 1, header.n_chunks).map_err(truncated)?;
        let water_use_ml = Matrix::decode(r, 1, header.n_chunks).map_err(truncated)?;
        let ph = r.read_u8().map_err(truncated)?;
        let p_bar = r.read_f32().map_err(truncated)?;
        let soil_density_kg_m3 = r.read_f32().map_err(truncated)?;
        let n_soil = r.read_u16().map_err(truncated)? as usize;
        let n_atm = r.read_u16().map_err(truncated)? as usize;
        check_additive_count(n_soil)?;
        check_additive_count(n_atm)?;
        let soil_additives = additive::decode_list(r, n_soil).map_err(truncated)?;
        let atm_additives = additive::decode_list(r, n_atm).map_err(truncated)?;
        let repeated = r.read_u32().map_err(truncated)?;

        let computed_crc = r.crc_since(start);
        let stored_crc = r.read_u16().map_err(truncated)?;
        if computed_crc != stored_crc {
            return Err(AdfError::series_corrupted(
                index,
                format!("crc mismatch: computed {computed_crc:#06x}, stored {stored_crc:#06x}"),
            ));
        }

        let series = Self {
            light_exposure,
            soil_temp_c,
            env_temp_c,
            water_use_ml,
            ph,
            p_bar,
            soil_density_kg_m3,
            soil_additives,
            atm_additives,
            repeated,
        };
        series.validate_fields(index)?;
        Ok(series)
    }
}
