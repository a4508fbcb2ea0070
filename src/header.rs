//! Container header: fixed growing-condition parameters
//!
//! The header is written once when a container is created and never mutates
//! afterwards. Every series in the container derives its matrix shapes from
//! the header, so header corruption makes the rest of the buffer
//! undecodable; the header therefore carries its own CRC and is validated
//! before anything else is read.

use serde::{Deserialize, Serialize};

use crate::error::{AdfError, Result};
use crate::wire::{Reader, Writer};
use crate::{FORMAT_VERSION, version_major};

/// Magic bytes opening every ADF buffer.
pub const SIGNATURE: u32 = 0x4041_4446;

/// Encoded header size in bytes, CRC included.
pub const HEADER_SIZE: usize = 60;

/// Cultivation technique under which the recorded crop was grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FarmingTechnique {
    Regular = 0,
    Indoor = 1,
    IndoorProtected = 2,
    Outdoor = 3,
    ArtificialSoil = 4,
    Hydroponics = 5,
    Anthroponics = 6,
    Aeroponics = 7,
    Fogponics = 8,
}

impl TryFrom<u8> for FarmingTechnique {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::Regular),
            1 => Ok(Self::Indoor),
            2 => Ok(Self::IndoorProtected),
            3 => Ok(Self::Outdoor),
            4 => Ok(Self::ArtificialSoil),
            5 => Ok(Self::Hydroponics),
            6 => Ok(Self::Anthroponics),
            7 => Ok(Self::Aeroponics),
            8 => Ok(Self::Fogponics),
            other => Err(other),
        }
    }
}

/// Statistical reduction applied when repeated sub-samples are folded into
/// one stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReductionCode {
    /// Sub-samples are stored as-is
    #[default]
    None = 0,
    /// Arithmetic mean
    Average = 1,
    /// Moving average
    MovingAverage = 2,
}

impl TryFrom<u8> for ReductionCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Average),
            2 => Ok(Self::MovingAverage),
            other => Err(other),
        }
    }
}

/// Light-spectrum sampling resolution.
///
/// `n_wavelengths` is the row count of every light-exposure matrix in the
/// container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveInfo {
    pub min_wavelen_nm: u16,
    pub max_wavelen_nm: u16,
    pub n_wavelengths: u16,
}

impl WaveInfo {
    pub fn new(min_wavelen_nm: u16, max_wavelen_nm: u16, n_wavelengths: u16) -> Self {
        Self {
            min_wavelen_nm,
            max_wavelen_nm,
            n_wavelengths,
        }
    }
}

/// Soil-depth sampling resolution.
///
/// `n_depth` is the row count of every soil-temperature matrix in the
/// container. `trans_y == 0` marks untransformed depth sampling; the
/// translated variant shares the same byte layout and only differs in how
/// it is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilDepthInfo {
    pub trans_y: u16,
    pub max_soil_depth_mm: u16,
    pub n_depth: u16,
}

impl SoilDepthInfo {
    /// Untransformed depth sampling (`trans_y = 0`).
    pub fn new(max_soil_depth_mm: u16, n_depth: u16) -> Self {
        Self {
            trans_y: 0,
            max_soil_depth_mm,
            n_depth,
        }
    }

    /// Depth sampling translated by `trans_y` millimetres.
    pub fn with_translation(trans_y: u16, max_soil_depth_mm: u16, n_depth: u16) -> Self {
        Self {
            trans_y,
            max_soil_depth_mm,
            n_depth,
        }
    }
}

/// Per-quantity reduction modes, one for each measured quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionInfo {
    pub soil_density: ReductionCode,
    pub pressure: ReductionCode,
    pub light_exposure: ReductionCode,
    pub water_use: ReductionCode,
    pub soil_temp: ReductionCode,
    pub env_temp: ReductionCode,
    pub additive_conc: ReductionCode,
}

impl ReductionInfo {
    /// Every quantity reduced the same way.
    pub fn uniform(code: ReductionCode) -> Self {
        Self {
            soil_density: code,
            pressure: code,
            light_exposure: code,
            water_use: code,
            soil_temp: code,
            env_temp: code,
            additive_conc: code,
        }
    }
}

/// Per-quantity rounding tolerance applied before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecisionInfo {
    pub soil_density: f32,
    pub pressure: f32,
    pub light_exposure: f32,
    pub water_use: f32,
    pub soil_temp: f32,
    pub env_temp: f32,
    pub additive_conc: f32,
}

/// Fixed growing-condition parameters, set once at container creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Packed format version of the buffer this header came from (or, for a
    /// freshly built header, [`FORMAT_VERSION`])
    pub version: u16,
    pub farming_tec: FarmingTechnique,
    pub wave_info: WaveInfo,
    pub soil_info: SoilDepthInfo,
    pub reduction_info: ReductionInfo,
    pub precision_info: PrecisionInfo,
    /// Number of time-interval slots in every series matrix
    pub n_chunks: u32,
}

impl Header {
    pub fn new(
        farming_tec: FarmingTechnique,
        wave_info: WaveInfo,
        soil_info: SoilDepthInfo,
        reduction_info: ReductionInfo,
        precision_info: PrecisionInfo,
        n_chunks: u32,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            farming_tec,
            wave_info,
            soil_info,
            reduction_info,
            precision_info,
            n_chunks,
        }
    }

    /// Rows of a light-exposure matrix.
    pub fn n_wavelengths(&self) -> u32 {
        self.wave_info.n_wavelengths as u32
    }

    /// Rows of a soil-temperature matrix.
    pub fn n_depth(&self) -> u32 {
        self.soil_info.n_depth as u32
    }

    /// Check the cross-field invariants the codec relies on.
    pub fn validate(&self) -> Result<()> {
        if self.n_chunks == 0 {
            return Err(AdfError::header_corrupted("n_chunks must be positive"));
        }
        if self.wave_info.n_wavelengths == 0 {
            return Err(AdfError::header_corrupted("n_wavelengths must be positive"));
        }
        if self.soil_info.n_depth == 0 {
            return Err(AdfError::header_corrupted("n_depth must be positive"));
        }
        if self.wave_info.min_wavelen_nm > self.wave_info.max_wavelen_nm {
            return Err(AdfError::header_corrupted(format!(
                "wavelength bounds inverted: {} > {}",
                self.wave_info.min_wavelen_nm, self.wave_info.max_wavelen_nm
            )));
        }
        Ok(())
    }

    /// Append the 60-byte header section, CRC included.
    pub fn encode(&self, w: &mut Writer) {
        let start = w.len();
        w.put_u32(SIGNATURE);
        w.put_u16(self.version);
        w.put_u8(self.farming_tec as u8);
        w.put_u16(self.wave_info.min_wavelen_nm);
        w.put_u16(self.wave_info.max_wavelen_nm);
        w.put_u16(self.wave_info.n_wavelengths);
        w.put_u16(self.soil_info.trans_y);
        w.put_u16(self.soil_info.max_soil_depth_mm);
        w.put_u16(self.soil_info.n_depth);
        w.put_u8(self.reduction_info.soil_density as u8);
        w.put_u8(self.reduction_info.pressure as u8);
        w.put_u8(self.reduction_info.light_exposure as u8);
        w.put_u8(self.reduction_info.water_use as u8);
        w.put_u8(self.reduction_info.soil_temp as u8);
        w.put_u8(self.reduction_info.env_temp as u8);
        w.put_u8(self.reduction_info.additive_conc as u8);
        w.put_f32(self.precision_info.soil_density);
        w.put_f32(self.precision_info.pressure);
        w.put_f32(self.precision_info.light_exposure);
        w.put_f32(self.precision_info.water_use);
        w.put_f32(self.precision_info.soil_temp);
        w.put_f32(self.precision_info.env_temp);
        w.put_f32(self.precision_info.additive_conc);
        w.put_u32(self.n_chunks);
        let crc = w.crc_since(start);
        w.put_u16(crc);
    }

    /// Decode and validate a header section.
    ///
    /// The CRC is checked before any field is interpreted, so a single
    /// flipped byte anywhere in the section surfaces as
    /// [`AdfError::HeaderCorrupted`] rather than a misparse further down
    /// the buffer.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let truncated = |_| AdfError::header_corrupted("truncated header section");
        let start = r.position();

        let signature = r.read_u32().map_err(truncated)?;
        let version = r.read_u16().map_err(truncated)?;
        let farming_tec = r.read_u8().map_err(truncated)?;
        let wave_info = WaveInfo {
            min_wavelen_nm: r.read_u16().map_err(truncated)?,
            max_wavelen_nm: r.read_u16().map_err(truncated)?,
            n_wavelengths: r.read_u16().map_err(truncated)?,
        };
        let soil_info = SoilDepthInfo {
            trans_y: r.read_u16().map_err(truncated)?,
            max_soil_depth_mm: r.read_u16().map_err(truncated)?,
            n_depth: r.read_u16().map_err(truncated)?,
        };
        let mut reduction_raw = [0u8; 7];
        for slot in &mut reduction_raw {
            *slot = r.read_u8().map_err(truncated)?;
        }
        let mut precision_raw = [0f32; 7];
        for slot in &mut precision_raw {
            *slot = r.read_f32().map_err(truncated)?;
        }
        let n_chunks = r.read_u32().map_err(truncated)?;

        let computed_crc = r.crc_since(start);
        let stored_crc = r.read_u16().map_err(truncated)?;
        if computed_crc != stored_crc {
            return Err(AdfError::header_corrupted(format!(
                "crc mismatch: computed {computed_crc:#06x}, stored {stored_crc:#06x}"
            )));
        }

        if signature != SIGNATURE {
            return Err(AdfError::header_corrupted(format!(
                "bad signature {signature:#010x}"
            )));
        }
        if version_major(version) != version_major(FORMAT_VERSION) {
            return Err(AdfError::header_corrupted(format!(
                "unsupported format version {version:#06x}"
            )));
        }
        let farming_tec = FarmingTechnique::try_from(farming_tec)
            .map_err(|v| AdfError::header_corrupted(format!("unknown farming technique {v}")))?;
        let reduction = |v: u8| {
            ReductionCode::try_from(v)
                .map_err(|v| AdfError::header_corrupted(format!("unknown reduction code {v}")))
        };

        let header = Self {
            version,
            farming_tec,
            wave_info,
            soil_info,
            reduction_info: ReductionInfo {
                soil_density: reduction(reduction_raw[0])?,
                pressure: reduction(reduction_raw[1])?,
                light_exposure: reduction(reduction_raw[2])?,
                water_use: reduction(reduction_raw[3])?,
                soil_temp: reduction(reduction_raw[4])?,
                env_temp: reduction(reduction_raw[5])?,
                additive_conc: reduction(reduction_raw[6])?,
            },
            precision_info: PrecisionInfo {
                soil_density: precision_raw[0],
                pressure: precision_raw[1],
                light_exposure: precision_raw[2],
                water_use: precision_raw[3],
                soil_temp: precision_raw[4],
                env_temp: precision_raw[5],
                additive_conc: precision_raw[6],
            },
            n_chunks,
        };
        header.validate()?;
        Ok(header)
    }
}
