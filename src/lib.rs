//! # adflib - Agricultural Data Format for Rust
//!
//! A binary container format for recording time-series agricultural growth
//! data: light exposure across a sampled spectrum, soil and environment
//! temperature, water use, soil conditions, and chemical additive dosing,
//! organized into repeated measurement intervals.
//!
//! A container is three things laid out back to back:
//!
//! - a **header** with the fixed growing-condition parameters (farming
//!   technique, spectrum and soil-depth sampling resolution, reduction and
//!   precision settings, chunk count), written once and immutable;
//! - a **metadata** block with record counts, the interval period, seeding
//!   and harvest timestamps, and the table of additive codes ever used;
//! - an ordered sequence of **series**, one per repetition cycle, each
//!   carrying four header-shaped matrices plus scalars and additive lists.
//!
//! Every section ends with a CRC-16, so corruption anywhere in a buffer is
//! reported as that section's error instead of a silent misparse.
//!
//! ## Quick Start
//!
//! ```rust
//! use adflib::{Adf, HeaderBuilder, SeriesBuilder, FarmingTechnique, period, Result};
//!
//! fn example() -> Result<()> {
//!     let header = HeaderBuilder::new()
//!         .farming_technique(FarmingTechnique::Hydroponics)
//!         .n_chunks(4)
//!         .build()?;
//!
//!     let mut adf = Adf::new(header, period::DAY)?;
//!     let series = SeriesBuilder::for_header(&header)
//!         .env_temp_c(vec![21.0, 22.5, 23.0, 22.0])
//!         .ph(6.5)
//!         .build()?;
//!     adf.add_series(series)?;
//!
//!     let bytes = adf.marshal()?;
//!     let restored = Adf::unmarshal(&bytes)?;
//!     assert_eq!(restored, adf);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod additive;
pub mod builder;
pub mod container;
pub mod error;
pub mod header;
pub mod matrix;
pub mod metadata;
pub mod series;
pub mod wire;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "cbor")]
pub mod cbor;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-export main types
pub use additive::{ADDITIVE_LIMIT, Additive};
pub use builder::{HeaderBuilder, SeriesBuilder};
pub use container::Adf;
pub use error::{AdfError, Result, StatusCode};
pub use header::{
    FarmingTechnique, Header, PrecisionInfo, ReductionCode, ReductionInfo, SIGNATURE,
    SoilDepthInfo, WaveInfo,
};
pub use matrix::Matrix;
pub use metadata::Metadata;
pub use series::Series;

/// Packed format version written into every header: major in the high
/// byte, minor and patch in the low nibbles.
pub const FORMAT_VERSION: u16 = 0x0100;

/// Major component of a packed version.
pub const fn version_major(version: u16) -> u8 {
    (version >> 8) as u8
}

/// Minor component of a packed version.
pub const fn version_minor(version: u16) -> u8 {
    ((version & 0x00F0) >> 4) as u8
}

/// Patch component of a packed version.
pub const fn version_patch(version: u16) -> u8 {
    (version & 0x000F) as u8
}

/// The crate's format version as `"major.minor.patch"`.
pub fn version_string() -> String {
    format!(
        "{}.{}.{}",
        version_major(FORMAT_VERSION),
        version_minor(FORMAT_VERSION),
        version_patch(FORMAT_VERSION)
    )
}

/// Common chunk-interval durations in seconds.
pub mod period {
    /// One day
    pub const DAY: u32 = 86_400;
    /// Seven days
    pub const WEEK: u32 = 604_800;
    /// A 28-day month
    pub const MONTH_28: u32 = 2_419_200;
    /// A 29-day month
    pub const MONTH_29: u32 = 2_505_600;
    /// A 30-day month
    pub const MONTH_30: u32 = 2_592_000;
    /// A 31-day month
    pub const MONTH_31: u32 = 2_678_400;
}
