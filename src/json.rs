//! JSON interchange for ADF containers
//!
//! JSON is an interchange convenience, not the storage format: it carries no
//! CRCs, so [`Adf::validate`] runs on every import to re-establish the
//! invariants the binary decoder would have enforced.

use crate::container::Adf;
use crate::error::{AdfError, Result};

impl Adf {
    /// Serialize the container to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AdfError::runtime(e.to_string()))
    }

    /// Serialize the container to human-readable JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AdfError::runtime(e.to_string()))
    }

    /// Deserialize and validate a container from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let adf: Self =
            serde_json::from_str(json).map_err(|e| AdfError::runtime(e.to_string()))?;
        adf.validate()?;
        Ok(adf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{HeaderBuilder, SeriesBuilder};
    use crate::period;

    fn sample_adf() -> Adf {
        let header = HeaderBuilder::new().n_chunks(3).build().unwrap();
        let mut adf = Adf::new(header, period::DAY).unwrap();
        let series = SeriesBuilder::for_header(&header)
            .env_temp_c(vec![20.0, 21.0, 22.0])
            .ph(6.8)
            .build()
            .unwrap();
        adf.add_series(series).unwrap();
        adf
    }

    #[test]
    fn test_json_roundtrip() {
        let adf = sample_adf();
        let json = adf.to_json().unwrap();
        let restored = Adf::from_json(&json).unwrap();
        assert_eq!(restored, adf);
    }

    #[test]
    fn test_from_json_rejects_inconsistent_container() {
        let adf = sample_adf();
        let json = adf.to_json().unwrap();
        // Lie about the series count.
        let tampered = json.replace("\"size_series\":1", "\"size_series\":3");
        assert_ne!(tampered, json);
        assert!(Adf::from_json(&tampered).is_err());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Adf::from_json("not json at all").is_err());
        assert!(Adf::from_json("{}").is_err());
    }
}
