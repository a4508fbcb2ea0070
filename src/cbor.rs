//! CBOR interchange for ADF containers
//!
//! Same contract as the JSON module: CBOR buffers carry no CRCs, so every
//! import is re-validated against the container invariants.

use crate::container::Adf;
use crate::error::{AdfError, Result};

impl Adf {
    /// Serialize the container to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(self, &mut bytes)
            .map_err(|e| AdfError::runtime(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize and validate a container from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let adf: Self =
            ciborium::de::from_reader(bytes).map_err(|e| AdfError::runtime(e.to_string()))?;
        adf.validate()?;
        Ok(adf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{HeaderBuilder, SeriesBuilder};
    use crate::period;

    #[test]
    fn test_cbor_roundtrip() {
        let header = HeaderBuilder::new().n_chunks(2).build().unwrap();
        let mut adf = Adf::new(header, period::WEEK).unwrap();
        let series = SeriesBuilder::for_header(&header)
            .water_use_ml(vec![480.0, 505.0])
            .repeated(4)
            .build()
            .unwrap();
        adf.add_series(series).unwrap();

        let bytes = adf.to_cbor().unwrap();
        let restored = Adf::from_cbor(&bytes).unwrap();
        assert_eq!(restored, adf);
    }

    #[test]
    fn test_from_cbor_rejects_garbage() {
        assert!(Adf::from_cbor(&[0xDE, 0xAD, 0xBE, 0xEF]).is_err());
    }
}
