//! Row-major `f32` matrices with out-of-band shape
//!
//! Series measurements are stored as 2D arrays whose shape is derived from
//! the container header, never from the byte stream itself. The decoder
//! therefore requires the caller to supply `(rows, columns)` and rejects
//! inputs shorter than `rows * columns * 4` bytes.

use serde::{Deserialize, Serialize};

use crate::error::{AdfError, Result};
use crate::wire::{Reader, Truncated, Writer};

/// An owned, row-major 2D array of `f32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f32>,
    rows: u32,
    columns: u32,
}

impl Matrix {
    /// Create a zero-filled matrix of the given shape.
    pub fn zeros(rows: u32, columns: u32) -> Self {
        Self {
            data: vec![0.0; rows as usize * columns as usize],
            rows,
            columns,
        }
    }

    /// Create a matrix from a row-major buffer.
    ///
    /// Fails if `data.len() != rows * columns`.
    pub fn from_vec(data: Vec<f32>, rows: u32, columns: u32) -> Result<Self> {
        if data.len() != rows as usize * columns as usize {
            return Err(AdfError::runtime(format!(
                "matrix buffer of {} elements does not fit shape {}x{}",
                data.len(),
                rows,
                columns
            )));
        }
        Ok(Self {
            data,
            rows,
            columns,
        })
    }

    /// Create a single-row matrix, the shape used for per-chunk scalar
    /// quantities such as environment temperature and water use.
    pub fn from_row(row: Vec<f32>) -> Self {
        let columns = row.len() as u32;
        Self {
            data: row,
            rows: 1,
            columns,
        }
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Element at `(row, column)`, or `None` when out of bounds.
    pub fn at(&self, row: u32, column: u32) -> Option<f32> {
        if row < self.rows && column < self.columns {
            Some(self.data[(row * self.columns + column) as usize])
        } else {
            None
        }
    }

    /// Set the element at `(row, column)`. Out-of-bounds writes are ignored
    /// and reported as `false`.
    pub fn set(&mut self, row: u32, column: u32, value: f32) -> bool {
        if row < self.rows && column < self.columns {
            self.data[(row * self.columns + column) as usize] = value;
            true
        } else {
            false
        }
    }

    /// One full row as a slice.
    pub fn row(&self, row: u32) -> Option<&[f32]> {
        if row < self.rows {
            let start = (row * self.columns) as usize;
            Some(&self.data[start..start + self.columns as usize])
        } else {
            None
        }
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Encoded size in bytes: `rows * columns * 4`.
    pub fn encoded_size(&self) -> usize {
        self.data.len() * 4
    }

    /// Append every element, row-major, as little-endian `f32`.
    pub fn encode(&self, w: &mut Writer) {
        for &value in &self.data {
            w.put_f32(value);
        }
    }

    /// Decode a matrix of the given shape.
    ///
    /// The shape is not self-described on the wire; it comes from the
    /// container header. Short input fails closed before anything is
    /// allocated, so a corrupt shape can never drive an allocation larger
    /// than the input itself.
    pub fn decode(r: &mut Reader<'_>, rows: u32, columns: u32) -> std::result::Result<Self, Truncated> {
        let len = rows as usize * columns as usize;
        if len > r.remaining() / 4 {
            return Err(Truncated);
        }
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(r.read_f32()?);
        }
        Ok(Self {
            data,
            rows,
            columns,
        })
    }
}
