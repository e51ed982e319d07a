// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Little-endian reader for the fastText binary layout

use crate::embeddings::ModelLoadError;
use ndarray::Array2;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Sequential reader that tracks how many bytes remain in the file so
/// that corrupt size fields fail cleanly instead of allocating blindly.
pub(crate) struct BinaryReader<R> {
    inner: R,
    path: PathBuf,
    remaining: u64,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R, path: &Path, len: u64) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
            remaining: len,
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ModelLoadError> {
        if buf.len() as u64 > self.remaining {
            return Err(ModelLoadError::malformed(format!(
                "unexpected end of file (needed {} bytes, {} left)",
                buf.len(),
                self.remaining
            )));
        }
        self.inner.read_exact(buf).map_err(|source| self.io(source))?;
        self.remaining -= buf.len() as u64;
        Ok(())
    }

    /// Bytes left between the current position and the end of the file
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn io(&self, source: io::Error) -> ModelLoadError {
        ModelLoadError::Io {
            path: self.path.clone(),
            source,
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, ModelLoadError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, ModelLoadError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i8(&mut self) -> Result<i8, ModelLoadError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i32(&mut self) -> Result<i32, ModelLoadError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_i64(&mut self) -> Result<i64, ModelLoadError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    pub fn read_f64(&mut self) -> Result<f64, ModelLoadError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Reads a NUL-terminated byte string. Tokens are arbitrary bytes in
    /// fastText, so invalid UTF-8 is replaced rather than rejected.
    pub fn read_cstring(&mut self) -> Result<String, ModelLoadError> {
        let mut bytes = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                b => bytes.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a dense `rows x cols` f32 matrix preceded by its i64 shape
    pub fn read_matrix(&mut self) -> Result<Array2<f32>, ModelLoadError> {
        let rows = self.read_i64()?;
        let cols = self.read_i64()?;
        if rows < 0 || cols < 0 {
            return Err(ModelLoadError::malformed(format!(
                "negative matrix shape {}x{}",
                rows, cols
            )));
        }

        let (rows, cols) = (rows as usize, cols as usize);
        let byte_len = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n as u64 <= self.remaining)
            .ok_or_else(|| {
                ModelLoadError::malformed(format!(
                    "matrix of {}x{} does not fit in the remaining {} bytes",
                    rows, cols, self.remaining
                ))
            })?;

        let mut bytes = vec![0u8; byte_len];
        self.fill(&mut bytes)?;
        let values: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| ModelLoadError::malformed(format!("bad matrix shape: {}", e)))
    }
}
