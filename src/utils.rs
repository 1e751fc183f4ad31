use std::path::Path;

use crate::error::{ChainError, Result};

const LEADING_BYTES: usize = 4;

/// Hex of the first few bytes of `data`, for format errors.
pub fn leading_bytes_hex(data: &[u8]) -> String {
    let end = data.len().min(LEADING_BYTES);
    if end == 0 {
        return "<empty>".to_string();
    }
    hex::encode(&data[..end])
}

/// Read a certificate file, mapping the common failures to user-facing messages.
pub fn read_certificate_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ChainError::InvalidInput(format!(
            "No such file '{}'",
            path.display()
        )));
    }
    std::fs::read(path).map_err(|_| {
        ChainError::InvalidInput(format!("Cannot read file '{}'", path.display()))
    })
}

/// True when `data` has nothing but whitespace in it.
pub fn is_blank(data: &[u8]) -> bool {
    data.iter().all(|b| b.is_ascii_whitespace())
}
