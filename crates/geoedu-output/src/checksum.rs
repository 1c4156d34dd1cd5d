//! SHA-256 digests of written artifacts.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{OutputError, Result};

const BUFFER_SIZE: usize = 65536;

/// Hex-encoded SHA-256 of a file.
pub fn compute_file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| OutputError::io(path, e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| OutputError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
