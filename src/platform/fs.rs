// CrashSleuth - platform/fs.rs
//
// Size-limited file reading for facts documents, raw logs, registries and
// template overrides. Callers map failures into their own typed errors.

use std::io::{self, Read};
use std::path::Path;

/// Why a size-limited read failed.
#[derive(Debug)]
pub enum ReadFailure {
    /// The file is larger than the allowed maximum.
    TooLarge { size: u64, max_size: u64 },

    Io(io::Error),
}

impl From<io::Error> for ReadFailure {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Read a whole file as text, refusing files larger than `max_size` bytes.
///
/// The size is checked before reading and again while reading, so a file
/// that grows in between is still caught. Invalid UTF-8 is replaced lossily;
/// crash logs regularly carry mis-encoded paths.
pub fn read_limited(path: &Path, max_size: u64) -> Result<String, ReadFailure> {
    let file = std::fs::File::open(path)?;
    let size = file.metadata()?.len();
    if size > max_size {
        return Err(ReadFailure::TooLarge { size, max_size });
    }

    let mut bytes = Vec::with_capacity(size as usize);
    file.take(max_size + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_size {
        return Err(ReadFailure::TooLarge {
            size: bytes.len() as u64,
            max_size,
        });
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::debug!(path = %path.display(), "File is not valid UTF-8; decoding lossily");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}
