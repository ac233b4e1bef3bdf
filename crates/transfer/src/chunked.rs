use std::io::Read;
use std::path::Path;

use crate::types::Chunk;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

/// Number of chunks a file of `file_size` bytes splits into.
///
/// A zero-byte file has no chunks.
pub fn chunk_count(file_size: u64, chunk_size: usize) -> u64 {
    let chunk_size = chunk_size.max(1) as u64;
    file_size.div_ceil(chunk_size)
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file front to back in fixed-size chunks.
///
/// The reader is forward-only: once exhausted (or after an error) it yields
/// nothing more, and a new reader must be opened to read the file again.
pub struct ChunkReader {
    file: std::fs::File,
    chunk_size: usize,
    offset: u64,
    file_path: String,
    file_size: u64,
    next_part: u32,
    done: bool,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    ///
    /// The file size is captured at open time; the reader covers exactly that
    /// many bytes. If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] is used.
    pub fn new(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Ok(Self {
            file,
            chunk_size,
            offset: 0,
            file_path: path.to_string_lossy().into_owned(),
            file_size,
            next_part: 1,
            done: file_size == 0,
        })
    }

    /// Reads the next chunk. Returns `None` at EOF.
    ///
    /// Fails if the file becomes unreadable or shorter than its size at open.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        if self.done {
            return Ok(None);
        }

        let remaining = self.file_size - self.offset;
        if remaining == 0 {
            self.done = true;
            return Ok(None);
        }

        let read_size = std::cmp::min(remaining, self.chunk_size as u64) as usize;
        let mut buf = vec![0u8; read_size];
        let mut filled = 0;
        while filled < read_size {
            let n = match self.file.read(&mut buf[filled..]) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            };
            if n == 0 {
                self.done = true;
                return Err(TransferError::Truncated {
                    path: self.file_path.clone(),
                    expected: self.file_size,
                    actual: self.offset + filled as u64,
                });
            }
            filled += n;
        }

        let chunk = Chunk {
            part_number: self.next_part,
            offset: self.offset,
            data: buf,
        };
        self.offset += read_size as u64;
        self.next_part += 1;
        Ok(Some(chunk))
    }

    /// Current byte offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Total file size in bytes, as seen when the reader was opened.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes remaining to read.
    pub fn remaining(&self) -> u64 {
        self.file_size - self.offset
    }

    /// Chunk size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Total number of chunks this reader yields.
    pub fn total_chunks(&self) -> u64 {
        chunk_count(self.file_size, self.chunk_size)
    }
}

impl Iterator for ChunkReader {
    type Item = Result<Chunk, TransferError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
