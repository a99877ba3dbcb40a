//! Incremental extraction of JSON records from an unaligned byte stream.
//!
//! Chunks arriving from a streaming response carry no guarantee that they
//! line up with record boundaries: one chunk may hold half a record, or
//! several records back to back. [`ChunkBuffer`] accumulates the bytes and
//! hands out each complete JSON value as soon as its closing byte arrives.
//!
//! ```
//! use net::ChunkBuffer;
//!
//! let mut buffer = ChunkBuffer::new();
//! assert_eq!(buffer.append(br#"{"text":"h"#).count(), 0);
//! let records: Vec<_> = buffer.append(br#"i"}"#).collect();
//! assert_eq!(records.len(), 1);
//! ```

use serde::de::IgnoredAny;

use crate::DecodeError;

/// Default upper bound on bytes held while waiting for a record to complete.
pub const DEFAULT_MAX_PENDING: usize = 1024 * 1024;

/// Byte span of exactly one complete JSON value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompleteRecord(Vec<u8>);

impl CompleteRecord {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CompleteRecord {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Accumulates raw chunks and yields complete records.
///
/// Boundaries are found by a structural scan that resumes where the previous
/// append left off; each span is then checked with `serde_json`. Bytes that
/// cannot start or continue a JSON value are reported as soon as they are
/// seen, so a record following them is never held back.
#[derive(Debug)]
pub struct ChunkBuffer {
    pending: Vec<u8>,
    max_pending: usize,
    scan: Scan,
    /// Malformed bytes dropped since the last good record.
    discarded: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Shape {
    #[default]
    Unknown,
    /// Object or array.
    Nested,
    /// Top-level string.
    Text,
    /// Number or literal.
    Bare,
}

/// Progress through the value at the front of the pending bytes.
#[derive(Debug, Default)]
struct Scan {
    pos: usize,
    shape: Shape,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scan {
    /// Look at the bytes not yet seen and return the end of the value once
    /// it is known.
    fn advance(&mut self, pending: &[u8]) -> Option<usize> {
        while self.pos < pending.len() {
            let at = self.pos;
            let byte = pending[at];
            self.pos += 1;

            if at == 0 {
                match byte {
                    b'{' | b'[' => {
                        self.shape = Shape::Nested;
                        self.depth = 1;
                    }
                    b'"' => {
                        self.shape = Shape::Text;
                        self.in_string = true;
                    }
                    b'}' | b']' | b',' | b':' => return Some(1),
                    _ => {
                        self.shape = Shape::Bare;
                        if !could_be_scalar(&pending[..1]) {
                            return Some(garbage_end(pending, 0));
                        }
                    }
                }
                continue;
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                    if self.shape == Shape::Text {
                        return Some(self.pos);
                    }
                } else if byte < 0x20 {
                    // raw control bytes never appear inside a JSON string
                    return Some(self.pos);
                }
                continue;
            }

            match self.shape {
                Shape::Nested => match byte {
                    b'"' => self.in_string = true,
                    b'{' | b'[' => self.depth += 1,
                    b'}' | b']' => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            return Some(self.pos);
                        }
                    }
                    _ => {}
                },
                Shape::Bare if is_delimiter(byte) => return Some(at),
                Shape::Bare if !could_be_scalar(&pending[..self.pos]) => {
                    return Some(garbage_end(pending, at));
                }
                _ => {}
            }
        }
        None
    }
}

impl Default for ChunkBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING)
    }

    /// Create a buffer that gives up once `limit` bytes are pending without
    /// forming a record, or once `limit` malformed bytes arrive in a row.
    pub fn with_max_pending(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending: limit,
            scan: Scan::default(),
            discarded: 0,
        }
    }

    /// Append `chunk` and return the records it completes.
    ///
    /// The returned iterator is lazy. Records left unread when it is dropped
    /// stay buffered and are returned by the next call to `append` or
    /// [`records`](Self::records).
    pub fn append(&mut self, chunk: &[u8]) -> Records<'_> {
        self.pending.extend_from_slice(chunk);
        self.records()
    }

    /// Resume scanning the pending bytes without appending anything.
    pub fn records(&mut self) -> Records<'_> {
        Records { buffer: self }
    }

    /// Number of bytes held that do not yet form a record.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop any partial data.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.scan = Scan::default();
        self.discarded = 0;
    }

    fn next_record(&mut self) -> Option<Result<CompleteRecord, DecodeError>> {
        if self.scan.pos == 0 {
            // keep-alive newlines between records
            let start = self
                .pending
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(self.pending.len());
            self.pending.drain(..start);
        }
        if self.pending.is_empty() {
            return None;
        }

        let Some(end) = self.scan.advance(&self.pending) else {
            if self.pending.len() > self.max_pending {
                return Some(Err(self.overflow()));
            }
            return None;
        };

        let span: Vec<u8> = self.pending.drain(..end).collect();
        self.scan = Scan::default();
        match serde_json::from_slice::<IgnoredAny>(&span) {
            Ok(_) => {
                self.discarded = 0;
                Some(Ok(CompleteRecord(span)))
            }
            Err(err) => {
                self.discarded += span.len();
                if self.discarded > self.max_pending {
                    Some(Err(self.overflow()))
                } else {
                    Some(Err(DecodeError::MalformedSyntax(err)))
                }
            }
        }
    }

    fn overflow(&mut self) -> DecodeError {
        self.clear();
        DecodeError::Overflow {
            limit: self.max_pending,
        }
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'{' | b'}' | b'[' | b']' | b'"' | b',' | b':')
}

/// Whether `token`, whose earlier bytes already passed, can still grow into
/// a number or literal.
fn could_be_scalar(token: &[u8]) -> bool {
    let (Some(&first), Some(&last)) = (token.first(), token.last()) else {
        return true;
    };
    match first {
        b'-' | b'0'..=b'9' => matches!(last, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'),
        _ => [&b"true"[..], b"false", b"null"]
            .iter()
            .any(|literal| literal.starts_with(token)),
    }
}

/// End of a run of bytes that cannot be JSON, stopping at the next
/// delimiter after `from`.
fn garbage_end(pending: &[u8], from: usize) -> usize {
    pending[from..]
        .iter()
        .position(|&b| is_delimiter(b))
        .map_or(pending.len(), |i| from + i)
}

/// Lazy sequence of records completed by the latest append.
pub struct Records<'a> {
    buffer: &'a mut ChunkBuffer,
}

impl Iterator for Records<'_> {
    type Item = Result<CompleteRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.next_record()
    }
}
