//! Line framing for frames carried over a reliable ordered byte stream.
//!
//! Every frame is one line: a kind byte (`S` snapshot, `D` delta), the
//! frame text, then `\n`. The codec alphabet never produces a newline.

use std::io::{self, BufRead, Write};

pub const SNAPSHOT_KIND: u8 = b'S';
pub const DELTA_KIND: u8 = b'D';

/// Frames longer than this are refused by [`FrameReader::new`] readers.
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("stream error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown frame kind {0:#04x}")]
    UnknownKind(u8),
    #[error("empty frame line")]
    EmptyLine,
    #[error("frame exceeds {limit} bytes")]
    FrameTooLong { limit: usize },
    #[error("frame text contains a line break")]
    EmbeddedNewline,
    #[error("stream ended inside a frame")]
    UnexpectedEof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Snapshot,
    Delta,
}

impl FrameKind {
    pub fn byte(self) -> u8 {
        match self {
            Self::Snapshot => SNAPSHOT_KIND,
            Self::Delta => DELTA_KIND,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SNAPSHOT_KIND => Some(Self::Snapshot),
            DELTA_KIND => Some(Self::Delta),
            _ => None,
        }
    }
}

/// One received frame. The payload is kept as raw bytes so that text
/// validation stays with the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn is_snapshot(&self) -> bool {
        self.kind == FrameKind::Snapshot
    }
}

pub fn write_frame<W: Write>(
    writer: &mut W,
    kind: FrameKind,
    payload: &str,
) -> Result<(), SessionError> {
    if payload.contains('\n') {
        return Err(SessionError::EmbeddedNewline);
    }
    writer.write_all(&[kind.byte()])?;
    writer.write_all(payload.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_len: usize,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_limit(inner: R, max_len: usize) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            max_len,
        }
    }

    /// Reads the next frame; `Ok(None)` on a clean end of stream.
    ///
    /// A partial line stays buffered across `WouldBlock` errors, so a
    /// non-blocking stream can be polled until a full frame arrives.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, SessionError> {
        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                self.buf.clear();
                return Err(SessionError::UnexpectedEof);
            }

            let (consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.buf.extend_from_slice(&available[..end]);
                    (end + 1, true)
                }
                None => {
                    self.buf.extend_from_slice(available);
                    (available.len(), false)
                }
            };
            self.inner.consume(consumed);

            if self.buf.len() > self.max_len {
                self.buf.clear();
                return Err(SessionError::FrameTooLong {
                    limit: self.max_len,
                });
            }
            if complete {
                let line = std::mem::take(&mut self.buf);
                return parse_line(line).map(Some);
            }
        }
    }
}

fn parse_line(mut line: Vec<u8>) -> Result<Frame, SessionError> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    let Some(&first) = line.first() else {
        return Err(SessionError::EmptyLine);
    };
    let kind = FrameKind::from_byte(first).ok_or(SessionError::UnknownKind(first))?;
    line.remove(0);
    Ok(Frame {
        kind,
        payload: line,
    })
}

/// Decides, tick by tick, whether a client receives a snapshot or a delta.
///
/// The first frame is always a snapshot. After that a snapshot goes out
/// every `interval` ticks; an interval of 0 sends deltas only.
#[derive(Debug, Clone)]
pub struct SnapshotSchedule {
    interval: u64,
    since_snapshot: Option<u64>,
}

impl SnapshotSchedule {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            since_snapshot: None,
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Forces the next frame to be a snapshot.
    pub fn request_snapshot(&mut self) {
        self.since_snapshot = None;
    }

    pub fn next_kind(&mut self) -> FrameKind {
        match self.since_snapshot {
            Some(ticks) if self.interval == 0 || ticks + 1 < self.interval => {
                self.since_snapshot = Some(ticks + 1);
                FrameKind::Delta
            }
            _ => {
                self.since_snapshot = Some(0);
                FrameKind::Snapshot
            }
        }
    }
}
