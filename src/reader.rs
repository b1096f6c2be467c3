//! Synchronous frame I/O over blocking byte streams.
//!
//! [`FrameReader`] acquires a frame from any [`std::io::Read`] source in
//! four staged reads: the two mandatory header bytes, the extended length,
//! the masking key, and the payload. Each stage fetches exactly the bytes it
//! needs, in wire order, so an abort (the source failing or closing) leaves
//! at most one stage's worth of bytes consumed. A payload announced with the
//! 64-bit length form is accumulated in bounded slices rather than a single
//! read, so no read request exceeds a slice and the source gets a progress
//! point per slice.
//!
//! [`FrameWriter`] is the symmetric sink side, chunking large payloads the
//! same way.
//!
//! Truncation surfaces as [`FrameError::IncompleteHeader`] (nothing but a
//! partial header arrived) or [`FrameError::IncompleteFrame`] (a later stage
//! came up short); any other source failure is passed through as
//! [`FrameError::Io`]. One error per failed frame; the partial frame is
//! discarded.

use std::io::{self, Read, Write};

use bytes::BytesMut;

use crate::{
    frame::{Frame, FrameHeader, MAX_HEAD_SIZE},
    FrameError, Result, DEFAULT_MAX_PAYLOAD, PAYLOAD_CHUNK,
};

/// Reads frames from a blocking byte source.
pub struct FrameReader<R> {
    src: R,
    max_payload: usize,
}

impl<R: Read> FrameReader<R> {
    /// Creates a reader with the default payload cap
    /// ([`DEFAULT_MAX_PAYLOAD`]).
    pub fn new(src: R) -> Self {
        Self::with_max_payload(src, DEFAULT_MAX_PAYLOAD)
    }

    /// Creates a reader that rejects frames declaring more than
    /// `max_payload` payload bytes.
    pub fn with_max_payload(src: R, max_payload: usize) -> Self {
        Self { src, max_payload }
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.src
    }

    /// Reads one whole frame from the source.
    ///
    /// Blocks until the frame is complete or a stage fails. The returned
    /// frame still carries its wire masking; call [`Frame::unmask`] before
    /// using the payload.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let header = self.read_header()?;
        let payload_len = self.read_extended_length(&header)?;
        let mask = self.read_masking_key(&header)?;
        let payload = self.read_payload(&header, payload_len)?;

        log::trace!(
            "read frame: opcode={:?} fin={} payload={}B masked={}",
            header.opcode,
            header.fin,
            payload.len(),
            mask.is_some(),
        );

        Ok(Frame::from_parts(&header, mask, payload))
    }

    /// Stage 1: the two mandatory header bytes.
    fn read_header(&mut self) -> Result<FrameHeader> {
        let mut bytes = [0u8; 2];
        self.src
            .read_exact(&mut bytes)
            .map_err(|err| short_read(err, FrameError::IncompleteHeader))?;
        FrameHeader::parse(bytes)
    }

    /// Stage 2: the 0/2/8-byte extended length, yielding the exact payload
    /// length.
    fn read_extended_length(&mut self, header: &FrameHeader) -> Result<u64> {
        match header.extended_length_width() {
            0 => Ok(u64::from(header.length_code)),
            2 => {
                let mut bytes = [0u8; 2];
                self.src
                    .read_exact(&mut bytes)
                    .map_err(|err| short_read(err, FrameError::IncompleteFrame))?;
                Ok(u64::from(u16::from_be_bytes(bytes)))
            }
            _ => {
                let mut bytes = [0u8; 8];
                self.src
                    .read_exact(&mut bytes)
                    .map_err(|err| short_read(err, FrameError::IncompleteFrame))?;
                let len = u64::from_be_bytes(bytes);
                if len >> 63 != 0 {
                    return Err(FrameError::PayloadLengthOverflow);
                }
                Ok(len)
            }
        }
    }

    /// Stage 3: the masking key, when the MASK bit is set.
    fn read_masking_key(&mut self, header: &FrameHeader) -> Result<Option<[u8; 4]>> {
        if !header.masked {
            return Ok(None);
        }
        let mut key = [0u8; 4];
        self.src
            .read_exact(&mut key)
            .map_err(|err| short_read(err, FrameError::IncompleteFrame))?;
        Ok(Some(key))
    }

    /// Stage 4: the payload.
    ///
    /// The cap is enforced here, before a single payload byte is requested.
    /// Payloads announced with the inline or 16-bit length form arrive in
    /// one bounded read; the 64-bit form switches to chunked accumulation.
    fn read_payload(&mut self, header: &FrameHeader, payload_len: u64) -> Result<BytesMut> {
        if payload_len > self.max_payload as u64 {
            return Err(FrameError::PayloadTooLarge(payload_len));
        }
        let len = payload_len as usize;
        if len == 0 {
            return Ok(BytesMut::new());
        }

        if header.length_code < 127 {
            let mut payload = BytesMut::zeroed(len);
            self.src
                .read_exact(&mut payload[..])
                .map_err(|err| short_read(err, FrameError::IncompleteFrame))?;
            return Ok(payload);
        }

        // The final size is known and already bounded by the cap, so one
        // reservation covers the whole accumulation.
        let mut payload = BytesMut::with_capacity(len);
        let mut chunk = [0u8; PAYLOAD_CHUNK];
        let mut remaining = len;
        while remaining > 0 {
            let want = remaining.min(PAYLOAD_CHUNK);
            self.src
                .read_exact(&mut chunk[..want])
                .map_err(|err| short_read(err, FrameError::IncompleteFrame))?;
            payload.extend_from_slice(&chunk[..want]);
            remaining -= want;
        }
        Ok(payload)
    }
}

/// Maps a short read onto the codec's truncation error for the current
/// stage, passing every other source failure through untouched.
fn short_read(err: io::Error, truncated: FrameError) -> FrameError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        truncated
    } else {
        FrameError::Io(err)
    }
}

/// Writes frames to a blocking byte sink.
pub struct FrameWriter<W> {
    sink: W,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a writer over `sink`.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Consumes the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Serializes one frame to the sink and flushes it.
    ///
    /// The frame prefix goes out in one write; a payload using the 64-bit
    /// length form follows in [`PAYLOAD_CHUNK`]-byte slices, mirroring the
    /// reader's chunked acquisition.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let mut head = [0u8; MAX_HEAD_SIZE];
        let head_len = frame.fmt_head(&mut head);
        self.sink.write_all(&head[..head_len])?;

        if frame.length_code() == 127 {
            for chunk in frame.payload.chunks(PAYLOAD_CHUNK) {
                self.sink.write_all(chunk)?;
            }
        } else {
            self.sink.write_all(&frame.payload)?;
        }

        self.sink.flush()?;
        Ok(())
    }
}
