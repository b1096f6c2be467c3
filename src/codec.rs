//! Driven frame decoding and encoding for framed transports.
//!
//! [`Decoder`] is the state-machine rendering of the staged frame read: a
//! single `decode(bytes)` entry point drives header, extended length,
//! masking key and payload in order, suspending with `Ok(None)` whenever the
//! current stage is short of bytes and resuming exactly where it left off on
//! the next call. Composed with [`tokio_util::codec::Framed`] (or
//! `FramedRead`/`FramedWrite`), completion dispatch happens on whatever
//! executor the underlying I/O resource runs on; the codec itself imposes no
//! thread affinity and holds no locks.
//!
//! Exactly one outcome is produced per frame: `Ok(Some(frame))` on success
//! or `Err` on the first violation, after which the connection is expected
//! to close. Bytes are only consumed as each stage completes, so an aborted
//! read leaves at most one stage's worth of bytes in flight.

use bytes::{Buf, BytesMut};
use tokio_util::codec;

use crate::{
    frame::{Frame, FrameHeader, MAX_HEAD_SIZE},
    FrameError, DEFAULT_MAX_PAYLOAD,
};

/// Where the decoder will resume on the next call.
enum ReadState {
    /// Header parsed; awaiting extended length and masking key.
    Header(FrameHeader),
    /// Prefix fully parsed; awaiting payload bytes.
    Payload(PendingPayload),
}

/// Everything known about a frame once its prefix is consumed.
struct PendingPayload {
    header: FrameHeader,
    mask: Option<[u8; 4]>,
    payload_len: usize,
}

/// A resumable WebSocket frame decoder.
///
/// Parses frames out of a byte buffer fed by any transport, enforcing the
/// header well-formedness rules and the configured payload cap. The cap is
/// checked as soon as the declared length is known, before a single payload
/// byte is buffered.
pub struct Decoder {
    /// Resume point between calls; `None` means "expecting a new frame".
    state: Option<ReadState>,
    /// Ceiling on a single frame's payload, in bytes.
    max_payload: usize,
}

impl Decoder {
    /// Creates a decoder with the default payload cap
    /// ([`DEFAULT_MAX_PAYLOAD`]).
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    /// Creates a decoder that rejects payloads larger than `max_payload`
    /// bytes with [`FrameError::PayloadTooLarge`].
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            state: None,
            max_payload,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl codec::Decoder for Decoder {
    type Item = Frame;
    type Error = FrameError;

    /// Drives the staged read over `src`.
    ///
    /// Returns `Ok(Some(Frame))` once a whole frame is available,
    /// `Ok(None)` while the current stage is short of bytes, and `Err` on
    /// the first protocol violation. The returned frame still carries its
    /// wire masking; call [`Frame::unmask`] before using the payload.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state.take() {
                None => {
                    if src.remaining() < 2 {
                        return Ok(None);
                    }
                    let header = FrameHeader::parse([src[0], src[1]])?;
                    src.advance(2);
                    self.state = Some(ReadState::Header(header));
                }
                Some(ReadState::Header(header)) => {
                    let need = header.extended_length_width() + header.mask_width();
                    if src.remaining() < need {
                        self.state = Some(ReadState::Header(header));
                        return Ok(None);
                    }

                    let payload_len: u64 = match header.extended_length_width() {
                        0 => u64::from(header.length_code),
                        2 => u64::from(src.get_u16()),
                        _ => {
                            let len = src.get_u64();
                            if len >> 63 != 0 {
                                return Err(FrameError::PayloadLengthOverflow);
                            }
                            len
                        }
                    };

                    if payload_len > self.max_payload as u64 {
                        return Err(FrameError::PayloadTooLarge(payload_len));
                    }

                    let mask = if header.masked {
                        Some(src.get_u32().to_be_bytes())
                    } else {
                        None
                    };

                    self.state = Some(ReadState::Payload(PendingPayload {
                        header,
                        mask,
                        // The cap fit in usize, so the length does too.
                        payload_len: payload_len as usize,
                    }));
                }
                Some(ReadState::Payload(pending)) => {
                    if src.remaining() < pending.payload_len {
                        self.state = Some(ReadState::Payload(pending));
                        return Ok(None);
                    }

                    let payload = src.split_to(pending.payload_len);
                    break Ok(Some(Frame::from_parts(
                        &pending.header,
                        pending.mask,
                        payload,
                    )));
                }
            }
        }
    }
}

/// Serializes [`Frame`]s into a byte buffer.
///
/// Produces the layout of [RFC 6455 Section 5.2]: the two composed header
/// bytes, the 0/2/8-byte extended length, the optional masking key, then the
/// payload verbatim. The frame is written as constructed; callers mask
/// outbound client frames before encoding.
///
/// [RFC 6455 Section 5.2]: https://datatracker.ietf.org/doc/html/rfc6455#section-5.2
pub struct Encoder;

impl codec::Encoder<Frame> for Encoder {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut head = [0; MAX_HEAD_SIZE];
        let size = frame.fmt_head(&mut head);

        dst.reserve(size + frame.payload.len());
        dst.extend_from_slice(&head[..size]);
        dst.extend_from_slice(&frame.payload);

        Ok(())
    }
}

/// A combined codec providing both directions for use with
/// [`tokio_util::codec::Framed`].
pub struct Codec {
    decoder: Decoder,
    encoder: Encoder,
}

impl Codec {
    /// Creates a codec with the default payload cap.
    pub fn new() -> Self {
        Self::from((Decoder::new(), Encoder))
    }

    /// Creates a codec that rejects inbound payloads larger than
    /// `max_payload` bytes.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self::from((Decoder::with_max_payload(max_payload), Encoder))
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl From<(Decoder, Encoder)> for Codec {
    fn from((decoder, encoder): (Decoder, Encoder)) -> Self {
        Self { decoder, encoder }
    }
}

impl codec::Decoder for Codec {
    type Item = <Decoder as codec::Decoder>::Item;
    type Error = <Decoder as codec::Decoder>::Error;

    #[inline]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode(src)
    }
}

impl codec::Encoder<Frame> for Codec {
    type Error = <Encoder as codec::Encoder<Frame>>::Error;

    #[inline]
    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encoder.encode(item, dst)
    }
}
