//! # Frame
//!
//! WebSocket frames as defined in [RFC 6455 Section 5.2](https://datatracker.ietf.org/doc/html/rfc6455#section-5.2):
//! the smallest unit on the wire, a typed envelope for up to one payload.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |         (16 or 64 bits)       |
//! |N|V|V|V|       |S|             |                               |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |        Extended payload length continued, if payload len == 127|
//! +---------------------------------------------------------------+
//! |                               |   Masking-key, if MASK set to 1|
//! +-------------------------------+-------------------------------+
//! |     Masking-key (continued)       |          Payload Data      |
//! +-----------------------------------+ - - - - - - - - - - - - - -+
//! :                     Payload Data continued ...                :
//! +---------------------------------------------------------------+
//! ```
//!
//! The 7-bit payload length field is three-valued: a value below 126 is the
//! exact length, 126 announces a following 16-bit big-endian length, and 127
//! announces a following 64-bit big-endian length. A set MASK bit announces
//! a 4-byte masking key between the length and the payload.
//!
//! [`FrameHeader`] is the decoded form of the two mandatory header bytes and
//! carries all well-formedness checks that can be made from them alone.
//! [`Frame`] owns its payload and masking key, serializes itself with
//! [`Frame::to_bytes`], and reverses in-flight masking with
//! [`Frame::unmask`]. Frames are produced either by the constructors here
//! (outbound) or by [`FrameReader`](crate::FrameReader) and
//! [`codec::Decoder`](crate::codec::Decoder) (inbound).

use bytes::{Bytes, BytesMut};

use crate::{close::CloseCode, FrameError, Result};

/// WebSocket operation code: the 4-bit tag identifying the frame kind.
///
/// Data frames (`Continuation`, `Text`, `Binary`) carry application payload;
/// control frames (`Close`, `Ping`, `Pong`) manage the connection and must
/// be final with a payload of at most 125 bytes. The nibble values 0x3-0x7
/// and 0xB-0xF are reserved and rejected at parse time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpCode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl OpCode {
    /// Returns `true` for `Close`, `Ping` and `Pong`.
    pub fn is_control(&self) -> bool {
        matches!(*self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }

    /// Returns `true` for `Continuation`, `Text` and `Binary`.
    pub fn is_data(&self) -> bool {
        !self.is_control()
    }
}

impl TryFrom<u8> for OpCode {
    type Error = FrameError;

    /// Interprets an opcode nibble from the frame header. Reserved values
    /// yield [`FrameError::InvalidOpCode`].
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x0 => Ok(Self::Continuation),
            0x1 => Ok(Self::Text),
            0x2 => Ok(Self::Binary),
            0x8 => Ok(Self::Close),
            0x9 => Ok(Self::Ping),
            0xA => Ok(Self::Pong),
            _ => Err(FrameError::InvalidOpCode(value)),
        }
    }
}

impl From<OpCode> for u8 {
    fn from(val: OpCode) -> Self {
        match val {
            OpCode::Continuation => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
        }
    }
}

/// Largest possible frame prefix: 2 header bytes, 8 bytes of extended
/// length, 4 bytes of masking key.
pub(crate) const MAX_HEAD_SIZE: usize = 14;

/// The decoded form of the two mandatory header bytes.
///
/// [`FrameHeader::parse`] performs every well-formedness check RFC 6455
/// mandates at this stage, so the later read stages only have to fetch
/// bytes. The extended length and masking key are not part of this type;
/// they follow on the wire and are consumed by the reader or decoder using
/// the widths this header announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// FIN bit: this frame completes a message.
    pub fin: bool,
    /// RSV1 bit, repurposed by permessage-deflate as the compression marker.
    pub rsv1: bool,
    /// RSV2 bit. Parsed and carried; rejecting it is upstream policy.
    pub rsv2: bool,
    /// RSV3 bit. Parsed and carried; rejecting it is upstream policy.
    pub rsv3: bool,
    /// The frame kind.
    pub opcode: OpCode,
    /// MASK bit: a 4-byte masking key follows the length.
    pub masked: bool,
    /// The 7-bit payload length field as it appears on the wire. Below 126
    /// this is the exact payload length; 126 and 127 announce an extended
    /// length.
    pub length_code: u8,
}

impl FrameHeader {
    /// Parses and validates the two mandatory header bytes.
    ///
    /// # Errors
    ///
    /// - [`FrameError::InvalidOpCode`] for a reserved opcode nibble.
    /// - [`FrameError::CompressedNonDataFrame`] when RSV1 is set on anything
    ///   but a text or binary frame.
    /// - [`FrameError::ControlFrameFragmented`] for a control frame without
    ///   FIN.
    /// - [`FrameError::ControlFrameTooLarge`] for a control frame whose
    ///   length field exceeds 125, including the 126/127 escape values.
    pub fn parse(bytes: [u8; 2]) -> Result<Self> {
        let fin = bytes[0] & 0b1000_0000 != 0;
        let rsv1 = bytes[0] & 0b0100_0000 != 0;
        let rsv2 = bytes[0] & 0b0010_0000 != 0;
        let rsv3 = bytes[0] & 0b0001_0000 != 0;
        let opcode = OpCode::try_from(bytes[0] & 0b0000_1111)?;
        let masked = bytes[1] & 0b1000_0000 != 0;
        let length_code = bytes[1] & 0b0111_1111;

        // The compression bit only means something on the initial frame of
        // a data message.
        if rsv1 && !matches!(opcode, OpCode::Text | OpCode::Binary) {
            return Err(FrameError::CompressedNonDataFrame);
        }

        if opcode.is_control() {
            if !fin {
                return Err(FrameError::ControlFrameFragmented);
            }
            if length_code > 125 {
                return Err(FrameError::ControlFrameTooLarge);
            }
        }

        Ok(Self {
            fin,
            rsv1,
            rsv2,
            rsv3,
            opcode,
            masked,
            length_code,
        })
    }

    /// Width of the extended length field this header announces: 0, 2 or 8
    /// bytes.
    pub fn extended_length_width(&self) -> usize {
        match self.length_code {
            126 => 2,
            127 => 8,
            _ => 0,
        }
    }

    /// Width of the masking key field: 4 when masked, otherwise 0.
    pub fn mask_width(&self) -> usize {
        if self.masked {
            4
        } else {
            0
        }
    }
}

/// A WebSocket frame: flags, opcode, optional masking key and owned payload.
///
/// A frame is created either by the outbound constructors
/// ([`Frame::outbound`] and the convenience builders below) or by the
/// inbound reader and decoder. After a successful construction or parse the
/// RFC well-formedness rules hold: the opcode is one of the six supported
/// values, control frames are final with at most 125 payload bytes, and the
/// compression bit only appears on text and binary frames.
///
/// An inbound frame keeps its payload exactly as it appeared on the wire;
/// call [`Frame::unmask`] before handing the bytes to the application.
#[derive(Debug)]
pub struct Frame {
    /// Indicates if this is the final frame in a message.
    pub fin: bool,
    /// Compression flag (RSV1).
    pub(crate) is_compressed: bool,
    /// RSV2, carried verbatim.
    pub(crate) rsv2: bool,
    /// RSV3, carried verbatim.
    pub(crate) rsv3: bool,
    /// The opcode of the frame, defining its type.
    pub opcode: OpCode,
    /// The masking key, if any.
    mask: Option<[u8; 4]>,
    /// The payload of the frame.
    pub payload: BytesMut,
}

impl Frame {
    /// Creates a new frame from its parts.
    ///
    /// The payload is stored as given; no masking is applied. Passing an
    /// explicit `mask` key and then calling [`Frame::mask`] yields a
    /// deterministic wire image, which is how tests avoid the random key
    /// path.
    pub fn new(
        fin: bool,
        opcode: OpCode,
        mask: Option<[u8; 4]>,
        payload: impl Into<BytesMut>,
    ) -> Self {
        Self {
            fin,
            opcode,
            mask,
            payload: payload.into(),
            is_compressed: false,
            rsv2: false,
            rsv3: false,
        }
    }

    /// Builds a final outbound frame.
    ///
    /// `compress` sets the RSV1 bit, but only on text and binary frames;
    /// control and continuation frames never carry it. When `mask` is true
    /// a fresh 4-byte key is drawn from the thread-local CSPRNG and the
    /// payload is masked in place, as RFC 6455 requires for every
    /// client-to-server frame.
    ///
    /// Fragmentation is the caller's business: continuation fragments are
    /// built with [`Frame::new`] using `OpCode::Continuation` and an
    /// explicit `fin`.
    pub fn outbound(
        opcode: OpCode,
        payload: impl Into<BytesMut>,
        compress: bool,
        mask: bool,
    ) -> Self {
        let mut frame = Self {
            fin: true,
            opcode,
            mask: None,
            payload: payload.into(),
            is_compressed: compress && matches!(opcode, OpCode::Text | OpCode::Binary),
            rsv2: false,
            rsv3: false,
        };
        if mask {
            frame.mask();
        }
        frame
    }

    /// Creates a final unmasked text frame.
    pub fn text(payload: impl Into<BytesMut>) -> Self {
        Self::new(true, OpCode::Text, None, payload)
    }

    /// Creates a final unmasked binary frame.
    pub fn binary(payload: impl Into<BytesMut>) -> Self {
        Self::new(true, OpCode::Binary, None, payload)
    }

    /// Creates a ping frame. The payload must not exceed 125 bytes.
    pub fn ping(payload: impl Into<BytesMut>) -> Self {
        let payload = payload.into();
        debug_assert!(payload.len() <= 125);
        Self::new(true, OpCode::Ping, None, payload)
    }

    /// Creates a pong frame. The payload must not exceed 125 bytes.
    pub fn pong(payload: impl Into<BytesMut>) -> Self {
        let payload = payload.into();
        debug_assert!(payload.len() <= 125);
        Self::new(true, OpCode::Pong, None, payload)
    }

    /// Creates a close frame carrying a status code and a reason.
    ///
    /// The reason must fit the 123 bytes a control frame has left after the
    /// two code bytes.
    pub fn close(code: CloseCode, reason: impl AsRef<[u8]>) -> Self {
        let reason = reason.as_ref();
        debug_assert!(reason.len() <= 123);
        let mut payload = BytesMut::with_capacity(2 + reason.len());
        payload.extend_from_slice(&u16::from(code).to_be_bytes());
        payload.extend_from_slice(reason);
        Self::new(true, OpCode::Close, None, payload)
    }

    /// Creates a close frame with a raw payload, without enforcing the
    /// code/reason structure.
    pub fn close_raw(payload: impl Into<BytesMut>) -> Self {
        Self::new(true, OpCode::Close, None, payload)
    }

    /// Extracts the close code from a close frame's payload, if present.
    pub fn close_code(&self) -> Option<CloseCode> {
        let code = u16::from_be_bytes(self.payload.get(0..2)?.try_into().ok()?);
        Some(CloseCode::from(code))
    }

    /// Returns whether a masking key is present.
    #[inline(always)]
    pub fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    /// The 4-byte masking key, if any.
    #[inline(always)]
    pub fn masking_key(&self) -> Option<[u8; 4]> {
        self.mask
    }

    /// Whether the RSV1 (compression) bit is set.
    #[inline(always)]
    pub fn is_compressed(&self) -> bool {
        self.is_compressed
    }

    /// Whether the RSV2 bit is set.
    #[inline(always)]
    pub fn rsv2(&self) -> bool {
        self.rsv2
    }

    /// Whether the RSV3 bit is set.
    #[inline(always)]
    pub fn rsv3(&self) -> bool {
        self.rsv3
    }

    /// Masks the payload in place.
    ///
    /// Uses the stored key if one is present; otherwise draws a fresh key
    /// from the thread-local CSPRNG and stores it.
    pub fn mask(&mut self) {
        let payload = &mut self.payload;
        if let Some(mask) = self.mask {
            crate::mask::apply_mask(payload, mask);
        } else {
            let mask: [u8; 4] = rand::random();
            crate::mask::apply_mask(payload, mask);
            self.mask = Some(mask);
        }
    }

    /// Unmasks the payload in place and discards the key.
    ///
    /// Masking is an XOR involution, so this is the same operation as
    /// [`Frame::mask`]. Idempotent: a frame without a key is left untouched.
    pub fn unmask(&mut self) {
        if let Some(mask) = self.mask.take() {
            crate::mask::apply_mask(&mut self.payload, mask);
        }
    }

    /// The 7-bit length field this frame serializes with: the exact payload
    /// length below 126, or the 126/127 escape announcing an extended field.
    pub fn length_code(&self) -> u8 {
        match self.payload.len() {
            len if len < 126 => len as u8,
            len if len < 65536 => 126,
            _ => 127,
        }
    }

    /// Width of the extended length field on the wire: 0, 2 or 8 bytes.
    pub fn extended_length_width(&self) -> usize {
        match self.length_code() {
            126 => 2,
            127 => 8,
            _ => 0,
        }
    }

    /// Total serialized size: 2 header bytes, extended length, masking key
    /// and payload.
    pub fn frame_len(&self) -> usize {
        let mask_len = if self.mask.is_some() { 4 } else { 0 };
        2 + self.extended_length_width() + mask_len + self.payload.len()
    }

    /// Formats the frame prefix (header bytes, extended length, masking
    /// key) into `head` and returns its size.
    ///
    /// # Panics
    ///
    /// Panics if `head` is shorter than [`MAX_HEAD_SIZE`].
    pub(crate) fn fmt_head(&self, head: &mut [u8]) -> usize {
        head[0] = (self.fin as u8) << 7
            | (self.is_compressed as u8) << 6
            | (self.rsv2 as u8) << 5
            | (self.rsv3 as u8) << 4
            | u8::from(self.opcode);

        let len = self.payload.len();
        let size = if len < 126 {
            head[1] = len as u8;
            2
        } else if len < 65536 {
            head[1] = 126;
            head[2..4].copy_from_slice(&(len as u16).to_be_bytes());
            4
        } else {
            head[1] = 127;
            head[2..10].copy_from_slice(&(len as u64).to_be_bytes());
            10
        };

        if let Some(mask) = self.mask {
            head[1] |= 0x80;
            head[size..size + 4].copy_from_slice(&mask);
            size + 4
        } else {
            size
        }
    }

    /// Serializes the frame to its full wire image.
    ///
    /// The returned buffer is the iterable byte sequence of the frame;
    /// `frame.to_bytes().iter()` walks it without further allocation.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MAX_HEAD_SIZE + self.payload.len());
        let mut head = [0u8; MAX_HEAD_SIZE];
        let head_len = self.fmt_head(&mut head);
        buf.extend_from_slice(&head[..head_len]);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }

    /// Assembles an inbound frame from its decoded stages.
    pub(crate) fn from_parts(
        header: &FrameHeader,
        mask: Option<[u8; 4]>,
        payload: BytesMut,
    ) -> Self {
        Self {
            fin: header.fin,
            opcode: header.opcode,
            mask,
            payload,
            is_compressed: header.rsv1,
            rsv2: header.rsv2,
            rsv3: header.rsv3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod opcode_tests {
        use super::*;

        #[test]
        fn control_and_data_split() {
            assert!(OpCode::Close.is_control());
            assert!(OpCode::Ping.is_control());
            assert!(OpCode::Pong.is_control());

            assert!(OpCode::Continuation.is_data());
            assert!(OpCode::Text.is_data());
            assert!(OpCode::Binary.is_data());
        }

        #[test]
        fn try_from_supported_nibbles() {
            assert_eq!(OpCode::try_from(0x0).unwrap(), OpCode::Continuation);
            assert_eq!(OpCode::try_from(0x1).unwrap(), OpCode::Text);
            assert_eq!(OpCode::try_from(0x2).unwrap(), OpCode::Binary);
            assert_eq!(OpCode::try_from(0x8).unwrap(), OpCode::Close);
            assert_eq!(OpCode::try_from(0x9).unwrap(), OpCode::Ping);
            assert_eq!(OpCode::try_from(0xA).unwrap(), OpCode::Pong);
        }

        #[test]
        fn try_from_reserved_nibbles() {
            for nibble in [0x3, 0x4, 0x5, 0x6, 0x7, 0xB, 0xC, 0xD, 0xE, 0xF] {
                match OpCode::try_from(nibble) {
                    Err(FrameError::InvalidOpCode(b)) => assert_eq!(b, nibble),
                    other => panic!("expected InvalidOpCode, got {other:?}"),
                }
            }
        }

        #[test]
        fn round_trips_through_u8() {
            for opcode in [
                OpCode::Continuation,
                OpCode::Text,
                OpCode::Binary,
                OpCode::Close,
                OpCode::Ping,
                OpCode::Pong,
            ] {
                assert_eq!(OpCode::try_from(u8::from(opcode)).unwrap(), opcode);
            }
        }
    }

    mod header_tests {
        use super::*;

        #[test]
        fn parses_unmasked_text_header() {
            let header = FrameHeader::parse([0x81, 0x05]).unwrap();
            assert!(header.fin);
            assert!(!header.rsv1 && !header.rsv2 && !header.rsv3);
            assert_eq!(header.opcode, OpCode::Text);
            assert!(!header.masked);
            assert_eq!(header.length_code, 5);
            assert_eq!(header.extended_length_width(), 0);
            assert_eq!(header.mask_width(), 0);
        }

        #[test]
        fn parses_masked_header() {
            let header = FrameHeader::parse([0x81, 0x85]).unwrap();
            assert!(header.masked);
            assert_eq!(header.length_code, 5);
            assert_eq!(header.mask_width(), 4);
        }

        #[test]
        fn announces_extended_length_widths() {
            let header = FrameHeader::parse([0x82, 0x7E]).unwrap();
            assert_eq!(header.length_code, 126);
            assert_eq!(header.extended_length_width(), 2);

            let header = FrameHeader::parse([0x82, 0x7F]).unwrap();
            assert_eq!(header.length_code, 127);
            assert_eq!(header.extended_length_width(), 8);
        }

        #[test]
        fn rejects_reserved_opcodes() {
            for nibble in [0x3u8, 0x4, 0x5, 0x6, 0x7, 0xB, 0xC, 0xD, 0xE, 0xF] {
                let result = FrameHeader::parse([0x80 | nibble, 0x00]);
                assert!(
                    matches!(result, Err(FrameError::InvalidOpCode(_))),
                    "nibble {nibble:#x}"
                );
            }
        }

        #[test]
        fn rejects_fragmented_control_frames() {
            for opcode in [0x8u8, 0x9, 0xA] {
                let result = FrameHeader::parse([opcode, 0x00]);
                assert!(
                    matches!(result, Err(FrameError::ControlFrameFragmented)),
                    "opcode {opcode:#x}"
                );
            }
        }

        #[test]
        fn rejects_oversized_control_frames() {
            // 126 and 127 in the length field already declare more than a
            // control frame may carry; the error fires before any extended
            // length byte exists.
            for length_code in [126u8, 127] {
                for opcode in [0x8u8, 0x9, 0xA] {
                    let result = FrameHeader::parse([0x80 | opcode, length_code]);
                    assert!(
                        matches!(result, Err(FrameError::ControlFrameTooLarge)),
                        "opcode {opcode:#x}, length {length_code}"
                    );
                }
            }
            // 125 is the limit, not beyond it.
            assert!(FrameHeader::parse([0x89, 125]).is_ok());
        }

        #[test]
        fn rejects_compression_bit_outside_data_frames() {
            // RSV1 on close, ping, pong and continuation.
            for opcode in [0x8u8, 0x9, 0xA, 0x0] {
                let result = FrameHeader::parse([0x80 | 0x40 | opcode, 0x00]);
                assert!(
                    matches!(result, Err(FrameError::CompressedNonDataFrame)),
                    "opcode {opcode:#x}"
                );
            }
            assert!(FrameHeader::parse([0xC1, 0x00]).is_ok());
            assert!(FrameHeader::parse([0xC2, 0x00]).is_ok());
        }

        #[test]
        fn carries_rsv2_and_rsv3() {
            let header = FrameHeader::parse([0x80 | 0x20 | 0x01, 0x00]).unwrap();
            assert!(header.rsv2 && !header.rsv3);

            let header = FrameHeader::parse([0x80 | 0x10 | 0x02, 0x00]).unwrap();
            assert!(header.rsv3 && !header.rsv2);
        }
    }

    mod frame_tests {
        use super::*;

        #[test]
        fn new_stores_parts_verbatim() {
            let frame = Frame::new(true, OpCode::Text, None, "Test payload");
            assert!(frame.fin);
            assert_eq!(frame.opcode, OpCode::Text);
            assert_eq!(frame.masking_key(), None);
            assert_eq!(&frame.payload[..], b"Test payload");
            assert!(!frame.is_compressed());
        }

        #[test]
        fn length_code_three_way_split() {
            for (len, code, ext) in [
                (0usize, 0u8, 0usize),
                (1, 1, 0),
                (125, 125, 0),
                (126, 126, 2),
                (127, 126, 2),
                (65535, 126, 2),
                (65536, 127, 8),
                (1_000_000, 127, 8),
            ] {
                let frame = Frame::binary(&vec![0u8; len][..]);
                assert_eq!(frame.length_code(), code, "len {len}");
                assert_eq!(frame.extended_length_width(), ext, "len {len}");
                assert_eq!(frame.frame_len(), 2 + ext + len, "len {len}");
                assert_eq!(frame.to_bytes().len(), frame.frame_len(), "len {len}");
            }
        }

        #[test]
        fn serialized_length_identity_with_mask() {
            let mut frame =
                Frame::new(true, OpCode::Binary, Some([1, 2, 3, 4]), &vec![0u8; 300][..]);
            frame.mask();
            assert_eq!(frame.frame_len(), 2 + 2 + 4 + 300);
            assert_eq!(frame.to_bytes().len(), frame.frame_len());
        }

        #[test]
        fn to_bytes_tiny_text() {
            let frame = Frame::text("Hello");
            assert_eq!(
                &frame.to_bytes()[..],
                &[0x81, 0x05, 0x48, 0x65, 0x6C, 0x6C, 0x6F]
            );
        }

        #[test]
        fn to_bytes_masked_text() {
            let mut frame = Frame::new(true, OpCode::Text, Some([0x37, 0xFA, 0x21, 0x3D]), "Hello");
            frame.mask();
            assert_eq!(
                &frame.to_bytes()[..],
                &[0x81, 0x85, 0x37, 0xFA, 0x21, 0x3D, 0x7F, 0x9F, 0x4D, 0x51, 0x58]
            );
        }

        #[test]
        fn to_bytes_extended_16() {
            let frame = Frame::binary(&vec![0xAA; 256][..]);
            let bytes = frame.to_bytes();
            assert_eq!(&bytes[..4], &[0x82, 0x7E, 0x01, 0x00]);
            assert_eq!(bytes.len(), 4 + 256);
            assert!(bytes[4..].iter().all(|&b| b == 0xAA));
        }

        #[test]
        fn to_bytes_extended_64() {
            let frame = Frame::binary(&vec![0x00; 65536][..]);
            let bytes = frame.to_bytes();
            assert_eq!(bytes[1], 0x7F);
            assert_eq!(&bytes[2..10], &65536u64.to_be_bytes());
            assert_eq!(bytes.len(), 10 + 65536);
        }

        #[test]
        fn mask_and_unmask_restore_payload() {
            let original = BytesMut::from(&b"Mask me"[..]);
            let mut frame = Frame::new(true, OpCode::Binary, Some([1, 2, 3, 4]), original.clone());

            frame.mask();
            assert_ne!(frame.payload, original);
            assert!(frame.is_masked());

            frame.unmask();
            assert_eq!(frame.payload, original);
            assert!(!frame.is_masked());
        }

        #[test]
        fn unmask_is_idempotent() {
            let mut frame = Frame::new(true, OpCode::Text, Some([9, 9, 9, 9]), "data");
            frame.mask();
            frame.unmask();
            let after_first = frame.payload.clone();
            frame.unmask();
            assert_eq!(frame.payload, after_first);
            assert_eq!(frame.masking_key(), None);
        }

        #[test]
        fn outbound_generates_a_key_when_masked() {
            let frame = Frame::outbound(OpCode::Text, "Hello", false, true);
            assert!(frame.fin);
            let key = frame.masking_key().expect("key generated");

            let mut payload = frame.payload.clone();
            crate::mask::apply_mask(&mut payload, key);
            assert_eq!(&payload[..], b"Hello");
        }

        #[test]
        fn outbound_compression_bit_only_on_data_frames() {
            assert!(Frame::outbound(OpCode::Text, "x", true, false).is_compressed());
            assert!(Frame::outbound(OpCode::Binary, "x", true, false).is_compressed());
            assert!(!Frame::outbound(OpCode::Ping, "x", true, false).is_compressed());
            assert!(!Frame::outbound(OpCode::Close, "", true, false).is_compressed());
            assert!(!Frame::outbound(OpCode::Continuation, "x", true, false).is_compressed());
        }

        #[test]
        fn compressed_text_sets_rsv1_on_the_wire() {
            let frame = Frame::outbound(OpCode::Text, "deflated", true, false);
            assert_eq!(frame.to_bytes()[0], 0xC1);
        }

        #[test]
        fn close_frame_payload_layout() {
            let frame = Frame::close(CloseCode::Normal, "bye");
            assert_eq!(frame.opcode, OpCode::Close);
            assert_eq!(&frame.payload[..2], &1000u16.to_be_bytes());
            assert_eq!(&frame.payload[2..], b"bye");
            assert_eq!(frame.close_code(), Some(CloseCode::Normal));
        }

        #[test]
        fn close_code_absent_on_short_payload() {
            assert_eq!(Frame::close_raw("").close_code(), None);
            assert_eq!(Frame::close_raw(&[0x03u8][..]).close_code(), None);
            assert_eq!(
                Frame::close_raw(&[0x03u8, 0xE8][..]).close_code(),
                Some(CloseCode::Normal)
            );
        }
    }
}
