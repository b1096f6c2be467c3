//! # wsframe
//!
//! A frame codec for the WebSocket protocol ([RFC 6455]), covering the wire
//! layer of an endpoint: parsing an incoming byte stream into discrete
//! [`Frame`]s, serializing outgoing frames back into bytes, applying and
//! reversing payload masking, and validating the protocol header with errors
//! that map onto RFC close codes.
//!
//! The crate deliberately stops at the frame boundary. Message reassembly
//! from continuation frames, the HTTP upgrade handshake, permessage-deflate
//! compression and the connection state machine are the business of the
//! surrounding endpoint; they consume this codec through the types exported
//! here.
//!
//! ## Reading frames
//!
//! Two invocation modes are provided:
//!
//! - [`FrameReader`] performs staged blocking reads over any
//!   [`std::io::Read`] source: header, extended length, masking key and
//!   payload are consumed strictly in order, and large payloads are
//!   accumulated in bounded chunks.
//! - [`codec::Decoder`] implements [`tokio_util::codec::Decoder`], driving
//!   the same stages as a resumable state machine over a byte buffer. It
//!   composes with `Framed`/`FramedRead` for asynchronous transports.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use wsframe::FrameReader;
//!
//! # fn main() -> wsframe::Result<()> {
//! let sock = TcpStream::connect("127.0.0.1:9001")?;
//! let mut reader = FrameReader::new(sock);
//! let mut frame = reader.read_frame()?;
//! frame.unmask();
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing frames
//!
//! [`Frame::to_bytes`] produces the full wire image of a frame;
//! [`FrameWriter`] writes it to any [`std::io::Write`] sink, chunking large
//! payloads; [`codec::Encoder`] does the same into a `BytesMut` for framed
//! async transports.
//!
//! [RFC 6455]: https://datatracker.ietf.org/doc/html/rfc6455

pub mod close;
pub mod codec;
pub mod dump;
pub mod frame;
mod mask;
pub mod reader;

pub use close::CloseCode;
pub use dump::bit_dump;
pub use frame::{Frame, FrameHeader, OpCode};
pub use reader::{FrameReader, FrameWriter};

use thiserror::Error;

/// A result type for codec operations, using [`FrameError`] as the error type.
pub type Result<T> = std::result::Result<T, FrameError>;

/// The default ceiling on a single frame's payload, set to 1 MiB.
///
/// Frames declaring a larger payload are rejected before any payload byte is
/// read, so a peer cannot force a large allocation with a short header. Both
/// [`FrameReader`] and [`codec::Decoder`] accept a different cap at
/// construction time; the architectural maximum is `2^63 - 1` regardless, as
/// the wire format reserves the top bit of the 64-bit length.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024;

/// Slice size for chunked payload reads and writes.
///
/// Payloads announced with the 64-bit length form are transferred in slices
/// of this many bytes, bounding intermediate buffers and giving stream-backed
/// sources a progress point per slice.
pub(crate) const PAYLOAD_CHUNK: usize = 1024;

/// Errors produced while parsing or serializing WebSocket frames.
///
/// Protocol violations carry an RFC 6455 close code, available through
/// [`FrameError::close_code`], which the surrounding endpoint echoes in the
/// Close frame it sends before dropping the transport. Truncation and I/O
/// errors are local-fatal and carry no close code.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The byte source ended before the two mandatory header bytes arrived.
    #[error("incomplete frame header")]
    IncompleteHeader,

    /// A stage after the header (extended length, masking key or payload)
    /// did not receive its required byte count.
    #[error("incomplete frame")]
    IncompleteFrame,

    /// The opcode nibble is not one of the six values RFC 6455 defines.
    /// Reserved opcodes (0x3-0x7 and 0xB-0xF) land here.
    #[error("invalid opcode (byte={0:#x})")]
    InvalidOpCode(u8),

    /// A control frame (close, ping or pong) arrived with the FIN bit clear.
    /// Control frames must not be fragmented.
    #[error("control frame must not be fragmented")]
    ControlFrameFragmented,

    /// A control frame declared a payload longer than 125 bytes.
    #[error("control frame payload exceeds 125 bytes")]
    ControlFrameTooLarge,

    /// The RSV1 (compression) bit was set on a frame that is not a text or
    /// binary frame. Only initial data frames may carry the bit.
    #[error("compression bit set on non-data frame")]
    CompressedNonDataFrame,

    /// A 64-bit extended length had its most significant bit set, which the
    /// wire format forbids.
    #[error("payload length exceeds 2^63 - 1")]
    PayloadLengthOverflow,

    /// The declared payload length exceeds the configured cap.
    #[error("payload of {0} bytes exceeds the configured maximum")]
    PayloadTooLarge(u64),

    /// An error propagated from the underlying byte source or sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// The RFC 6455 close code this error maps onto, if any.
    ///
    /// Well-formedness violations map to [`CloseCode::ProtocolError`]
    /// (1002), an over-long payload to [`CloseCode::MessageTooBig`] (1009).
    /// Truncation and source errors return `None`; there is no meaningful
    /// code to send a peer that has already gone away.
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            FrameError::InvalidOpCode(_)
            | FrameError::ControlFrameFragmented
            | FrameError::ControlFrameTooLarge
            | FrameError::CompressedNonDataFrame
            | FrameError::PayloadLengthOverflow => Some(CloseCode::ProtocolError),
            FrameError::PayloadTooLarge(_) => Some(CloseCode::MessageTooBig),
            FrameError::IncompleteHeader
            | FrameError::IncompleteFrame
            | FrameError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_map_to_1002() {
        for err in [
            FrameError::InvalidOpCode(0xB),
            FrameError::ControlFrameFragmented,
            FrameError::ControlFrameTooLarge,
            FrameError::CompressedNonDataFrame,
            FrameError::PayloadLengthOverflow,
        ] {
            assert_eq!(err.close_code(), Some(CloseCode::ProtocolError));
            assert_eq!(u16::from(err.close_code().unwrap()), 1002);
        }
    }

    #[test]
    fn too_big_maps_to_1009() {
        let err = FrameError::PayloadTooLarge(1 << 32);
        assert_eq!(err.close_code(), Some(CloseCode::MessageTooBig));
        assert_eq!(u16::from(err.close_code().unwrap()), 1009);
    }

    #[test]
    fn local_errors_carry_no_close_code() {
        assert_eq!(FrameError::IncompleteHeader.close_code(), None);
        assert_eq!(FrameError::IncompleteFrame.close_code(), None);
        let io = FrameError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        assert_eq!(io.close_code(), None);
    }
}
