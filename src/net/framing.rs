//! Stream framing strategies.
//!
//! A [`FramingStrategy`] tells a [`FramedConnection`](super::FramedConnection)
//! how to cut a byte stream into messages: it sees a fixed-size header first,
//! decides how the body is delimited, and may finally ask for a declared
//! content segment after the body.

use bytes::Bytes;
use log::warn;

/// Marker byte that opens an interleaved binary record.
pub const INTERLEAVED_MAGIC: u8 = b'$';
/// Length of an interleaved record header: magic, channel, u16 length.
pub const INTERLEAVED_HEADER_LEN: usize = 4;

/// How the body following a header is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHeader {
    /// The body is exactly this many bytes.
    Length(usize),
    /// The body runs up to and including this byte sequence.
    Delimiter(&'static [u8]),
    /// No body: the header plus whatever is already buffered is the message.
    Unframed,
}

/// Splits a byte stream into discrete messages.
pub trait FramingStrategy: Send {
    /// Resets any per-connection state. Called once before the first read.
    fn init(&mut self) {}

    /// Number of bytes read before [`parse_header`](Self::parse_header) is consulted.
    fn header_len(&self) -> usize;

    /// Interprets a header of exactly [`header_len`](Self::header_len) bytes.
    fn parse_header(&mut self, header: &[u8]) -> FrameHeader;

    /// Optional bytes written ahead of each outbound message.
    fn serialize_header(&self, _msg: &[u8]) -> Option<Bytes> {
        None
    }

    /// Size of a trailing content segment to read after header and body.
    fn content_length(&self, _message: &[u8]) -> usize {
        0
    }
}

/// Reads `'$' channel len:u16be payload` records.
#[derive(Debug, Default, Clone)]
pub struct InterleavedFraming;

impl InterleavedFraming {
    /// Decodes an interleaved header into `(channel, payload length)`.
    pub fn decode(header: &[u8]) -> Option<(u8, usize)> {
        if header.len() < INTERLEAVED_HEADER_LEN || header[0] != INTERLEAVED_MAGIC {
            return None;
        }
        let len = u16::from_be_bytes([header[2], header[3]]) as usize;
        Some((header[1], len))
    }
}

impl FramingStrategy for InterleavedFraming {
    fn header_len(&self) -> usize {
        INTERLEAVED_HEADER_LEN
    }

    fn parse_header(&mut self, header: &[u8]) -> FrameHeader {
        match Self::decode(header) {
            Some((_, len)) => FrameHeader::Length(len),
            None => {
                warn!("not an interleaved header: {:02x?}", header);
                FrameHeader::Unframed
            }
        }
    }
}

/// Pass-through framing: each read delivers whatever has arrived.
#[derive(Debug, Clone)]
pub struct RawFraming {
    header_len: usize,
}

impl RawFraming {
    /// Creates a raw framing that reads at least `header_len` bytes per message.
    pub fn new(header_len: usize) -> Self {
        Self {
            header_len: header_len.max(1),
        }
    }
}

impl Default for RawFraming {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FramingStrategy for RawFraming {
    fn header_len(&self) -> usize {
        self.header_len
    }

    fn parse_header(&mut self, _header: &[u8]) -> FrameHeader {
        FrameHeader::Unframed
    }
}
