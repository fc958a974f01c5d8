//! # Real-time Transport Protocol (RTP) depacketization
//!
//! This module turns interleaved RTP packets back into access units:
//!
//! - [`RtpHeader`]: a view of the fixed 12-byte RTP header
//! - [`Depacketize`]: the per-codec strategy deciding where the payload starts,
//!   whether a packet completes an access unit, and how NAL units are framed
//! - [`RtpParser`]: the per-channel reassembly buffer shared by all codecs
//!
//! ## Example: Reassembling a single NAL unit packet
//!
//! ```rust
//! use bytes::Bytes;
//! use rtspio::format::rtp::{DepacketizerKind, RtpParser};
//!
//! let mut parser = RtpParser::new(DepacketizerKind::H264, 1024);
//! let mut packet = vec![0x80, 0xe0, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 1];
//! packet.extend_from_slice(&[0x65, 0x88, 0x84]); // IDR slice
//!
//! let units = parser.push(Bytes::from(packet));
//! assert_eq!(units.len(), 1);
//! assert_eq!(&units[0][..], &[0x65, 0x88, 0x84]);
//! ```

use thiserror::Error;

mod depacketizer;
mod h264;
mod h265;

pub use depacketizer::{
    Depacketize, DepacketizerKind, DepacketizerRegistry, MarkerDepacketizer,
    PassThroughDepacketizer, RtpParser, SplitPacket,
};
pub use h264::H264Depacketizer;
pub use h265::HevcDepacketizer;

/// Length of the fixed RTP header.
pub const RTP_HEADER_LEN: usize = 12;

/// Errors that can occur while reading RTP headers
#[derive(Debug, Error)]
pub enum RtpError {
    /// The packet data is malformed or incomplete
    #[error("Invalid RTP packet")]
    InvalidPacket,
}

/// Specialized Result type for RTP operations
pub type Result<T> = std::result::Result<T, RtpError>;

/// The fixed part of an RTP header.
///
/// CSRC lists and header extensions are not interpreted; depacketizers treat
/// everything after byte 12 as payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    /// RTP version (should be 2)
    pub version: u8,
    /// Padding flag
    pub padding: bool,
    /// Header extension flag
    pub extension: bool,
    /// CSRC count
    pub csrc_count: u8,
    /// Marker bit
    pub marker: bool,
    /// Payload type identifier
    pub payload_type: u8,
    /// Packet sequence number
    pub sequence_number: u16,
    /// Media timestamp
    pub timestamp: u32,
    /// Synchronization source identifier
    pub ssrc: u32,
}

impl RtpHeader {
    /// Parses the fixed header from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns `RtpError::InvalidPacket` if the packet is shorter than 12 bytes
    /// or the version is not 2.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < RTP_HEADER_LEN {
            return Err(RtpError::InvalidPacket);
        }

        let first_byte = data[0];
        let second_byte = data[1];

        let version = (first_byte >> 6) & 0x03;
        if version != 2 {
            return Err(RtpError::InvalidPacket);
        }

        Ok(Self {
            version,
            padding: (first_byte & 0x20) != 0,
            extension: (first_byte & 0x10) != 0,
            csrc_count: first_byte & 0x0f,
            marker: (second_byte & 0x80) != 0,
            payload_type: second_byte & 0x7f,
            sequence_number: u16::from_be_bytes([data[2], data[3]]),
            timestamp: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            ssrc: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
        })
    }
}
