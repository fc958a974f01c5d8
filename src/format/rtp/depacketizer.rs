use bytes::{Bytes, BytesMut};
use log::warn;
use std::collections::HashMap;
use std::fmt;

use super::h264::H264Depacketizer;
use super::h265::HevcDepacketizer;
use super::{RtpHeader, RTP_HEADER_LEN};

/// An RTP packet cut at its header/payload boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPacket {
    /// This packet carries the last fragment of the current access unit
    pub complete: bool,
    /// RTP header plus any payload-format header bytes that were skipped
    pub header: Bytes,
    /// The remaining payload, with a rebuilt NAL header on fragment starts
    pub payload: Bytes,
}

/// Per-codec depacketization strategy.
pub trait Depacketize: Send + Sync + fmt::Debug {
    /// Splits `packet` into header and payload and reports completeness.
    fn split_header(&self, packet: Bytes) -> SplitPacket;

    /// Returns `(nalu_header_size, nalu_size)` for the first NAL unit in `payload`.
    ///
    /// The NAL bytes are `payload[nalu_header_size..nalu_header_size + nalu_size]`,
    /// clamped to the payload.
    fn parse_nalu(&self, _header: &[u8], payload: &[u8]) -> (usize, usize) {
        (0, payload.len())
    }
}

/// Cuts `packet` after the RTP header plus `skip` payload bytes.
pub(crate) fn split_at(packet: Bytes, skip: usize, complete: bool) -> SplitPacket {
    let boundary = (RTP_HEADER_LEN + skip).min(packet.len());
    let mut payload = packet;
    let header = payload.split_to(boundary);
    SplitPacket {
        complete,
        header,
        payload,
    }
}

/// Every packet is a complete unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughDepacketizer;

impl Depacketize for PassThroughDepacketizer {
    fn split_header(&self, packet: Bytes) -> SplitPacket {
        split_at(packet, 0, true)
    }
}

/// A unit ends on the packet with the RTP marker bit set.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerDepacketizer;

impl Depacketize for MarkerDepacketizer {
    fn split_header(&self, packet: Bytes) -> SplitPacket {
        let complete = RtpHeader::parse(&packet).map_or(true, |header| header.marker);
        split_at(packet, 0, complete)
    }
}

/// Tag of a depacketization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepacketizerKind {
    /// H.264 (RFC 6184)
    H264,
    /// H.265 (RFC 7798)
    Hevc,
    /// Marker-bit delimited units
    Marker,
    /// One packet, one unit
    PassThrough,
}

impl DepacketizerKind {
    /// The stateless strategy behind this tag.
    pub fn strategy(self) -> &'static dyn Depacketize {
        match self {
            DepacketizerKind::H264 => &H264Depacketizer,
            DepacketizerKind::Hevc => &HevcDepacketizer,
            DepacketizerKind::Marker => &MarkerDepacketizer,
            DepacketizerKind::PassThrough => &PassThroughDepacketizer,
        }
    }
}

/// Maps SDP codec names to depacketizers.
///
/// Names are matched case-insensitively; unknown names resolve to
/// [`DepacketizerKind::PassThrough`].
#[derive(Debug, Clone)]
pub struct DepacketizerRegistry {
    kinds: HashMap<String, DepacketizerKind>,
}

impl Default for DepacketizerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("H264", DepacketizerKind::H264)
            .register("H265", DepacketizerKind::Hevc)
            .register("HEVC", DepacketizerKind::Hevc)
            .register("bbw", DepacketizerKind::Marker);
        registry
    }
}

impl DepacketizerRegistry {
    /// A registry where every codec is passed through.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Maps `codec_name` to `kind`, replacing any previous mapping.
    pub fn register(&mut self, codec_name: &str, kind: DepacketizerKind) -> &mut Self {
        self.kinds.insert(codec_name.to_ascii_uppercase(), kind);
        self
    }

    /// Resolves a codec name.
    pub fn resolve(&self, codec_name: &str) -> DepacketizerKind {
        self.kinds
            .get(&codec_name.to_ascii_uppercase())
            .copied()
            .unwrap_or(DepacketizerKind::PassThrough)
    }
}

/// Reassembles the packets of one RTP channel into access units.
#[derive(Debug)]
pub struct RtpParser {
    kind: DepacketizerKind,
    buffer: BytesMut,
    max_frame_size: usize,
    overflows: u64,
}

impl RtpParser {
    /// Creates a parser that never holds more than `max_frame_size` bytes.
    pub fn new(kind: DepacketizerKind, max_frame_size: usize) -> Self {
        Self {
            kind,
            buffer: BytesMut::new(),
            max_frame_size,
            overflows: 0,
        }
    }

    /// The strategy in use.
    pub fn kind(&self) -> DepacketizerKind {
        self.kind
    }

    /// Bytes accumulated towards the current access unit.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// How many times the buffer had to be flushed early.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Feeds one RTP packet (without the interleaved header).
    ///
    /// Returns the access units this packet finished, usually zero or one.
    /// Aggregation packets yield one unit per aggregated NAL unit.
    pub fn push(&mut self, packet: Bytes) -> Vec<Bytes> {
        let mut units = Vec::new();
        if packet.len() < RTP_HEADER_LEN {
            warn!("dropping short rtp packet ({} bytes)", packet.len());
            return units;
        }

        let strategy = self.kind.strategy();
        let split = strategy.split_header(packet);
        let mut rest = split.payload;

        loop {
            let (header_size, nalu_size) = strategy.parse_nalu(&split.header, &rest);
            let start = header_size.min(rest.len());
            let end = start.saturating_add(nalu_size).min(rest.len());
            self.append(rest.slice(start..end), &mut units);

            if header_size == 0 || end >= rest.len() {
                break;
            }
            // another aggregated unit follows
            if !self.buffer.is_empty() {
                units.push(self.flush());
            }
            rest = rest.slice(end..);
        }

        if split.complete && !self.buffer.is_empty() {
            units.push(self.flush());
        }
        units
    }

    fn append(&mut self, nalu: Bytes, units: &mut Vec<Bytes>) {
        if self.buffer.len() + nalu.len() > self.max_frame_size {
            warn!(
                "payload too long: {} + {} exceeds {}",
                self.buffer.len(),
                nalu.len(),
                self.max_frame_size
            );
            self.overflows += 1;
            if !self.buffer.is_empty() {
                units.push(self.flush());
            }
            if nalu.len() < self.max_frame_size {
                self.buffer.extend_from_slice(&nalu);
            } else {
                warn!("dropping {} byte nal unit", nalu.len());
            }
            return;
        }

        self.buffer.extend_from_slice(&nalu);
    }

    fn flush(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }
}
