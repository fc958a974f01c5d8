//! H.264 payload format (RFC 6184).

use bytes::{BufMut, Bytes, BytesMut};

use super::depacketizer::{split_at, Depacketize, SplitPacket};
use super::RTP_HEADER_LEN;

const SINGLE_NAL: u8 = 1;
const STAP_A: u8 = 24;
const STAP_B: u8 = 25;
const MTAP16: u8 = 26;
const MTAP24: u8 = 27;
const FU_A: u8 = 28;
const FU_B: u8 = 29;

/// Single NAL unit, aggregation (STAP/MTAP) and fragmentation (FU) packets.
#[derive(Debug, Default, Clone, Copy)]
pub struct H264Depacketizer;

impl Depacketize for H264Depacketizer {
    fn split_header(&self, packet: Bytes) -> SplitPacket {
        if packet.len() < RTP_HEADER_LEN + 1 {
            return split_at(packet, 0, true);
        }

        let indicator = packet[RTP_HEADER_LEN];
        let mut nal_type = indicator & 0x1f;
        if (2..=23).contains(&nal_type) {
            nal_type = SINGLE_NAL;
        }

        match nal_type {
            STAP_A => split_at(packet, 1, true),
            // type byte plus the 16-bit decoding order number
            STAP_B | MTAP16 | MTAP24 => split_at(packet, 3, true),
            FU_A | FU_B => {
                if packet.len() < RTP_HEADER_LEN + 2 {
                    return split_at(packet, 1, false);
                }
                let fu_header = packet[RTP_HEADER_LEN + 1];
                let start = fu_header & 0x80 != 0;
                let end = fu_header & 0x40 != 0;
                if !start {
                    return split_at(packet, 2, end);
                }

                // original NAL header: F+NRI from the indicator, type from the FU header
                let nal_header = (indicator & 0xe0) | (fu_header & 0x1f);
                let mut payload = BytesMut::with_capacity(packet.len() - RTP_HEADER_LEN - 1);
                payload.put_u8(nal_header);
                payload.extend_from_slice(&packet[RTP_HEADER_LEN + 2..]);
                SplitPacket {
                    complete: end,
                    header: packet.slice(..RTP_HEADER_LEN + 1),
                    payload: payload.freeze(),
                }
            }
            _ => split_at(packet, 0, true),
        }
    }

    fn parse_nalu(&self, header: &[u8], payload: &[u8]) -> (usize, usize) {
        if header.len() <= RTP_HEADER_LEN {
            return (0, payload.len());
        }

        let prefix = match header[RTP_HEADER_LEN] & 0x1f {
            STAP_A | STAP_B => 2,
            // size, DOND, 16-bit timestamp offset
            MTAP16 => 5,
            // size, DOND, 24-bit timestamp offset
            MTAP24 => 6,
            _ => return (0, payload.len()),
        };

        if payload.len() < 2 {
            return (prefix, 0);
        }
        let size = u16::from_be_bytes([payload[0], payload[1]]) as usize;
        (prefix, size)
    }
}
