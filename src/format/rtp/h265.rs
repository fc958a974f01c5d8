//! H.265/HEVC payload format (RFC 7798). DONL fields are not modeled.

use bytes::{BufMut, Bytes, BytesMut};

use super::depacketizer::{split_at, Depacketize, SplitPacket};
use super::RTP_HEADER_LEN;

const AGGREGATION_PACKET: u8 = 48;
const FRAGMENTATION_UNIT: u8 = 49;

fn nal_type(first_byte: u8) -> u8 {
    (first_byte & 0x7e) >> 1
}

/// Single NAL unit, aggregation (AP) and fragmentation (FU) packets.
#[derive(Debug, Default, Clone, Copy)]
pub struct HevcDepacketizer;

impl Depacketize for HevcDepacketizer {
    fn split_header(&self, packet: Bytes) -> SplitPacket {
        if packet.len() < RTP_HEADER_LEN + 2 {
            return split_at(packet, 0, false);
        }

        match nal_type(packet[RTP_HEADER_LEN]) {
            // 2-byte payload header
            AGGREGATION_PACKET => split_at(packet, 2, true),
            FRAGMENTATION_UNIT => {
                if packet.len() < RTP_HEADER_LEN + 3 {
                    return split_at(packet, 2, false);
                }
                let fu_header = packet[RTP_HEADER_LEN + 2];
                let start = fu_header & 0x80 != 0;
                let end = fu_header & 0x40 != 0;
                if !start {
                    return split_at(packet, 3, end);
                }

                // keep F and the top layer-id bit, take the type from the FU header
                let fu_type = fu_header & 0x3f;
                let first = (packet[RTP_HEADER_LEN] & 0x81) | (fu_type << 1);
                let second = packet[RTP_HEADER_LEN + 1];
                let mut payload = BytesMut::with_capacity(packet.len() - RTP_HEADER_LEN - 1);
                payload.put_u8(first);
                payload.put_u8(second);
                payload.extend_from_slice(&packet[RTP_HEADER_LEN + 3..]);
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
        if header.len() < RTP_HEADER_LEN + 2 || nal_type(header[RTP_HEADER_LEN]) != AGGREGATION_PACKET
        {
            return (0, payload.len());
        }
        if payload.len() < 2 {
            return (2, 0);
        }
        let size = u16::from_be_bytes([payload[0], payload[1]]) as usize;
        (2, size)
    }
}
