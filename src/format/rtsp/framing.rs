use log::warn;

use super::response::{content_length, is_rtsp_message};
use crate::net::framing::{FrameHeader, FramingStrategy, InterleavedFraming, INTERLEAVED_HEADER_LEN};

/// Framing of an RTSP-over-TCP connection: interleaved `$` records mixed with
/// textual responses (header block up to a blank line, then `Content-Length`
/// bytes of body).
#[derive(Debug, Default, Clone)]
pub struct RtspFraming;

impl FramingStrategy for RtspFraming {
    fn header_len(&self) -> usize {
        INTERLEAVED_HEADER_LEN
    }

    fn parse_header(&mut self, header: &[u8]) -> FrameHeader {
        if let Some((_, len)) = InterleavedFraming::decode(header) {
            FrameHeader::Length(len)
        } else if is_rtsp_message(header) {
            FrameHeader::Delimiter(b"\r\n\r\n")
        } else {
            warn!("header error: {:02x?}", header);
            FrameHeader::Unframed
        }
    }

    fn content_length(&self, message: &[u8]) -> usize {
        if !is_rtsp_message(message) {
            return 0;
        }
        content_length(message)
    }
}
