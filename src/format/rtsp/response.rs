use bytes::Bytes;
use log::debug;

use super::auth::{AuthChallenge, AuthScheme};
use crate::{Result, RtspError};

const HEADER_END: &[u8] = b"\r\n\r\n";
const STATUS_OFFSET: usize = "RTSP/1.0 ".len();

/// The parts of an RTSP response the session acts on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtspResponseContext {
    /// Numeric status code
    pub status: u16,
    /// Declared `Content-Length`
    pub content_length: usize,
    /// Body, empty when fewer than `content_length` bytes arrived
    pub content: Bytes,
    /// `Session` header without its `;timeout=` parameter
    pub session_id: Option<String>,
    /// Digest challenge if offered, otherwise Basic
    pub challenge: Option<AuthChallenge>,
}

impl RtspResponseContext {
    /// True for a 200 status.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The body as text.
    pub fn content_str(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Returns true if `data` starts with the RTSP signature.
pub fn is_rtsp_message(data: &[u8]) -> bool {
    data.len() >= 4 && (&data[..4] == b"RTSP" || &data[..4] == b"rtsp")
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(HEADER_END.len())
        .position(|w| w == HEADER_END)
        .map(|pos| pos + HEADER_END.len())
}

/// Parses one complete response: header block plus declared body.
pub fn parse_response(data: &[u8]) -> Result<RtspResponseContext> {
    if !is_rtsp_message(data) {
        return Err(RtspError::Parser("not rtsp packet".into()));
    }
    let header_end =
        find_header_end(data).ok_or_else(|| RtspError::Parser("no eof flag".into()))?;
    if header_end < STATUS_OFFSET + 3 {
        return Err(RtspError::Parser("truncated status line".into()));
    }

    let status = std::str::from_utf8(&data[STATUS_OFFSET..STATUS_OFFSET + 3])
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| RtspError::Parser("invalid response status".into()))?;

    let mut context = RtspResponseContext {
        status,
        ..Default::default()
    };

    let headers = String::from_utf8_lossy(&data[..header_end]);
    for line in headers.lines().skip(1) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("Content-Length") {
            context.content_length = value.parse().unwrap_or(0);
        } else if key.eq_ignore_ascii_case("Session") {
            let id = value.split(';').next().unwrap_or_default().trim();
            context.session_id = Some(id.to_string());
        } else if key.eq_ignore_ascii_case("WWW-Authenticate") {
            let Some(challenge) = AuthChallenge::parse(value) else {
                debug!("ignoring auth challenge: {}", value);
                continue;
            };
            let keep_existing = matches!(
                &context.challenge,
                Some(existing) if existing.scheme == AuthScheme::Digest
            );
            if !keep_existing {
                context.challenge = Some(challenge);
            }
        }
    }

    if data.len() - header_end >= context.content_length {
        context.content =
            Bytes::copy_from_slice(&data[header_end..header_end + context.content_length]);
    }

    Ok(context)
}

/// `Content-Length` of a response header block, 0 when absent or unparseable.
pub fn content_length(data: &[u8]) -> usize {
    parse_response(data)
        .map(|context| context.content_length)
        .unwrap_or(0)
}
