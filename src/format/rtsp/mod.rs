//! # Real Time Streaming Protocol (RTSP) client
//!
//! An RTSP-over-TCP client that negotiates a presentation and receives its
//! media interleaved on the control connection:
//!
//! - [`RtspSession`]: runs DESCRIBE, the optional 401 retry, one SETUP per
//!   track and PLAY, then demultiplexes interleaved RTP to per-channel
//!   depacketizers
//! - [`SessionHandler`]: receives reassembled access units and lifecycle
//!   events; [`ChannelHandler`] forwards both to tokio channels
//! - [`parse_response`], [`parse_sdp`], [`Authenticator`] and [`RtspUrl`]:
//!   the protocol pieces the session is built from, usable on their own
//!
//! ## Example: Parsing a DESCRIBE body
//!
//! ```rust
//! use rtspio::format::rtsp::parse_sdp;
//!
//! let sdp = "v=0\r\nm=video 0 RTP/AVP 96\r\na=rtpmap:96 H264/90000\r\na=control:trackID=1\r\n";
//! let info = parse_sdp(sdp).unwrap();
//! assert_eq!(info.medias[0].codec_name, "H264");
//! assert_eq!(info.medias[0].clock_rate, Some(90000));
//! ```

mod auth;
mod client;
mod framing;
mod request;
mod response;
mod sdp;
mod stream;
mod url;

pub use auth::{AuthChallenge, AuthScheme, Authenticator};
pub use client::{
    ChannelHandler, MediaData, RequestTicket, RtspSession, SessionEvent, SessionHandler,
    SessionState, Track,
};
pub use framing::RtspFraming;
pub use request::RequestContext;
pub use response::{content_length, is_rtsp_message, parse_response, RtspResponseContext};
pub use sdp::{parse_sdp, static_payload_info, MediaSubsession, SdpInfo};
pub use stream::{ChannelStatistics, UnitTiming};
pub use self::url::{RtspUrl, DEFAULT_RTSP_PORT};
