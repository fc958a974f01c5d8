/// RTP fixed header and per-codec depacketizers
pub mod rtp;

/// RTSP session, request builders and response/SDP parsers
pub mod rtsp;

pub use self::rtp::{DepacketizerKind, DepacketizerRegistry, RtpParser};
pub use self::rtsp::{ChannelHandler, RtspSession, SessionEvent, SessionHandler};
