use thiserror::Error;

/// Errors returned by connections, parsers and sessions.
#[derive(Error, Debug)]
pub enum RtspError {
    /// Socket level failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Dial, read or write failure, including an expired read deadline
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured response timeout
    #[error("recv response time out")]
    Timeout,

    /// The connection went away while a response was awaited
    #[error("rtsp connection disconnect")]
    Disconnected,

    /// Non-200 status, missing challenge or misuse of the session
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Unparseable response or URL
    #[error("parser error: {0}")]
    Parser(String),

    /// Undecodable or empty session description
    #[error("invalid sdp: {0}")]
    Sdp(String),

    /// Another request is still waiting for its reply
    #[error("waiting last request reply")]
    Busy,

    /// A framed message exceeded the configured bound
    #[error("the stream data is too long: {0} bytes")]
    MessageTooLong(usize),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RtspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let io: RtspError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(io, RtspError::Io(_)));
        assert_eq!(io.to_string(), "io error: pipe");
        assert_eq!(RtspError::Busy.to_string(), "waiting last request reply");
        assert_eq!(
            RtspError::MessageTooLong(70000).to_string(),
            "the stream data is too long: 70000 bytes"
        );
    }
}
