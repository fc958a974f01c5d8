use std::fmt::Write as _;

use super::auth::Authenticator;
use crate::config::SessionConfig;

/// Per-session state that goes into every request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request URI of the presentation, without credentials
    pub url: String,
    /// `User-agent` value
    pub user_agent: String,
    /// Empty until the first SETUP reply
    pub session_id: String,
    /// Raw lines appended to SETUP
    pub setup_headers: Vec<String>,
    /// CSeq of the next request
    pub cseq: u32,
    /// bps, 0 omits the header
    pub bandwidth: u32,
    /// Set after a 401 challenge
    pub authenticator: Option<Authenticator>,
}

impl RequestContext {
    /// An empty context carrying the agent, bandwidth and SETUP lines of `config`.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            url: String::new(),
            user_agent: config.user_agent.clone(),
            session_id: String::new(),
            setup_headers: config.extra_setup_headers.clone(),
            cseq: 1,
            bandwidth: config.bandwidth,
            authenticator: None,
        }
    }

    /// Moves to the next CSeq; called once per request sent.
    pub fn advance(&mut self) {
        self.cseq = self.cseq.wrapping_add(1);
    }

    fn start(&self, method: &str, uri: &str) -> String {
        let mut request = String::with_capacity(256);
        let _ = write!(request, "{} {} RTSP/1.0\r\nCSeq: {}\r\n", method, uri, self.cseq);
        request
    }

    fn session(&self, request: &mut String) {
        if !self.session_id.is_empty() {
            let _ = write!(request, "Session: {}\r\n", self.session_id);
        }
    }

    fn user_agent(&self, request: &mut String) {
        let _ = write!(request, "User-agent: {}\r\n", self.user_agent);
    }

    fn bandwidth(&self, request: &mut String) {
        if self.bandwidth != 0 {
            let _ = write!(request, "Bandwidth: {}\r\n", self.bandwidth);
        }
    }

    fn authorization(&self, request: &mut String, method: &str, uri: &str) {
        if let Some(auth) = &self.authenticator {
            request.push_str(&auth.header(method, uri));
        }
    }

    fn finish(mut request: String) -> String {
        request.push_str("\r\n");
        request
    }

    /// OPTIONS on the presentation.
    pub fn options(&self) -> String {
        let mut request = self.start("OPTIONS", &self.url);
        self.session(&mut request);
        self.user_agent(&mut request);
        self.authorization(&mut request, "OPTIONS", &self.url);
        Self::finish(request)
    }

    /// DESCRIBE asking for SDP.
    pub fn describe(&self) -> String {
        let mut request = self.start("DESCRIBE", &self.url);
        request.push_str("Accept: application/sdp\r\n");
        self.user_agent(&mut request);
        self.bandwidth(&mut request);
        self.authorization(&mut request, "DESCRIBE", &self.url);
        Self::finish(request)
    }

    /// SETUP of `track_url` over interleaved channels `rtp`/`rtcp`.
    pub fn setup(&self, track_url: &str, rtp: u8, rtcp: u8) -> String {
        let mut request = self.start("SETUP", track_url);
        self.session(&mut request);
        let _ = write!(
            request,
            "Transport: RTP/AVP/TCP;unicast;interleaved={}-{}\r\n",
            rtp, rtcp
        );
        for line in &self.setup_headers {
            let _ = write!(request, "{}\r\n", line);
        }
        self.user_agent(&mut request);
        self.bandwidth(&mut request);
        self.authorization(&mut request, "SETUP", track_url);
        Self::finish(request)
    }

    /// PLAY from `start_sec`; a `Speed` header is added unless `speed` is 1.
    pub fn play(&self, start_sec: u32, speed: f32) -> String {
        let mut request = self.start("PLAY", &self.url);
        self.session(&mut request);
        let _ = write!(request, "Range: npt={}.0-\r\n", start_sec);
        if (speed - 1.0).abs() > f32::EPSILON {
            let _ = write!(request, "Speed: {:.2}\r\n", speed);
        }
        request.push_str("x-prebuffer: maxtime=3.0\r\n");
        self.user_agent(&mut request);
        self.bandwidth(&mut request);
        self.authorization(&mut request, "PLAY", &self.url);
        Self::finish(request)
    }

    /// PAUSE.
    pub fn pause(&self) -> String {
        let mut request = self.start("PAUSE", &self.url);
        self.session(&mut request);
        self.user_agent(&mut request);
        self.authorization(&mut request, "PAUSE", &self.url);
        Self::finish(request)
    }

    /// TEARDOWN.
    pub fn teardown(&self) -> String {
        let mut request = self.start("TEARDOWN", &self.url);
        self.session(&mut request);
        self.user_agent(&mut request);
        self.authorization(&mut request, "TEARDOWN", &self.url);
        Self::finish(request)
    }
}
