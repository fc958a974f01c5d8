use log::warn;
use std::env;
use std::fs;
use std::time::Duration;

use crate::format::rtp::DepacketizerRegistry;

/// Default time to wait for one RTSP response.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Default time an enqueue may wait on a full send queue.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);
/// Default capacity of a connection's outbound queue.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 0x0fff;
/// Default bound on one framed message (header + body + content).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 0xffff;
/// Default bound on one reassembled access unit.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;
/// Default `User-agent` header value.
pub const DEFAULT_USER_AGENT: &str = "rtspio/0.1";

const ENV_PREFIX: &str = "RTSPIO_";
const PLACEHOLDER_RTSP_URL: &str = "rtsp://example.com:554/stream";

/// Tunables of an RTSP session and the connection it owns.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long `wait_response` waits before giving up
    pub response_timeout: Duration,
    /// TCP connect timeout used by the default dialer
    pub connect_timeout: Duration,
    /// How long an enqueue may block on a full send queue
    pub send_timeout: Duration,
    /// Per-read deadline; `None` disables it
    pub read_timeout: Option<Duration>,
    /// Capacity of the outbound message queue
    pub send_queue_capacity: usize,
    /// Upper bound on a single framed message
    pub max_message_size: usize,
    /// Upper bound on a single reassembled access unit
    pub max_frame_size: usize,
    /// Value of the `User-agent` header
    pub user_agent: String,
    /// Value of the `Bandwidth` header in bps, 0 omits it
    pub bandwidth: u32,
    /// Raw header lines (without CRLF) appended to every SETUP
    pub extra_setup_headers: Vec<String>,
    /// Codec name to depacketizer mapping
    pub depacketizers: DepacketizerRegistry,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            read_timeout: None,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            bandwidth: 0,
            extra_setup_headers: Vec::new(),
            depacketizers: DepacketizerRegistry::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default configuration overlaid with `RTSPIO_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_number::<u64>("RESPONSE_TIMEOUT_MS") {
            config.response_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number::<u64>("CONNECT_TIMEOUT_MS") {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number::<u64>("READ_TIMEOUT_MS") {
            config.read_timeout = (ms != 0).then(|| Duration::from_millis(ms));
        }
        if let Some(bandwidth) = env_number::<u32>("BANDWIDTH") {
            config.bandwidth = bandwidth;
        }
        if let Some(size) = env_number::<usize>("MAX_FRAME_SIZE") {
            config.max_frame_size = size;
        }
        if let Ok(agent) = env::var(format!("{}USER_AGENT", ENV_PREFIX)) {
            if !agent.trim().is_empty() {
                config.user_agent = agent.trim().to_string();
            }
        }

        config
    }

    /// Sets the response timeout.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Sets or clears the per-read deadline.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the outbound queue capacity.
    pub fn with_send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = capacity.max(1);
        self
    }

    /// Sets the framed message bound.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets the access unit bound.
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Sets the `User-agent` header.
    pub fn with_user_agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    /// Sets the `Bandwidth` header.
    pub fn with_bandwidth(mut self, bandwidth: u32) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Appends a raw header line to every SETUP request.
    pub fn with_setup_header(mut self, line: &str) -> Self {
        self.extra_setup_headers.push(line.trim_end().to_string());
        self
    }

    /// Replaces the depacketizer registry.
    pub fn with_depacketizers(mut self, registry: DepacketizerRegistry) -> Self {
        self.depacketizers = registry;
        self
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let key = format!("{}{}", ENV_PREFIX, name);
    let value = env::var(&key).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {}: not a number ({:?})", key, value);
            None
        }
    }
}

/// Returns the stream URL used by demos.
///
/// Looks at `RTSPIO_RTSP_URL` first, then a `rtsp_url = "..."` line in
/// `./rtspio.toml`, and falls back to a placeholder.
pub fn rtsp_url() -> String {
    if let Ok(url) = env::var(format!("{}RTSP_URL", ENV_PREFIX)) {
        if !url.trim().is_empty() {
            return url.trim().to_string();
        }
    }

    fs::read_to_string("./rtspio.toml")
        .ok()
        .and_then(|content| rtsp_url_from_toml(&content))
        .unwrap_or_else(|| PLACEHOLDER_RTSP_URL.to_string())
}

fn rtsp_url_from_toml(content: &str) -> Option<String> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("rtsp_url"))?;
    let (_, value) = line.split_once('=')?;
    let url = value.trim().trim_matches('"').trim_matches('\'');
    (!url.is_empty()).then(|| url.to_string())
}
