use url::Url;

use crate::{Result, RtspError};

/// Port used when the URL does not carry one.
pub const DEFAULT_RTSP_PORT: u16 = 554;

/// An `rtsp://[user[:pass]@]host[:port][/path[?query]]` URL split into the
/// parts a session needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtspUrl {
    host: String,
    port: Option<u16>,
    username: String,
    password: String,
    request_uri: String,
}

impl RtspUrl {
    /// Parses `input`. Any scheme is accepted; the request URI keeps it.
    pub fn parse(input: &str) -> Result<Self> {
        let mut url = Url::parse(input.trim())
            .map_err(|e| RtspError::Parser(format!("url parse error: {}: {}", input, e)))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| RtspError::Parser(format!("no host in url: {}", input)))?
            .to_string();
        let username = percent_decode(url.username());
        let password = url.password().map(percent_decode).unwrap_or_default();

        url.set_password(None)
            .and_then(|_| url.set_username(""))
            .map_err(|_| RtspError::Parser(format!("cannot strip credentials: {}", input)))?;

        Ok(Self {
            host,
            port: url.port(),
            username,
            password,
            request_uri: url.to_string(),
        })
    }

    /// Host name or address literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if any.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Explicit port or 554.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_RTSP_PORT)
    }

    /// `host:port` to dial.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port_or_default())
    }

    /// Decoded username, empty when absent.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Decoded password, empty when absent.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Username and password, when both were given.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }

    /// The URL without credentials, as sent on the request line.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Resolves a track `control` attribute against this URL.
    ///
    /// Absolute controls (starting with `rtsp`/`RTSP`) are returned as they are,
    /// an empty or `*` control means the presentation itself, anything else is
    /// appended after a slash.
    pub fn track_url(&self, control: &str) -> String {
        let control = control.trim();
        if control.is_empty() || control == "*" {
            self.request_uri.clone()
        } else if control.starts_with("rtsp") || control.starts_with("RTSP") {
            control.to_string()
        } else {
            format!("{}/{}", self.request_uri, control)
        }
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
