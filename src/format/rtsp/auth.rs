use base64::Engine as _;
use md5::{Digest, Md5};

/// Authentication scheme offered in a `WWW-Authenticate` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Basic`: base64 of `username:password`
    Basic,
    /// `Digest` without qop (RFC 2069)
    Digest,
}

/// A parsed `WWW-Authenticate` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// Scheme the server asked for
    pub scheme: AuthScheme,
    /// Protection space
    pub realm: String,
    /// Empty for Basic
    pub nonce: String,
    /// The previous nonce expired
    pub stale: bool,
}

impl AuthChallenge {
    /// Parses a header value such as `Digest realm="x", nonce="y", stale=FALSE`.
    ///
    /// Returns `None` for schemes other than Basic and Digest.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (scheme, params) = value
            .split_once(char::is_whitespace)
            .unwrap_or((value, ""));
        let scheme = if scheme.eq_ignore_ascii_case("digest") {
            AuthScheme::Digest
        } else if scheme.eq_ignore_ascii_case("basic") {
            AuthScheme::Basic
        } else {
            return None;
        };

        let mut challenge = AuthChallenge {
            scheme,
            realm: String::new(),
            nonce: String::new(),
            stale: false,
        };
        for param in split_params(params) {
            let Some((key, val)) = param.split_once('=') else {
                continue;
            };
            let val = val.trim().trim_matches('"');
            match key.trim().to_ascii_lowercase().as_str() {
                "realm" => challenge.realm = val.to_string(),
                "nonce" => challenge.nonce = val.to_string(),
                "stale" => challenge.stale = val.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }
        Some(challenge)
    }
}

// comma separated, commas inside quotes don't count
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[start..]);
    parts
}

/// Builds `Authorization` headers for one set of credentials.
///
/// The same nonce is reused for every request; a stale nonce shows up as
/// another 401 and is not refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticator {
    scheme: AuthScheme,
    realm: String,
    nonce: String,
    username: String,
    password: String,
}

impl Authenticator {
    /// Answers `challenge` with the given credentials.
    pub fn new(challenge: &AuthChallenge, username: &str, password: &str) -> Self {
        Self {
            scheme: challenge.scheme,
            realm: challenge.realm.clone(),
            nonce: challenge.nonce.clone(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Scheme of the answered challenge.
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// The complete `Authorization: ...\r\n` line for `method` on `uri`.
    pub fn header(&self, method: &str, uri: &str) -> String {
        match self.scheme {
            AuthScheme::Basic => {
                let token = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", self.username, self.password).as_bytes());
                format!("Authorization: Basic {}\r\n", token)
            }
            AuthScheme::Digest => format!(
                "Authorization: Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"\r\n",
                self.username,
                self.realm,
                self.nonce,
                uri,
                self.digest_response(method, uri)
            ),
        }
    }

    /// `md5(md5(username:realm:password):nonce:md5(method:uri))` as lowercase hex.
    pub fn digest_response(&self, method: &str, uri: &str) -> String {
        let ha1 = md5_hash(&format!("{}:{}:{}", self.username, self.realm, self.password));
        let ha2 = md5_hash(&format!("{}:{}", method, uri));
        md5_hash(&format!("{}:{}:{}", ha1, self.nonce, ha2))
    }
}

fn md5_hash(s: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}
