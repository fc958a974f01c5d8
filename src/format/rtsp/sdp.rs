use std::collections::HashMap;

use crate::{Result, RtspError};

/// One `m=` block of a session description, resolved to what a player needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSubsession {
    /// `audio`, `video`, `application`, ...
    pub medium: String,
    /// First payload format of the media line
    pub payload_format: u8,
    /// Encoding name from the static table or `rtpmap`
    pub codec_name: String,
    /// RTP clock rate in Hz
    pub clock_rate: Option<u32>,
    /// Audio channel count
    pub channels: Option<u16>,
    /// `control` attribute, relative or absolute
    pub control: String,
    /// From `x-dimensions`
    pub video_width: Option<u32>,
    /// From `x-dimensions`
    pub video_height: Option<u32>,
    /// `framerate` or `x-framerate`, rounded
    pub video_framerate: Option<u32>,
    /// `fmtp` parameters; keys without a value map to ""
    pub fmtp: HashMap<String, String>,
}

impl MediaSubsession {
    /// Looks up a format parameter case-insensitively.
    pub fn fmtp_value(&self, key: &str) -> Option<&str> {
        self.fmtp
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A decoded session description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdpInfo {
    /// Media blocks in description order
    pub medias: Vec<MediaSubsession>,
}

#[derive(Debug, Default)]
struct MediaBlock {
    media_type: String,
    format: String,
    attributes: Vec<(String, String)>,
}

impl MediaBlock {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    // attributes like rtpmap/fmtp may repeat, once per payload format
    fn format_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .find(|v| v.split_whitespace().next() == Some(self.format.as_str()))
            .or_else(|| self.attribute(name))
    }
}

/// Parses a DESCRIBE body.
///
/// # Errors
///
/// Returns `RtspError::Sdp` for malformed lines or a description without media.
pub fn parse_sdp(content: &str) -> Result<SdpInfo> {
    let mut blocks: Vec<MediaBlock> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Each line must be of the form <type>=<value>
        let (typ, value) = match line.split_once('=') {
            Some((t, v)) if t.len() == 1 => (t, v.trim()),
            _ => return Err(RtspError::Sdp(format!("invalid line: {}", line))),
        };

        match (typ, blocks.last_mut()) {
            ("m", _) => {
                // <media> <port> <proto> <fmt> ...
                let parts: Vec<&str> = value.split_whitespace().collect();
                if parts.len() < 4 {
                    return Err(RtspError::Sdp(format!("invalid media description: {}", value)));
                }
                blocks.push(MediaBlock {
                    media_type: parts[0].to_string(),
                    format: parts[3].to_string(),
                    attributes: Vec::new(),
                });
            }
            ("a", Some(block)) => {
                let (name, val) = value.split_once(':').unwrap_or((value, ""));
                block
                    .attributes
                    .push((name.trim().to_string(), val.trim().to_string()));
            }
            _ => {} // session level lines are not needed
        }
    }

    if blocks.is_empty() {
        return Err(RtspError::Sdp("no media in session description".into()));
    }

    Ok(SdpInfo {
        medias: blocks.iter().map(resolve_media).collect(),
    })
}

fn resolve_media(block: &MediaBlock) -> MediaSubsession {
    let payload_format = block.format.parse::<u8>().unwrap_or_default();
    let mut media = MediaSubsession {
        medium: block.media_type.clone(),
        payload_format,
        ..Default::default()
    };

    if let Some((codec, _, clock_rate, channels)) = static_payload_info(payload_format) {
        media.codec_name = codec.to_string();
        media.clock_rate = Some(clock_rate);
        media.channels = channels;
    } else if let Some(rtpmap) = block.format_attribute("rtpmap") {
        let (codec, clock_rate, channels) = parse_rtpmap(rtpmap);
        media.codec_name = codec;
        media.clock_rate = clock_rate;
        media.channels = channels;
    }

    media.control = block.attribute("control").unwrap_or_default().to_string();

    if let Some((width, height)) = block.attribute("x-dimensions").and_then(parse_dimensions) {
        media.video_width = Some(width);
        media.video_height = Some(height);
    }

    media.video_framerate = block
        .attribute("framerate")
        .or_else(|| block.attribute("x-framerate"))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|fps| *fps > 0.0)
        .map(|fps| fps.round() as u32);

    if let Some(fmtp) = block.format_attribute("fmtp") {
        media.fmtp = parse_fmtp(fmtp);
    }

    media
}

/// RFC 3551 static payload types: encoding name, medium, clock rate, channels.
pub fn static_payload_info(
    payload_type: u8,
) -> Option<(&'static str, &'static str, u32, Option<u16>)> {
    let info = match payload_type {
        0 => ("PCMU", "audio", 8000, Some(1)),
        3 => ("GSM", "audio", 8000, Some(1)),
        4 => ("G723", "audio", 8000, Some(1)),
        5 => ("DVI4", "audio", 8000, Some(1)),
        6 => ("DVI4", "audio", 16000, Some(1)),
        7 => ("LPC", "audio", 8000, Some(1)),
        8 => ("PCMA", "audio", 8000, Some(1)),
        9 => ("G722", "audio", 8000, Some(1)),
        10 => ("L16", "audio", 44100, Some(2)),
        11 => ("L16", "audio", 44100, Some(1)),
        12 => ("QCELP", "audio", 8000, Some(1)),
        13 => ("CN", "audio", 8000, Some(1)),
        14 => ("MPA", "audio", 90000, None),
        15 => ("G728", "audio", 8000, Some(1)),
        16 => ("DVI4", "audio", 11025, Some(1)),
        17 => ("DVI4", "audio", 22050, Some(1)),
        18 => ("G729", "audio", 8000, Some(1)),
        25 => ("CelB", "video", 90000, None),
        26 => ("JPEG", "video", 90000, None),
        28 => ("nv", "video", 90000, None),
        31 => ("H261", "video", 90000, None),
        32 => ("MPV", "video", 90000, None),
        33 => ("MP2T", "data", 90000, None),
        34 => ("H263", "video", 90000, None),
        _ => return None,
    };
    Some(info)
}

// "<fmt> <codec>[/<rate>[/<channels>]]"
fn parse_rtpmap(rtpmap: &str) -> (String, Option<u32>, Option<u16>) {
    let encoding = rtpmap.split_whitespace().nth(1).unwrap_or_default();
    let mut parts = encoding.split('/');
    let codec = parts.next().unwrap_or_default().to_string();
    let clock_rate = parts.next().and_then(|v| v.parse().ok());
    let channels = parts.next().and_then(|v| v.parse().ok());
    (codec, clock_rate, channels)
}

fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.split_once(',')?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

fn parse_fmtp(fmtp: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut tokens = fmtp
        .split(|c: char| c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .peekable();

    // leading payload format number
    if tokens
        .peek()
        .is_some_and(|t| t.bytes().all(|b| b.is_ascii_digit()))
    {
        tokens.next();
    }

    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) => params.insert(key.to_string(), value.to_string()),
            None => params.insert(token.to_string(), String::new()),
        };
    }
    params
}
