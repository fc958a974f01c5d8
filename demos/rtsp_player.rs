use base64::Engine as _;
use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;
use tokio::time::sleep;

use rtspio::config::{self, SessionConfig};
use rtspio::format::rtsp::{ChannelHandler, RtspSession, SessionEvent, Track};

const START_CODE: &[u8] = &[0, 0, 0, 1];

struct TrackWriter {
    out: BufWriter<File>,
    annex_b: bool,
    units: u64,
    bytes: u64,
}

fn parameter_sets(track: &Track) -> Vec<Vec<u8>> {
    let engine = base64::engine::general_purpose::STANDARD;
    let media = &track.media;
    let mut sets = Vec::new();

    // H.264 packs SPS and PPS into one comma separated attribute
    if let Some(value) = media.fmtp_value("sprop-parameter-sets") {
        sets.extend(value.split(',').filter_map(|s| engine.decode(s.trim()).ok()));
    }
    for key in ["sprop-vps", "sprop-sps", "sprop-pps"] {
        if let Some(value) = media.fmtp_value(key) {
            sets.extend(engine.decode(value.trim()).ok());
        }
    }
    sets
}

fn open_writer(track: &Track) -> std::io::Result<TrackWriter> {
    let codec = track.media.codec_name.to_ascii_uppercase();
    let annex_b = matches!(codec.as_str(), "H264" | "H265" | "HEVC");
    let extension = match codec.as_str() {
        "H264" => "h264",
        "H265" | "HEVC" => "h265",
        _ => "raw",
    };
    let path = format!("track{}.{}", track.channel / 2, extension);
    println!(
        "  {} {} (pt {}) -> {}",
        track.media.medium, track.media.codec_name, track.media.payload_format, path
    );

    let mut out = BufWriter::new(File::create(&path)?);
    if annex_b {
        for set in parameter_sets(track) {
            out.write_all(START_CODE)?;
            out.write_all(&set)?;
        }
    }
    Ok(TrackWriter {
        out,
        annex_b,
        units: 0,
        bytes: 0,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let url = std::env::args().nth(1).unwrap_or_else(config::rtsp_url);
    let seconds = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(30u64);

    let (handler, mut media, mut events) = ChannelHandler::new();
    let session = RtspSession::with_config(handler, SessionConfig::from_env());

    println!("Connecting to {}", url);
    session.play(&url).await?;

    let tracks = match events.recv().await {
        Some(SessionEvent::RequestSuccess { tracks }) => tracks,
        other => return Err(format!("session did not start: {:?}", other).into()),
    };
    println!("Playing {} track(s):", tracks.len());

    let mut writers = HashMap::new();
    for track in &tracks {
        writers.insert(track.channel, open_writer(track)?);
    }

    let deadline = sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            unit = media.recv() => {
                let Some(unit) = unit else { break };
                if let Some(writer) = writers.get_mut(&unit.channel) {
                    if writer.annex_b {
                        writer.out.write_all(START_CODE)?;
                    }
                    writer.out.write_all(&unit.data)?;
                    writer.units += 1;
                    writer.bytes += unit.data.len() as u64;
                }
            }
            event = events.recv() => {
                if let Some(event) = event {
                    println!("Session event: {:?}", event);
                }
                break;
            }
            _ = &mut deadline => break,
        }
    }

    session.close().await;

    for (channel, mut writer) in writers {
        writer.out.flush()?;
        println!(
            "Channel {}: {} units, {} bytes",
            channel, writer.units, writer.bytes
        );
    }
    println!("Done");

    Ok(())
}
