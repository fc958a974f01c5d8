#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # rtspio - RTSP over TCP client
//!
//! `rtspio` pulls live audio/video from RTSP servers such as IP cameras. It
//! negotiates a presentation over one TCP connection, receives RTP
//! interleaved on that same connection and hands back reassembled access
//! units (H.264/HEVC NAL units, or raw payloads for other codecs).
//!
//! ## Features
//!
//! - DESCRIBE, SETUP, PLAY, PAUSE, OPTIONS and TEARDOWN requests
//! - Basic and Digest authentication, answered once per 401 challenge
//! - SDP parsing with the RFC 3551 static payload table
//! - H.264 (single NAL, STAP, MTAP, FU) and HEVC (single NAL, AP, FU)
//!   depacketization; marker-bit and pass-through strategies for the rest
//! - Per-track presentation timestamps from the SDP clock rate
//! - Pluggable transports: dial TCP, or bind any `AsyncRead + AsyncWrite`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rtspio::format::rtsp::{ChannelHandler, RtspSession, SessionEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (handler, mut media, mut events) = ChannelHandler::new();
//!     let session = RtspSession::new(handler);
//!
//!     session.play("rtsp://example.com/stream").await?;
//!     if let Some(SessionEvent::RequestSuccess { tracks }) = events.recv().await {
//!         for track in &tracks {
//!             println!("{} {} on channel {}", track.media.medium, track.media.codec_name, track.channel);
//!         }
//!     }
//!
//!     while let Some(unit) = media.recv().await {
//!         println!("channel {}: {} bytes at {:?} ms", unit.channel, unit.data.len(), unit.pts_ms);
//!     }
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `net`: framed byte-stream connection, framing strategies, dialers
//! - `format::rtsp`: the session, request builders, response/SDP parsers,
//!   authentication
//! - `format::rtp`: RTP header view and codec depacketizers
//! - `config`: session tunables and environment overrides
//! - `error`: the crate error type

/// Session configuration
pub mod config;

/// Error types and utilities
pub mod error;

/// RTSP and RTP implementations
pub mod format;

/// Framed connections and transports
pub mod net;

pub use error::{Result, RtspError};
