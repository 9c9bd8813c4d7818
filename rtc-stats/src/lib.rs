#![warn(rust_2018_idioms)]

//! Connection quality statistics for WebRTC.
//!
//! Browsers expose cumulative counters through `RTCPeerConnection.getStats()`.
//! This crate keeps the previous snapshot of every tracked stream and
//! candidate pair and turns successive snapshots into instantaneous rates
//! (bitrate, packet loss, jitter, round trip time, frame rate, ...).
//!
//! - [`report`] - typed model of a raw `RTCStatsReport` snapshot
//! - [`stream`] - per RTP stream state (inbound and outbound)
//! - [`candidate_pair`] - state of the selected ICE candidate pair
//! - [`connection`] - [`ConnectionStats`], the per peer connection aggregator

pub mod candidate_pair;
pub mod configuration;
pub mod connection;
pub mod error;
pub mod report;
pub mod stream;
pub(crate) mod util;

pub use candidate_pair::{CandidatePairState, CandidatePairStats, NetworkEndpoint};
pub use configuration::{RTCStatsConfiguration, RTCStatsConfigurationBuilder};
pub use connection::{ConnectionStats, StatsEvent};
pub use error::{Error, Result};
pub use report::{RTCStatsReport, RTCStatsReportEntry, RTCStatsType};
pub use stream::{InboundStreamState, OutboundStreamState, RTCMediaKind, StreamState, StreamStats};
