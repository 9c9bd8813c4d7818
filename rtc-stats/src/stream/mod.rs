//! Per RTP stream state.
//!
//! A [`StreamState`] remembers the cumulative media counters of one stream
//! from the previous snapshot. [`InboundStreamState`] and
//! [`OutboundStreamState`] build on it with the byte and packet counters of
//! their direction and produce a [`StreamStats`] on every update.

use crate::error::{Error, Result};
use crate::report::rtp_stream::{
    RTCInboundRtpStreamStats, RTCOutboundRtpStreamStats, RTCRtpStreamStats,
};
use crate::util::counter_delta;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub mod inbound;
pub mod outbound;

pub use inbound::InboundStreamState;
pub use outbound::OutboundStreamState;

/// The media kind of an RTP stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RTCMediaKind {
    Audio,
    Video,
}

impl RTCMediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RTCMediaKind::Audio => "audio",
            RTCMediaKind::Video => "video",
        }
    }
}

impl fmt::Display for RTCMediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RTCMediaKind {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "audio" => Ok(RTCMediaKind::Audio),
            "video" => Ok(RTCMediaKind::Video),
            _ => Err(Error::ErrInvalidMediaKind(raw.to_owned())),
        }
    }
}

/// Read access to the media members shared by inbound and outbound stream
/// reports.
///
/// Inbound reports carry decoder counters and outbound reports carry encoder
/// counters; [`MediaStreamReport::frame_count`] and
/// [`MediaStreamReport::total_coding_time`] pick whichever is present.
pub trait MediaStreamReport {
    fn rtp_stream_stats(&self) -> &RTCRtpStreamStats;
    fn nack_count(&self) -> Option<u64>;
    fn fir_count(&self) -> Option<u64>;
    fn pli_count(&self) -> Option<u64>;
    fn frame_width(&self) -> Option<u32>;
    fn frame_height(&self) -> Option<u32>;

    fn frames_decoded(&self) -> Option<u64> {
        None
    }

    fn total_decode_time(&self) -> Option<f64> {
        None
    }

    fn frames_encoded(&self) -> Option<u64> {
        None
    }

    fn total_encode_time(&self) -> Option<f64> {
        None
    }

    fn id(&self) -> &str {
        &self.rtp_stream_stats().stats.id
    }

    fn timestamp(&self) -> f64 {
        self.rtp_stream_stats().stats.timestamp
    }

    fn kind(&self) -> &str {
        &self.rtp_stream_stats().kind
    }

    fn frame_count(&self) -> Option<u64> {
        self.frames_decoded().or_else(|| self.frames_encoded())
    }

    fn total_coding_time(&self) -> Option<f64> {
        self.total_decode_time().or_else(|| self.total_encode_time())
    }
}

impl MediaStreamReport for RTCInboundRtpStreamStats {
    fn rtp_stream_stats(&self) -> &RTCRtpStreamStats {
        &self.rtp_stream_stats
    }

    fn nack_count(&self) -> Option<u64> {
        self.nack_count
    }

    fn fir_count(&self) -> Option<u64> {
        self.fir_count
    }

    fn pli_count(&self) -> Option<u64> {
        self.pli_count
    }

    fn frame_width(&self) -> Option<u32> {
        self.frame_width
    }

    fn frame_height(&self) -> Option<u32> {
        self.frame_height
    }

    fn frames_decoded(&self) -> Option<u64> {
        self.frames_decoded
    }

    fn total_decode_time(&self) -> Option<f64> {
        self.total_decode_time
    }
}

impl MediaStreamReport for RTCOutboundRtpStreamStats {
    fn rtp_stream_stats(&self) -> &RTCRtpStreamStats {
        &self.rtp_stream_stats
    }

    fn nack_count(&self) -> Option<u64> {
        self.nack_count
    }

    fn fir_count(&self) -> Option<u64> {
        self.fir_count
    }

    fn pli_count(&self) -> Option<u64> {
        self.pli_count
    }

    fn frame_width(&self) -> Option<u32> {
        self.frame_width
    }

    fn frame_height(&self) -> Option<u32> {
        self.frame_height
    }

    fn frames_encoded(&self) -> Option<u64> {
        self.frames_encoded
    }

    fn total_encode_time(&self) -> Option<f64> {
        self.total_encode_time
    }
}

/// Rates derived for one stream, or for all streams of one direction once
/// aggregated by [`ConnectionStats`](crate::ConnectionStats).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStats {
    /// Timestamp of the report the rates were derived from, in milliseconds.
    pub timestamp: f64,
    /// Bits per second.
    pub bit_rate: Option<f64>,
    /// Packets per second.
    pub packet_rate: Option<f64>,
    /// Fraction of packets lost in the interval (0.0 to 1.0).
    pub packet_loss: Option<f64>,
    /// Jitter in seconds.
    pub jitter: Option<f64>,
    /// Round trip time in seconds.
    pub round_trip_time: Option<f64>,
    /// Fraction of sent packets that were retransmissions.
    pub retransmit_ratio: Option<f64>,
    /// Frames per second.
    pub frame_rate: Option<f64>,
    /// Average encode or decode time per frame, in seconds.
    pub coding_time: Option<f64>,
    /// FIR requests in the interval.
    pub frame_skip: Option<f64>,
    /// PLI requests in the interval.
    pub picture_loss: Option<f64>,
    /// NACK requests in the interval.
    pub nack_packets: Option<f64>,
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
}

/// Cumulative media counters of one stream as of the last snapshot.
#[derive(Debug, Clone)]
pub struct StreamState {
    id: String,
    timestamp: f64,
    kind: RTCMediaKind,
    nack_count: Option<u64>,
    fir_count: Option<u64>,
    pli_count: Option<u64>,
    total_coding_time: Option<f64>,
    frame_count: Option<u64>,
    frame_width: Option<u32>,
    frame_height: Option<u32>,
}

impl StreamState {
    /// Creates the state from the first report seen for a stream.
    ///
    /// Fails with [`Error::ErrInvalidMediaKind`] unless the report's kind is
    /// `audio` or `video`.
    pub fn new(report: &impl MediaStreamReport) -> Result<Self> {
        Ok(StreamState {
            id: report.id().to_owned(),
            timestamp: report.timestamp(),
            kind: report.kind().parse()?,
            nack_count: report.nack_count(),
            fir_count: report.fir_count(),
            pli_count: report.pli_count(),
            total_coding_time: report.total_coding_time(),
            frame_count: report.frame_count(),
            frame_width: report.frame_width(),
            frame_height: report.frame_height(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RTCMediaKind {
        self.kind
    }

    /// Timestamp of the last accepted report, in milliseconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Validates `report` against the stored state and returns the elapsed
    /// time in seconds.
    ///
    /// The kind of a stream never changes and its reports must arrive with
    /// strictly increasing timestamps.
    pub(crate) fn check(&self, report: &impl MediaStreamReport) -> Result<f64> {
        if report.kind() != self.kind.as_str() {
            return Err(Error::ErrMediaKindMismatch {
                expected: self.kind,
                actual: report.kind().to_owned(),
            });
        }

        let current = report.timestamp();
        if current <= self.timestamp {
            return Err(Error::ErrStatsOutOfOrder {
                id: self.id.clone(),
                previous: self.timestamp,
                current,
            });
        }

        Ok((current - self.timestamp) / 1000.0)
    }

    /// Derives the media metrics of the interval into `stats` and stores the
    /// report's counters.
    ///
    /// Audio streams have no media metrics of their own.
    pub(crate) fn update_media(
        &mut self,
        report: &impl MediaStreamReport,
        dt: f64,
        stats: &mut StreamStats,
    ) {
        match self.kind {
            RTCMediaKind::Audio => {}
            RTCMediaKind::Video => {
                stats.nack_packets = counter_delta(report.nack_count(), self.nack_count);
                stats.frame_skip = counter_delta(report.fir_count(), self.fir_count);
                stats.picture_loss = counter_delta(report.pli_count(), self.pli_count);
                stats.frame_rate =
                    counter_delta(report.frame_count(), self.frame_count).map(|frames| frames / dt);
                stats.coding_time = match (report.total_coding_time(), report.frame_count()) {
                    (Some(total), Some(frames)) if frames > 0 => Some(total / frames as f64),
                    _ => None,
                };
                stats.frame_width = report.frame_width();
                stats.frame_height = report.frame_height();
            }
        }

        self.timestamp = report.timestamp();
        self.nack_count = report.nack_count();
        self.fir_count = report.fir_count();
        self.pli_count = report.pli_count();
        self.total_coding_time = report.total_coding_time();
        self.frame_count = report.frame_count();
        self.frame_width = report.frame_width();
        self.frame_height = report.frame_height();
    }
}
