//! RTP stream statistics.
//!
//! Only the members the rate computations read are modelled; every counter is
//! optional because browsers differ in which members they populate.
//!
//! - [`RTCRtpStreamStats`] - Base statistics shared by all RTP streams
//! - [`RTCInboundRtpStreamStats`] - Local inbound stream stats
//! - [`RTCOutboundRtpStreamStats`] - Local outbound stream stats
//! - [`RTCRemoteInboundRtpStreamStats`] - Remote inbound stream stats
//! - [`RTCRemoteOutboundRtpStreamStats`] - Remote outbound stream stats

use super::RTCStats;
use serde::Deserialize;

/// Base statistics for an RTP stream.
///
/// # W3C Reference
///
/// See [RTCRtpStreamStats](https://www.w3.org/TR/webrtc-stats/#rtpstreamstats-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCRtpStreamStats {
    /// Base statistics fields (timestamp, id).
    #[serde(flatten)]
    pub stats: RTCStats,

    /// The media kind, `"audio"` or `"video"`.
    ///
    /// Kept as reported so that unexpected values can be rejected by the
    /// stream state.
    #[serde(default)]
    pub kind: String,

    /// The SSRC identifier of this stream.
    pub ssrc: Option<u32>,

    /// The ID of the transport used for this stream.
    pub transport_id: Option<String>,

    /// The ID of the codec used for this stream.
    pub codec_id: Option<String>,
}

/// Statistics for a locally received inbound RTP stream.
///
/// # W3C Reference
///
/// See [RTCInboundRtpStreamStats](https://www.w3.org/TR/webrtc-stats/#inboundrtpstats-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCInboundRtpStreamStats {
    /// Base RTP stream statistics.
    #[serde(flatten)]
    pub rtp_stream_stats: RTCRtpStreamStats,

    /// The ID of the corresponding remote outbound stats.
    pub remote_id: Option<String>,

    /// The media ID (mid) from SDP.
    pub mid: Option<String>,

    /// Total number of RTP packets received.
    pub packets_received: Option<u64>,

    /// Total number of packets lost. Negative when duplicates arrive.
    pub packets_lost: Option<i64>,

    /// Inter-arrival jitter in seconds.
    pub jitter: Option<f64>,

    /// Total payload bytes received.
    pub bytes_received: Option<u64>,

    /// Number of frames successfully decoded.
    pub frames_decoded: Option<u64>,

    /// Total time spent decoding frames in seconds.
    pub total_decode_time: Option<f64>,

    /// Width of the last decoded frame in pixels.
    pub frame_width: Option<u32>,

    /// Height of the last decoded frame in pixels.
    pub frame_height: Option<u32>,

    /// Number of NACK packets sent.
    pub nack_count: Option<u64>,

    /// Number of FIR packets sent.
    pub fir_count: Option<u64>,

    /// Number of PLI packets sent.
    pub pli_count: Option<u64>,
}

/// Statistics for a locally sent outbound RTP stream.
///
/// # W3C Reference
///
/// See [RTCOutboundRtpStreamStats](https://www.w3.org/TR/webrtc-stats/#outboundrtpstats-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCOutboundRtpStreamStats {
    /// Base RTP stream statistics.
    #[serde(flatten)]
    pub rtp_stream_stats: RTCRtpStreamStats,

    /// The ID of the corresponding remote inbound stats.
    pub remote_id: Option<String>,

    /// The media ID (mid) from SDP.
    pub mid: Option<String>,

    /// The RTP stream identifier (RID) for simulcast.
    pub rid: Option<String>,

    /// Total number of RTP packets sent.
    pub packets_sent: Option<u64>,

    /// Total number of bytes sent.
    pub bytes_sent: Option<u64>,

    /// Number of retransmitted packets sent.
    pub retransmitted_packets_sent: Option<u64>,

    /// Number of frames encoded.
    pub frames_encoded: Option<u64>,

    /// Total time spent encoding frames in seconds.
    pub total_encode_time: Option<f64>,

    /// Width of the last encoded frame in pixels.
    pub frame_width: Option<u32>,

    /// Height of the last encoded frame in pixels.
    pub frame_height: Option<u32>,

    /// Number of NACK packets received.
    pub nack_count: Option<u64>,

    /// Number of FIR packets received.
    pub fir_count: Option<u64>,

    /// Number of PLI packets received.
    pub pli_count: Option<u64>,
}

/// The remote endpoint's view of a locally sent stream, from RTCP RR.
///
/// # W3C Reference
///
/// See [RTCRemoteInboundRtpStreamStats](https://www.w3.org/TR/webrtc-stats/#remoteinboundrtpstats-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCRemoteInboundRtpStreamStats {
    /// Base RTP stream statistics.
    #[serde(flatten)]
    pub rtp_stream_stats: RTCRtpStreamStats,

    /// The ID of the corresponding local outbound stats.
    pub local_id: Option<String>,

    /// Total number of packets lost as seen by the receiver.
    pub packets_lost: Option<i64>,

    /// Inter-arrival jitter in seconds as seen by the receiver.
    pub jitter: Option<f64>,

    /// The most recent round trip time in seconds.
    pub round_trip_time: Option<f64>,

    /// Cumulative round trip time in seconds.
    pub total_round_trip_time: Option<f64>,

    /// Fraction of packets lost in the last RR (0.0 to 1.0).
    pub fraction_lost: Option<f64>,

    /// Number of round trip time measurements.
    pub round_trip_time_measurements: Option<u64>,
}

/// The remote endpoint's view of a stream it sends, from RTCP SR.
///
/// # W3C Reference
///
/// See [RTCRemoteOutboundRtpStreamStats](https://www.w3.org/TR/webrtc-stats/#remoteoutboundrtpstats-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCRemoteOutboundRtpStreamStats {
    /// Base RTP stream statistics.
    #[serde(flatten)]
    pub rtp_stream_stats: RTCRtpStreamStats,

    /// The ID of the corresponding local inbound stats.
    pub local_id: Option<String>,

    /// Total number of packets sent by the remote endpoint.
    pub packets_sent: Option<u64>,

    /// Total number of bytes sent by the remote endpoint.
    pub bytes_sent: Option<u64>,

    /// The remote timestamp from the RTCP SR, in milliseconds.
    pub remote_timestamp: Option<f64>,

    /// Number of RTCP Sender Reports sent.
    pub reports_sent: Option<u64>,

    /// The most recent round trip time in seconds.
    pub round_trip_time: Option<f64>,
}
