//! ICE candidate, candidate pair and transport statistics.

use super::RTCStats;
use serde::Deserialize;

/// The state of an ICE candidate pair.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, Deserialize)]
#[serde(from = "String")]
pub enum RTCStatsIceCandidatePairState {
    /// State has not been set, or is not one this crate knows about.
    #[default]
    Unspecified,

    /// Connectivity checks have not started for this pair.
    Frozen,

    /// Connectivity checks are waiting to be performed.
    Waiting,

    /// Connectivity checks are in progress.
    InProgress,

    /// Connectivity checks have failed for this pair.
    Failed,

    /// Connectivity checks have succeeded for this pair.
    Succeeded,
}

impl From<&str> for RTCStatsIceCandidatePairState {
    fn from(raw: &str) -> Self {
        match raw {
            "frozen" => RTCStatsIceCandidatePairState::Frozen,
            "waiting" => RTCStatsIceCandidatePairState::Waiting,
            "in-progress" => RTCStatsIceCandidatePairState::InProgress,
            "failed" => RTCStatsIceCandidatePairState::Failed,
            "succeeded" => RTCStatsIceCandidatePairState::Succeeded,
            _ => RTCStatsIceCandidatePairState::Unspecified,
        }
    }
}

impl From<String> for RTCStatsIceCandidatePairState {
    fn from(raw: String) -> Self {
        RTCStatsIceCandidatePairState::from(raw.as_str())
    }
}

/// Statistics for an ICE candidate pair.
///
/// # W3C Reference
///
/// See [RTCIceCandidatePairStats](https://www.w3.org/TR/webrtc-stats/#candidatepair-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCIceCandidatePairStats {
    /// Base statistics fields (timestamp, id).
    #[serde(flatten)]
    pub stats: RTCStats,

    /// The ID of the transport this candidate pair belongs to.
    pub transport_id: Option<String>,

    /// The ID of the local candidate in this pair.
    pub local_candidate_id: Option<String>,

    /// The ID of the remote candidate in this pair.
    pub remote_candidate_id: Option<String>,

    /// Current state of the candidate pair.
    #[serde(default)]
    pub state: RTCStatsIceCandidatePairState,

    /// Whether this candidate pair has been nominated.
    #[serde(default)]
    pub nominated: bool,

    /// Legacy, non-standard flag still emitted by Firefox for the pair in use.
    pub selected: Option<bool>,

    /// Total number of packets sent using this candidate pair.
    pub packets_sent: Option<u64>,

    /// Total number of packets received using this candidate pair.
    pub packets_received: Option<u64>,

    /// Total number of bytes sent using this candidate pair.
    pub bytes_sent: Option<u64>,

    /// Total number of bytes received using this candidate pair.
    pub bytes_received: Option<u64>,

    /// Total round trip time in seconds for all STUN requests.
    pub total_round_trip_time: Option<f64>,

    /// The most recent round trip time measurement in seconds.
    pub current_round_trip_time: Option<f64>,

    /// Number of STUN connectivity check requests sent.
    pub requests_sent: Option<u64>,

    /// Number of STUN connectivity check responses received.
    pub responses_received: Option<u64>,

    /// Number of packets discarded due to send errors.
    pub packets_discarded_on_send: Option<u64>,

    /// Number of bytes discarded due to send errors.
    pub bytes_discarded_on_send: Option<u64>,

    /// Estimated available outgoing bitrate in bits per second.
    pub available_outgoing_bitrate: Option<f64>,
}

/// Statistics for a local or remote ICE candidate.
///
/// # W3C Reference
///
/// See [RTCIceCandidateStats](https://www.w3.org/TR/webrtc-stats/#icecandidate-dict*)
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCIceCandidateStats {
    /// General Stats Fields
    #[serde(flatten)]
    pub stats: RTCStats,

    /// The transport ID this candidate belongs to.
    pub transport_id: Option<String>,
    /// The IP address of the candidate. `"(redacted)"` or empty when hidden.
    pub address: Option<String>,
    /// Pre-standard name of `address`, still sent by older browsers.
    pub ip: Option<String>,
    /// The port number of the candidate.
    pub port: Option<u16>,
    /// The protocol used (udp/tcp).
    pub protocol: Option<String>,
    /// The type of candidate (host, srflx, prflx, relay).
    pub candidate_type: Option<String>,
    /// The type of network interface (wifi, ethernet, cellular, ...).
    pub network_type: Option<String>,
    /// The relay protocol used for TURN candidates.
    pub relay_protocol: Option<String>,
}

/// Transport statistics.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCTransportStats {
    #[serde(flatten)]
    pub stats: RTCStats,

    pub bytes_sent: Option<u64>,
    pub bytes_received: Option<u64>,
    pub ice_state: Option<String>,
    pub dtls_state: Option<String>,
    pub selected_candidate_pair_id: Option<String>,
}
