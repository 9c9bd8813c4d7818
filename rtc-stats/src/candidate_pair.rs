//! State of the ICE candidate pair carrying the connection.

use crate::report::ice::{RTCIceCandidatePairStats, RTCIceCandidateStats};
use crate::util::{counter_delta, float_delta, loss_ratio};
use serde::Serialize;

/// Placeholder browsers put in `address` when host candidates are hidden.
const REDACTED_ADDRESS: &str = "(redacted)";

/// One end of a candidate pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEndpoint {
    /// `None` when the browser redacted the address.
    pub address: Option<String>,
    pub port: u16,
    pub protocol: String,
    pub candidate_type: Option<String>,
    pub network_type: Option<String>,
}

impl NetworkEndpoint {
    /// Decodes a candidate; `None` unless both port and protocol are known.
    pub fn from_candidate(candidate: &RTCIceCandidateStats) -> Option<Self> {
        let port = candidate.port?;
        let protocol = candidate.protocol.clone()?;
        let address = candidate
            .address
            .as_deref()
            .or(candidate.ip.as_deref())
            .filter(|address| !address.is_empty() && *address != REDACTED_ADDRESS)
            .map(str::to_owned);

        Some(NetworkEndpoint {
            address,
            port,
            protocol,
            candidate_type: candidate.candidate_type.clone(),
            network_type: candidate.network_type.clone(),
        })
    }
}

/// Connection level rates derived from a candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePairStats {
    pub id: String,
    /// Timestamp of the report the rates were derived from, in milliseconds.
    pub timestamp: f64,
    pub local: Option<NetworkEndpoint>,
    pub remote: Option<NetworkEndpoint>,
    /// Received bits per second.
    pub bit_rate_down: Option<f64>,
    /// Sent bits per second.
    pub bit_rate_up: Option<f64>,
    /// Average STUN round trip time in seconds.
    pub avg_rtt: Option<f64>,
    /// Fraction of packets discarded on send.
    pub packet_loss: Option<f64>,
    /// Fraction of bytes discarded on send.
    pub data_loss: Option<f64>,
}

/// Cumulative counters of a candidate pair as of the last snapshot.
#[derive(Debug, Clone)]
pub struct CandidatePairState {
    id: String,
    timestamp: f64,
    local: Option<NetworkEndpoint>,
    remote: Option<NetworkEndpoint>,
    bytes_received: Option<u64>,
    bytes_sent: Option<u64>,
    total_round_trip_time: Option<f64>,
    responses_received: Option<u64>,
    packets_sent: Option<u64>,
    packets_discarded_on_send: Option<u64>,
    bytes_discarded_on_send: Option<u64>,
}

impl CandidatePairState {
    /// Creates the state from the first report seen for a pair, together with
    /// the candidates it references.
    pub fn new(
        report: &RTCIceCandidatePairStats,
        local: Option<&RTCIceCandidateStats>,
        remote: Option<&RTCIceCandidateStats>,
    ) -> Self {
        CandidatePairState {
            id: report.stats.id.clone(),
            timestamp: report.stats.timestamp,
            local: local.and_then(NetworkEndpoint::from_candidate),
            remote: remote.and_then(NetworkEndpoint::from_candidate),
            bytes_received: report.bytes_received,
            bytes_sent: report.bytes_sent,
            total_round_trip_time: report.total_round_trip_time,
            responses_received: report.responses_received,
            packets_sent: report.packets_sent,
            packets_discarded_on_send: report.packets_discarded_on_send,
            bytes_discarded_on_send: report.bytes_discarded_on_send,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn local(&self) -> Option<&NetworkEndpoint> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> Option<&NetworkEndpoint> {
        self.remote.as_ref()
    }

    /// Derives the connection rates since the previous report of this pair.
    ///
    /// Rates and data loss are left out when the timestamp did not advance.
    pub fn update(&mut self, report: &RTCIceCandidatePairStats) -> CandidatePairStats {
        let dt = (report.stats.timestamp - self.timestamp) / 1000.0;

        let mut stats = CandidatePairStats {
            id: self.id.clone(),
            timestamp: report.stats.timestamp,
            local: self.local.clone(),
            remote: self.remote.clone(),
            bit_rate_down: None,
            bit_rate_up: None,
            avg_rtt: None,
            packet_loss: None,
            data_loss: None,
        };

        let bytes_received = counter_delta(report.bytes_received, self.bytes_received);
        let bytes_sent = counter_delta(report.bytes_sent, self.bytes_sent);
        let bytes_sent = match (bytes_received, bytes_sent) {
            (Some(received), Some(sent)) if dt > 0.0 => {
                stats.bit_rate_down = Some(8.0 * received / dt);
                stats.bit_rate_up = Some(8.0 * sent / dt);
                Some(sent)
            }
            _ => None,
        };

        let responses = counter_delta(report.responses_received, self.responses_received);
        let total_rtt = float_delta(report.total_round_trip_time, self.total_round_trip_time);
        stats.avg_rtt = match (responses, total_rtt) {
            (Some(responses), Some(total_rtt)) if responses > 0.0 => Some(total_rtt / responses),
            _ => report.current_round_trip_time,
        };

        let packets_sent = counter_delta(report.packets_sent, self.packets_sent);
        let packets_discarded = counter_delta(
            report.packets_discarded_on_send,
            self.packets_discarded_on_send,
        );
        stats.packet_loss = packets_sent
            .zip(packets_discarded)
            .map(|(sent, discarded)| loss_ratio(discarded, sent + discarded));

        let bytes_discarded =
            counter_delta(report.bytes_discarded_on_send, self.bytes_discarded_on_send);
        stats.data_loss = bytes_sent
            .zip(bytes_discarded)
            .map(|(sent, discarded)| loss_ratio(discarded, sent + discarded));

        self.timestamp = report.stats.timestamp;
        self.bytes_received = report.bytes_received;
        self.bytes_sent = report.bytes_sent;
        self.total_round_trip_time = report.total_round_trip_time;
        self.responses_received = report.responses_received;
        self.packets_sent = report.packets_sent;
        self.packets_discarded_on_send = report.packets_discarded_on_send;
        self.bytes_discarded_on_send = report.bytes_discarded_on_send;

        stats
    }
}
