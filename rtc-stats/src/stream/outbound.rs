use super::{MediaStreamReport, StreamState, StreamStats};
use crate::error::Result;
use crate::report::rtp_stream::{RTCOutboundRtpStreamStats, RTCRemoteInboundRtpStreamStats};
use crate::util::{counter_delta, signed_delta};

/// State of a locally sent RTP stream.
///
/// Loss, jitter and round trip time come from the receiver's RTCP reports,
/// surfaced by the browser as the paired `remote-inbound-rtp` stats.
#[derive(Debug, Clone)]
pub struct OutboundStreamState {
    stream: StreamState,
    bytes_sent: Option<u64>,
    packets_sent: Option<u64>,
    retransmitted_packets_sent: Option<u64>,
    packets_lost: Option<i64>,
}

impl OutboundStreamState {
    pub fn new(
        report: &RTCOutboundRtpStreamStats,
        remote: Option<&RTCRemoteInboundRtpStreamStats>,
    ) -> Result<Self> {
        Ok(OutboundStreamState {
            stream: StreamState::new(report)?,
            bytes_sent: report.bytes_sent,
            packets_sent: report.packets_sent,
            retransmitted_packets_sent: report.retransmitted_packets_sent,
            packets_lost: remote.and_then(|r| r.packets_lost),
        })
    }

    pub fn stream(&self) -> &StreamState {
        &self.stream
    }

    /// Derives the rates since the previous report of this stream.
    pub fn update(
        &mut self,
        report: &RTCOutboundRtpStreamStats,
        remote: Option<&RTCRemoteInboundRtpStreamStats>,
    ) -> Result<StreamStats> {
        let dt = self.stream.check(report)?;

        let mut stats = StreamStats {
            timestamp: report.timestamp(),
            ..Default::default()
        };

        stats.bit_rate =
            counter_delta(report.bytes_sent, self.bytes_sent).map(|bytes| 8.0 * bytes / dt);

        let packets = counter_delta(report.packets_sent, self.packets_sent);
        stats.packet_rate = packets.map(|packets| packets / dt);

        let packets_lost = remote.and_then(|r| r.packets_lost);
        if let Some(packets) = packets.filter(|packets| *packets > 0.0) {
            stats.packet_loss =
                signed_delta(packets_lost, self.packets_lost).map(|lost| lost / packets);
            stats.retransmit_ratio = counter_delta(
                report.retransmitted_packets_sent,
                self.retransmitted_packets_sent,
            )
            .map(|retransmitted| retransmitted / packets);
        }

        stats.jitter = remote.and_then(|r| r.jitter);
        stats.round_trip_time = remote.and_then(|r| r.round_trip_time);

        self.stream.update_media(report, dt, &mut stats);

        self.bytes_sent = report.bytes_sent;
        self.packets_sent = report.packets_sent;
        self.retransmitted_packets_sent = report.retransmitted_packets_sent;
        self.packets_lost = packets_lost;

        Ok(stats)
    }
}
