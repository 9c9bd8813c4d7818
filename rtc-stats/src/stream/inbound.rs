use super::{MediaStreamReport, StreamState, StreamStats};
use crate::error::Result;
use crate::report::rtp_stream::{RTCInboundRtpStreamStats, RTCRemoteOutboundRtpStreamStats};
use crate::util::{counter_delta, loss_ratio, signed_delta};

/// State of a locally received RTP stream.
#[derive(Debug, Clone)]
pub struct InboundStreamState {
    stream: StreamState,
    bytes_received: Option<u64>,
    packets_received: Option<u64>,
    packets_lost: Option<i64>,
}

impl InboundStreamState {
    pub fn new(report: &RTCInboundRtpStreamStats) -> Result<Self> {
        Ok(InboundStreamState {
            stream: StreamState::new(report)?,
            bytes_received: report.bytes_received,
            packets_received: report.packets_received,
            packets_lost: report.packets_lost,
        })
    }

    pub fn stream(&self) -> &StreamState {
        &self.stream
    }

    /// Derives the rates since the previous report of this stream.
    ///
    /// `remote` is the sender's view of the stream. It is accepted so callers
    /// validate the link, but no rate depends on it yet.
    pub fn update(
        &mut self,
        report: &RTCInboundRtpStreamStats,
        _remote: Option<&RTCRemoteOutboundRtpStreamStats>,
    ) -> Result<StreamStats> {
        let dt = self.stream.check(report)?;

        let mut stats = StreamStats {
            timestamp: report.timestamp(),
            ..Default::default()
        };

        stats.bit_rate =
            counter_delta(report.bytes_received, self.bytes_received).map(|bytes| 8.0 * bytes / dt);

        let packets = counter_delta(report.packets_received, self.packets_received);
        stats.packet_rate = packets.map(|packets| packets / dt);

        let lost = signed_delta(report.packets_lost, self.packets_lost);
        stats.packet_loss = packets
            .zip(lost)
            .map(|(packets, lost)| loss_ratio(lost, packets + lost));

        stats.jitter = report.jitter;

        self.stream.update_media(report, dt, &mut stats);

        self.bytes_received = report.bytes_received;
        self.packets_received = report.packets_received;
        self.packets_lost = report.packets_lost;

        Ok(stats)
    }
}
