use crate::stream::StreamStats;

/// Combines the stats of all streams of one direction.
///
/// Rates and per-interval counts of simultaneous streams (e.g. simulcast
/// layers) add up; ratios, latencies and frame properties report the largest
/// value.
pub(super) fn aggregate(streams: &[StreamStats]) -> Option<StreamStats> {
    if streams.is_empty() {
        return None;
    }

    Some(StreamStats {
        timestamp: streams
            .iter()
            .map(|s| s.timestamp)
            .fold(f64::NEG_INFINITY, f64::max),
        bit_rate: sum(streams, |s| s.bit_rate),
        packet_rate: sum(streams, |s| s.packet_rate),
        coding_time: sum(streams, |s| s.coding_time),
        frame_skip: sum(streams, |s| s.frame_skip),
        picture_loss: sum(streams, |s| s.picture_loss),
        nack_packets: sum(streams, |s| s.nack_packets),
        packet_loss: max(streams, |s| s.packet_loss),
        frame_rate: max(streams, |s| s.frame_rate),
        jitter: max(streams, |s| s.jitter),
        round_trip_time: max(streams, |s| s.round_trip_time),
        retransmit_ratio: max(streams, |s| s.retransmit_ratio),
        frame_width: streams.iter().filter_map(|s| s.frame_width).max(),
        frame_height: streams.iter().filter_map(|s| s.frame_height).max(),
    })
}

fn sum(streams: &[StreamStats], field: impl Fn(&StreamStats) -> Option<f64>) -> Option<f64> {
    streams.iter().filter_map(field).reduce(|a, b| a + b)
}

fn max(streams: &[StreamStats], field: impl Fn(&StreamStats) -> Option<f64>) -> Option<f64> {
    streams.iter().filter_map(field).reduce(f64::max)
}
