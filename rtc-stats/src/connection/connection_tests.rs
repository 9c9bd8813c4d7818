//! End to end tests of the snapshot pipeline.
//!
//! These tests feed sequences of snapshots, shaped like those of a browser
//! in a call, through `ConnectionStats` and check the emitted events.

use super::*;
use crate::configuration::RTCStatsConfigurationBuilder;
use crate::report::RTCStats;
use crate::report::ice::RTCTransportStats;
use crate::report::rtp_stream::{
    RTCInboundRtpStreamStats, RTCOutboundRtpStreamStats, RTCRtpStreamStats,
};
use crate::stream::RTCMediaKind;
use sansio::Protocol;
use std::time::Duration;

fn base(id: &str, timestamp: f64) -> RTCStats {
    RTCStats {
        id: id.to_owned(),
        timestamp,
    }
}

fn rtp(id: &str, timestamp: f64, kind: &str) -> RTCRtpStreamStats {
    RTCRtpStreamStats {
        stats: base(id, timestamp),
        kind: kind.to_owned(),
        ..Default::default()
    }
}

fn inbound(id: &str, timestamp: f64, kind: &str, bytes: u64) -> RTCStatsReportEntry {
    RTCStatsReportEntry::InboundRtp(RTCInboundRtpStreamStats {
        rtp_stream_stats: rtp(id, timestamp, kind),
        bytes_received: Some(bytes),
        packets_received: Some(bytes / 100),
        packets_lost: Some(0),
        ..Default::default()
    })
}

fn outbound(
    id: &str,
    timestamp: f64,
    bytes: u64,
    packets: u64,
    remote_id: &str,
) -> RTCStatsReportEntry {
    RTCStatsReportEntry::OutboundRtp(RTCOutboundRtpStreamStats {
        rtp_stream_stats: rtp(id, timestamp, "video"),
        remote_id: Some(remote_id.to_owned()),
        bytes_sent: Some(bytes),
        packets_sent: Some(packets),
        ..Default::default()
    })
}

fn remote_inbound(id: &str, timestamp: f64, lost: i64, rtt: f64) -> RTCStatsReportEntry {
    RTCStatsReportEntry::RemoteInboundRtp(RTCRemoteInboundRtpStreamStats {
        rtp_stream_stats: rtp(id, timestamp, "video"),
        packets_lost: Some(lost),
        round_trip_time: Some(rtt),
        ..Default::default()
    })
}

fn pair(id: &str, timestamp: f64) -> RTCIceCandidatePairStats {
    RTCIceCandidatePairStats {
        stats: base(id, timestamp),
        transport_id: Some("T01".to_owned()),
        local_candidate_id: Some("L1".to_owned()),
        remote_candidate_id: Some("R1".to_owned()),
        state: RTCStatsIceCandidatePairState::Succeeded,
        nominated: true,
        bytes_sent: Some(timestamp as u64 * 10),
        bytes_received: Some(timestamp as u64 * 20),
        ..Default::default()
    }
}

fn transport(timestamp: f64, selected: &str) -> RTCStatsReportEntry {
    RTCStatsReportEntry::Transport(RTCTransportStats {
        stats: base("T01", timestamp),
        selected_candidate_pair_id: Some(selected.to_owned()),
        ..Default::default()
    })
}

fn candidates(timestamp: f64) -> Vec<RTCStatsReportEntry> {
    vec![
        RTCStatsReportEntry::LocalCandidate(RTCIceCandidateStats {
            stats: base("L1", timestamp),
            address: Some("(redacted)".to_owned()),
            port: Some(50000),
            protocol: Some("udp".to_owned()),
            ..Default::default()
        }),
        RTCStatsReportEntry::RemoteCandidate(RTCIceCandidateStats {
            stats: base("R1", timestamp),
            address: Some("203.0.113.50".to_owned()),
            port: Some(60000),
            protocol: Some("udp".to_owned()),
            ..Default::default()
        }),
    ]
}

/// A snapshot whose transport selects `CP1`, plus `streams`.
fn snapshot(timestamp: f64, streams: Vec<RTCStatsReportEntry>) -> RTCStatsReport {
    let mut entries = vec![
        transport(timestamp, "CP1"),
        RTCStatsReportEntry::CandidatePair(pair("CP1", timestamp)),
    ];
    entries.extend(candidates(timestamp));
    entries.extend(streams);
    RTCStatsReport::new(entries)
}

#[test]
fn test_inbound_bit_rate_scenario() {
    let mut stats = ConnectionStats::default();

    let first = snapshot(1000.0, vec![inbound("A", 1000.0, "video", 1000)]);
    assert_eq!(stats.update(&first).unwrap(), None);
    assert!(stats.inbound("A").is_some());

    let second = snapshot(2000.0, vec![inbound("A", 2000.0, "video", 9000)]);
    let event = stats.update(&second).unwrap().expect("selected pair");

    let inbound = event.inbound.expect("inbound stats");
    assert_eq!(inbound.bit_rate, Some(64000.0));
    assert_eq!(inbound.packet_rate, Some(80.0));
    assert_eq!(inbound.packet_loss, Some(0.0));
    assert_eq!(inbound.timestamp, 2000.0);
    assert_eq!(event.outbound, None);

    assert_eq!(event.connection.id, "CP1");
    assert_eq!(event.connection.bit_rate_up, Some(80000.0));
    assert_eq!(event.connection.bit_rate_down, Some(160000.0));
    let local = event.connection.local.expect("local endpoint");
    assert_eq!(local.address, None);
    assert_eq!(local.port, 50000);
    let remote = event.connection.remote.expect("remote endpoint");
    assert_eq!(remote.address.as_deref(), Some("203.0.113.50"));
}

#[test]
fn test_first_sighting_emits_no_stream_stats() {
    let mut stats = ConnectionStats::default();
    stats.update(&snapshot(1000.0, vec![])).unwrap();

    let event = stats
        .update(&snapshot(2000.0, vec![inbound("A", 2000.0, "audio", 5000)]))
        .unwrap()
        .expect("selected pair");
    assert_eq!(event.inbound, None);
    assert_eq!(stats.tracked(), (1, 1, 0));
}

#[test]
fn test_no_eligible_candidate_pair() {
    let mut stats = ConnectionStats::default();

    let build = |timestamp: f64| {
        let mut not_nominated = pair("CP1", timestamp);
        not_nominated.nominated = false;
        let mut in_progress = pair("CP2", timestamp);
        in_progress.state = RTCStatsIceCandidatePairState::InProgress;
        RTCStatsReport::new(vec![
            transport(timestamp, "CP1"),
            RTCStatsReportEntry::CandidatePair(not_nominated),
            RTCStatsReportEntry::CandidatePair(in_progress),
            inbound("A", timestamp, "video", timestamp as u64),
        ])
    };

    assert_eq!(stats.update(&build(1000.0)).unwrap(), None);
    assert_eq!(stats.update(&build(2000.0)).unwrap(), None);
    assert_eq!(stats.tracked(), (0, 1, 0));
}

#[test]
fn test_no_selected_candidate_pair() {
    let mut stats = ConnectionStats::default();
    let build = |timestamp: f64| {
        RTCStatsReport::new(vec![
            transport(timestamp, "CP9"),
            RTCStatsReportEntry::CandidatePair(pair("CP1", timestamp)),
        ])
    };

    assert_eq!(stats.update(&build(1000.0)).unwrap(), None);
    assert_eq!(stats.update(&build(2000.0)).unwrap(), None);
    assert!(stats.candidate_pair("CP1").is_some());
}

#[test]
fn test_simulcast_outbound_aggregation() {
    let mut stats = ConnectionStats::default();

    stats
        .update(&snapshot(
            1000.0,
            vec![
                outbound("OT-q", 1000.0, 0, 0, "RI-q"),
                remote_inbound("RI-q", 900.0, 0, 0.04),
                outbound("OT-h", 1000.0, 0, 0, "RI-h"),
                remote_inbound("RI-h", 900.0, 0, 0.05),
            ],
        ))
        .unwrap();

    let event = stats
        .update(&snapshot(
            2000.0,
            vec![
                outbound("OT-q", 2000.0, 25_000, 100, "RI-q"),
                remote_inbound("RI-q", 1900.0, 10, 0.04),
                outbound("OT-h", 2000.0, 125_000, 400, "RI-h"),
                remote_inbound("RI-h", 1900.0, 20, 0.05),
            ],
        ))
        .unwrap()
        .expect("selected pair");

    let outbound = event.outbound.expect("outbound stats");
    assert_eq!(outbound.bit_rate, Some(200_000.0 + 1_000_000.0));
    assert_eq!(outbound.packet_rate, Some(500.0));
    assert_eq!(outbound.packet_loss, Some(0.1));
    assert_eq!(outbound.round_trip_time, Some(0.05));
    assert_eq!(event.inbound, None);
}

#[test]
fn test_identical_snapshot_is_rejected() {
    let mut stats = ConnectionStats::default();
    let report = snapshot(
        1000.0,
        vec![
            inbound("A", 1000.0, "audio", 1000),
            outbound("B", 1000.0, 1000, 10, "RI-B"),
        ],
    );

    stats.update(&report).unwrap();
    assert_eq!(
        stats.update(&report),
        Err(Error::ErrStatsOutOfOrder {
            id: "A".to_owned(),
            previous: 1000.0,
            current: 1000.0,
        })
    );
}

#[test]
fn test_remote_type_mismatch() {
    let mut stats = ConnectionStats::default();
    let mut entry = RTCInboundRtpStreamStats {
        rtp_stream_stats: rtp("A", 1000.0, "video"),
        ..Default::default()
    };
    entry.remote_id = Some("T01".to_owned());

    assert_eq!(
        stats.update(&snapshot(1000.0, vec![RTCStatsReportEntry::InboundRtp(entry)])),
        Err(Error::ErrRemoteStatsTypeMismatch {
            id: "T01".to_owned(),
            expected: RTCStatsType::RemoteOutboundRTP,
            actual: "transport".to_owned(),
        })
    );

    let report = snapshot(
        1000.0,
        vec![
            outbound("B", 1000.0, 0, 0, "ROA"),
            RTCStatsReportEntry::RemoteOutboundRtp(RTCRemoteOutboundRtpStreamStats {
                rtp_stream_stats: rtp("ROA", 1000.0, "video"),
                ..Default::default()
            }),
        ],
    );
    assert!(matches!(
        stats.update(&report),
        Err(Error::ErrRemoteStatsTypeMismatch {
            expected: RTCStatsType::RemoteInboundRTP,
            ..
        })
    ));
}

#[test]
fn test_dangling_remote_id_is_ignored() {
    let mut stats = ConnectionStats::default();
    stats
        .update(&snapshot(1000.0, vec![outbound("B", 1000.0, 0, 0, "gone")]))
        .unwrap();
    let event = stats
        .update(&snapshot(2000.0, vec![outbound("B", 2000.0, 1000, 10, "gone")]))
        .unwrap()
        .expect("selected pair");

    let outbound = event.outbound.expect("outbound stats");
    assert_eq!(outbound.bit_rate, Some(8000.0));
    assert_eq!(outbound.packet_loss, None);
    assert_eq!(outbound.round_trip_time, None);
}

#[test]
fn test_kind_change_is_rejected() {
    let mut stats = ConnectionStats::default();
    stats
        .update(&snapshot(1000.0, vec![inbound("A", 1000.0, "audio", 0)]))
        .unwrap();

    assert_eq!(
        stats.update(&snapshot(2000.0, vec![inbound("A", 2000.0, "video", 10)])),
        Err(Error::ErrMediaKindMismatch {
            expected: RTCMediaKind::Audio,
            actual: "video".to_owned(),
        })
    );
}

#[test]
fn test_invalid_kind_is_rejected() {
    let mut stats = ConnectionStats::default();
    assert_eq!(
        stats.update(&snapshot(1000.0, vec![inbound("A", 1000.0, "", 0)])),
        Err(Error::ErrInvalidMediaKind(String::new()))
    );
}

#[test]
fn test_selection_by_legacy_flag() {
    let mut stats = ConnectionStats::default();
    let build = |timestamp: f64| {
        let mut legacy = pair("CP1", timestamp);
        legacy.transport_id = None;
        legacy.selected = Some(true);
        RTCStatsReport::new(vec![RTCStatsReportEntry::CandidatePair(legacy)])
    };

    stats.update(&build(1000.0)).unwrap();
    let event = stats.update(&build(2000.0)).unwrap().expect("selected pair");
    assert_eq!(event.connection.id, "CP1");
    assert_eq!(event.connection.local, None);
}

#[test]
fn test_multiple_selected_pairs_last_wins() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut stats = ConnectionStats::default();
    let build = |timestamp: f64| {
        let mut legacy = pair("CP2", timestamp);
        legacy.selected = Some(true);
        let mut entries = vec![
            transport(timestamp, "CP1"),
            RTCStatsReportEntry::CandidatePair(pair("CP1", timestamp)),
            RTCStatsReportEntry::CandidatePair(legacy),
        ];
        entries.extend(candidates(timestamp));
        RTCStatsReport::new(entries)
    };

    stats.update(&build(1000.0)).unwrap();
    let event = stats.update(&build(2000.0)).unwrap().expect("selected pair");
    assert_eq!(event.connection.id, "CP2");
    assert_eq!(stats.tracked(), (2, 0, 0));
}

#[test]
fn test_stale_entries_are_evicted() {
    let mut stats = ConnectionStats::default();
    stats
        .update(&snapshot(
            1000.0,
            vec![
                inbound("A", 1000.0, "audio", 0),
                inbound("B", 1000.0, "video", 0),
            ],
        ))
        .unwrap();
    assert_eq!(stats.tracked(), (1, 2, 0));

    stats
        .update(&snapshot(2000.0, vec![inbound("A", 2000.0, "audio", 100)]))
        .unwrap();
    assert_eq!(stats.tracked(), (1, 1, 0));
    assert!(stats.inbound("B").is_none());

    // a returning id starts over
    let event = stats
        .update(&snapshot(
            3000.0,
            vec![
                inbound("A", 3000.0, "audio", 200),
                inbound("B", 3000.0, "video", 500),
            ],
        ))
        .unwrap()
        .expect("selected pair");
    assert_eq!(event.inbound.and_then(|s| s.bit_rate), Some(800.0));
}

#[test]
fn test_stale_entries_are_kept_without_eviction() {
    let config = RTCStatsConfigurationBuilder::new()
        .with_evict_stale_entries(false)
        .build();
    let mut stats = ConnectionStats::new(config);

    stats
        .update(&snapshot(
            1000.0,
            vec![
                inbound("A", 1000.0, "audio", 0),
                inbound("B", 1000.0, "video", 0),
            ],
        ))
        .unwrap();
    stats.update(&RTCStatsReport::default()).unwrap();
    assert_eq!(stats.tracked(), (1, 2, 0));
}

#[test]
fn test_event_json() {
    let mut stats = ConnectionStats::default();
    stats
        .update(&snapshot(1000.0, vec![inbound("A", 1000.0, "video", 1000)]))
        .unwrap();
    let event = stats
        .update(&snapshot(2000.0, vec![inbound("A", 2000.0, "video", 9000)]))
        .unwrap()
        .expect("selected pair");

    let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
    assert_eq!(json["inbound"]["bitRate"], 64000.0);
    assert_eq!(json["connection"]["id"], "CP1");
    assert_eq!(json["connection"]["local"]["address"], serde_json::Value::Null);
    assert_eq!(json["connection"]["remote"]["port"], 60000);
    assert_eq!(json["outbound"], serde_json::Value::Null);
}

#[test]
fn test_protocol_flow() {
    let mut stats = ConnectionStats::new(
        RTCStatsConfigurationBuilder::new()
            .with_polling_interval(Duration::from_millis(2000))
            .build(),
    );
    let now = Instant::now();

    assert_eq!(stats.poll_timeout(), None);
    stats.handle_timeout(now).unwrap();
    assert_eq!(stats.poll_timeout(), Some(now + Duration::from_millis(2000)));

    stats
        .handle_read(snapshot(1000.0, vec![inbound("A", 1000.0, "video", 1000)]))
        .unwrap();
    assert!(stats.poll_event().is_none());

    stats
        .handle_read(snapshot(3000.0, vec![inbound("A", 3000.0, "video", 9000)]))
        .unwrap();
    let event = stats.poll_event().expect("stats event");
    assert_eq!(event.inbound.and_then(|s| s.bit_rate), Some(32000.0));
    assert!(stats.poll_event().is_none());
    assert!(stats.poll_read().is_none());
    assert!(stats.poll_write().is_none());

    stats.close().unwrap();
    assert_eq!(stats.tracked(), (0, 0, 0));
    assert_eq!(stats.poll_timeout(), None);
    assert_eq!(
        stats.handle_read(RTCStatsReport::default()),
        Err(Error::ErrClosed)
    );
    assert_eq!(stats.close(), Err(Error::ErrClosed));
}
