//! Per peer connection statistics aggregation.
//!
//! [`ConnectionStats`] consumes one [`RTCStatsReport`] per polling interval,
//! keeps the state of every tracked stream and candidate pair, and produces
//! a [`StatsEvent`] describing the interval.

mod aggregate;
mod handler;

#[cfg(test)]
mod connection_tests;

use crate::candidate_pair::{CandidatePairState, CandidatePairStats};
use crate::configuration::RTCStatsConfiguration;
use crate::error::{Error, Result};
use crate::report::ice::{
    RTCIceCandidatePairStats, RTCIceCandidateStats, RTCStatsIceCandidatePairState,
};
use crate::report::rtp_stream::{RTCRemoteInboundRtpStreamStats, RTCRemoteOutboundRtpStreamStats};
use crate::report::{RTCStatsReport, RTCStatsReportEntry, RTCStatsType};
use crate::stream::{InboundStreamState, OutboundStreamState, StreamStats};
use aggregate::aggregate;
use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

/// Rates of one polling interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsEvent {
    /// The selected candidate pair.
    pub connection: CandidatePairStats,
    /// All inbound streams of the interval combined, if any were seen.
    pub inbound: Option<StreamStats>,
    /// All outbound streams of the interval combined, if any were seen.
    pub outbound: Option<StreamStats>,
}

impl StatsEvent {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Statistics aggregator for one peer connection.
///
/// # Design
///
/// - Each `update` differences the snapshot against the state kept from the
///   previous one; the first sighting of an id only records its counters
/// - Stream states reject reports whose kind changed or whose timestamp did
///   not advance
/// - Only nominated, succeeded candidate pairs are tracked and exactly one
///   of them is reported per interval
///
/// # Thread Safety
///
/// This struct is not thread-safe. It is meant to be owned by whatever
/// drives the polling loop.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    config: RTCStatsConfiguration,

    candidates: HashMap<String, CandidatePairState>,
    inbound: HashMap<String, InboundStreamState>,
    outbound: HashMap<String, OutboundStreamState>,

    events: VecDeque<StatsEvent>,
    last_poll: Option<Instant>,
    closed: bool,
}

impl ConnectionStats {
    pub fn new(config: RTCStatsConfiguration) -> Self {
        ConnectionStats {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &RTCStatsConfiguration {
        &self.config
    }

    pub fn candidate_pair(&self, id: &str) -> Option<&CandidatePairState> {
        self.candidates.get(id)
    }

    pub fn inbound(&self, id: &str) -> Option<&InboundStreamState> {
        self.inbound.get(id)
    }

    pub fn outbound(&self, id: &str) -> Option<&OutboundStreamState> {
        self.outbound.get(id)
    }

    /// Number of tracked candidate pairs, inbound and outbound streams.
    pub fn tracked(&self) -> (usize, usize, usize) {
        (self.candidates.len(), self.inbound.len(), self.outbound.len())
    }

    /// Processes one snapshot.
    ///
    /// Returns `Ok(None)` when no candidate pair is selected, which is normal
    /// on the first snapshot and while ICE is (re)negotiating.
    ///
    /// # Errors
    ///
    /// A stream whose kind changed, a stream report that did not advance in
    /// time, or a `remoteId` pointing at a stats object of the wrong type.
    /// Entries processed before the failing one keep their updated state.
    pub fn update(&mut self, report: &RTCStatsReport) -> Result<Option<StatsEvent>> {
        let mut seen = HashSet::new();
        let mut inbound = vec![];
        let mut outbound = vec![];
        let mut selected: Option<CandidatePairStats> = None;

        for (id, entry) in report.entries() {
            match entry {
                RTCStatsReportEntry::InboundRtp(stats) => {
                    let remote = remote_outbound(report, stats.remote_id.as_deref())?;
                    seen.insert(id);
                    match self.inbound.entry(id.to_owned()) {
                        Entry::Occupied(mut state) => {
                            inbound.push(state.get_mut().update(stats, remote)?);
                        }
                        Entry::Vacant(state) => {
                            trace!("tracking inbound stream {id}");
                            state.insert(InboundStreamState::new(stats)?);
                        }
                    }
                }
                RTCStatsReportEntry::OutboundRtp(stats) => {
                    let remote = remote_inbound(report, stats.remote_id.as_deref())?;
                    seen.insert(id);
                    match self.outbound.entry(id.to_owned()) {
                        Entry::Occupied(mut state) => {
                            outbound.push(state.get_mut().update(stats, remote)?);
                        }
                        Entry::Vacant(state) => {
                            trace!("tracking outbound stream {id}");
                            state.insert(OutboundStreamState::new(stats, remote)?);
                        }
                    }
                }
                RTCStatsReportEntry::CandidatePair(stats) => {
                    if !stats.nominated || stats.state != RTCStatsIceCandidatePairState::Succeeded
                    {
                        continue;
                    }
                    seen.insert(id);
                    let pair = match self.candidates.entry(id.to_owned()) {
                        Entry::Occupied(state) => state.into_mut().update(stats),
                        Entry::Vacant(state) => {
                            trace!("tracking candidate pair {id}");
                            let local = candidate(report, stats.local_candidate_id.as_deref());
                            let remote = candidate(report, stats.remote_candidate_id.as_deref());
                            state.insert(CandidatePairState::new(stats, local, remote));
                            continue;
                        }
                    };

                    if is_selected(report, id, stats) {
                        if let Some(previous) = &selected {
                            warn!(
                                "candidate pairs {} and {id} are both selected, reporting {id}",
                                previous.id
                            );
                        }
                        selected = Some(pair);
                    }
                }
                RTCStatsReportEntry::RemoteInboundRtp(_)
                | RTCStatsReportEntry::RemoteOutboundRtp(_)
                | RTCStatsReportEntry::LocalCandidate(_)
                | RTCStatsReportEntry::RemoteCandidate(_)
                | RTCStatsReportEntry::Transport(_)
                | RTCStatsReportEntry::Unsupported(_) => {}
            }
        }

        if self.config.evict_stale_entries {
            self.evict(&seen);
        }

        let Some(connection) = selected else {
            debug!("no selected candidate pair in a report of {} entries", report.len());
            return Ok(None);
        };

        Ok(Some(StatsEvent {
            connection,
            inbound: aggregate(&inbound),
            outbound: aggregate(&outbound),
        }))
    }

    fn evict(&mut self, seen: &HashSet<&str>) {
        let before = self.tracked();
        self.candidates.retain(|id, _| seen.contains(id.as_str()));
        self.inbound.retain(|id, _| seen.contains(id.as_str()));
        self.outbound.retain(|id, _| seen.contains(id.as_str()));

        let after = self.tracked();
        if before != after {
            debug!(
                "evicted stale stats, tracked (pairs, inbound, outbound) {before:?} -> {after:?}"
            );
        }
    }

    fn reset(&mut self) {
        self.candidates.clear();
        self.inbound.clear();
        self.outbound.clear();
        self.events.clear();
        self.last_poll = None;
    }
}

/// Resolves the sender report paired with an inbound stream.
///
/// A dangling id is treated as absent; an id naming another type is an error.
fn remote_outbound<'a>(
    report: &'a RTCStatsReport,
    remote_id: Option<&str>,
) -> Result<Option<&'a RTCRemoteOutboundRtpStreamStats>> {
    let Some(remote_id) = remote_id else {
        return Ok(None);
    };
    match report.get(remote_id) {
        None => Ok(None),
        Some(RTCStatsReportEntry::RemoteOutboundRtp(stats)) => Ok(Some(stats)),
        Some(other) => Err(Error::ErrRemoteStatsTypeMismatch {
            id: remote_id.to_owned(),
            expected: RTCStatsType::RemoteOutboundRTP,
            actual: other.type_name().to_owned(),
        }),
    }
}

/// Resolves the receiver report paired with an outbound stream.
fn remote_inbound<'a>(
    report: &'a RTCStatsReport,
    remote_id: Option<&str>,
) -> Result<Option<&'a RTCRemoteInboundRtpStreamStats>> {
    let Some(remote_id) = remote_id else {
        return Ok(None);
    };
    match report.get(remote_id) {
        None => Ok(None),
        Some(RTCStatsReportEntry::RemoteInboundRtp(stats)) => Ok(Some(stats)),
        Some(other) => Err(Error::ErrRemoteStatsTypeMismatch {
            id: remote_id.to_owned(),
            expected: RTCStatsType::RemoteInboundRTP,
            actual: other.type_name().to_owned(),
        }),
    }
}

fn candidate<'a>(
    report: &'a RTCStatsReport,
    candidate_id: Option<&str>,
) -> Option<&'a RTCIceCandidateStats> {
    match report.get(candidate_id?)? {
        RTCStatsReportEntry::LocalCandidate(stats)
        | RTCStatsReportEntry::RemoteCandidate(stats) => Some(stats),
        _ => None,
    }
}

/// Firefox flags the pair in use with `selected`; the standard way is the
/// transport's `selectedCandidatePairId`.
fn is_selected(report: &RTCStatsReport, id: &str, pair: &RTCIceCandidatePairStats) -> bool {
    if pair.selected == Some(true) {
        return true;
    }

    let transport = pair.transport_id.as_deref().and_then(|transport_id| {
        match report.get(transport_id) {
            Some(RTCStatsReportEntry::Transport(transport)) => Some(transport),
            _ => None,
        }
    });
    transport.and_then(|t| t.selected_candidate_pair_id.as_deref()) == Some(id)
}
