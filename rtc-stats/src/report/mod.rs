//! WebRTC Statistics Report types.
//!
//! This module provides the [`RTCStatsReport`] type, a typed view of the
//! snapshot returned by `getStats()`, keyed by stats object id.

use crate::error::Result;
use ::serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use ::serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub mod ice;
pub mod rtp_stream;

use ice::{RTCIceCandidatePairStats, RTCIceCandidateStats, RTCTransportStats};
use rtp_stream::{
    RTCInboundRtpStreamStats, RTCOutboundRtpStreamStats, RTCRemoteInboundRtpStreamStats,
    RTCRemoteOutboundRtpStreamStats,
};

/// The type of statistics object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RTCStatsType {
    #[serde(rename = "inbound-rtp")]
    InboundRTP,
    #[serde(rename = "outbound-rtp")]
    OutboundRTP,
    #[serde(rename = "remote-inbound-rtp")]
    RemoteInboundRTP,
    #[serde(rename = "remote-outbound-rtp")]
    RemoteOutboundRTP,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "candidate-pair")]
    CandidatePair,
    #[serde(rename = "local-candidate")]
    LocalCandidate,
    #[serde(rename = "remote-candidate")]
    RemoteCandidate,
}

impl RTCStatsType {
    /// The W3C spelling of this type, as found in the `type` member.
    pub fn as_str(&self) -> &'static str {
        match self {
            RTCStatsType::InboundRTP => "inbound-rtp",
            RTCStatsType::OutboundRTP => "outbound-rtp",
            RTCStatsType::RemoteInboundRTP => "remote-inbound-rtp",
            RTCStatsType::RemoteOutboundRTP => "remote-outbound-rtp",
            RTCStatsType::Transport => "transport",
            RTCStatsType::CandidatePair => "candidate-pair",
            RTCStatsType::LocalCandidate => "local-candidate",
            RTCStatsType::RemoteCandidate => "remote-candidate",
        }
    }
}

impl fmt::Display for RTCStatsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base statistics object containing the fields every stats dictionary has.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct RTCStats {
    pub id: String,
    /// Milliseconds since an arbitrary, per-session epoch.
    pub timestamp: f64,
}

/// A stats object whose type is not interpreted by this crate
/// (codec, media-source, certificate, peer-connection, ...).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RTCUnsupportedStats {
    pub stats: RTCStats,
    pub typ: String,
}

/// An entry in the stats report representing a single statistics object.
#[derive(Debug, Clone)]
pub enum RTCStatsReportEntry {
    /// Inbound RTP stream statistics.
    InboundRtp(RTCInboundRtpStreamStats),
    /// Outbound RTP stream statistics.
    OutboundRtp(RTCOutboundRtpStreamStats),
    /// Remote inbound RTP stream statistics (from RTCP RR).
    RemoteInboundRtp(RTCRemoteInboundRtpStreamStats),
    /// Remote outbound RTP stream statistics (from RTCP SR).
    RemoteOutboundRtp(RTCRemoteOutboundRtpStreamStats),
    /// ICE candidate pair statistics.
    CandidatePair(RTCIceCandidatePairStats),
    /// Local ICE candidate statistics.
    LocalCandidate(RTCIceCandidateStats),
    /// Remote ICE candidate statistics.
    RemoteCandidate(RTCIceCandidateStats),
    /// Transport statistics.
    Transport(RTCTransportStats),
    /// Any other stats type.
    Unsupported(RTCUnsupportedStats),
}

impl RTCStatsReportEntry {
    /// Returns the stats type for this entry, `None` for unsupported types.
    pub fn stats_type(&self) -> Option<RTCStatsType> {
        match self {
            RTCStatsReportEntry::InboundRtp(_) => Some(RTCStatsType::InboundRTP),
            RTCStatsReportEntry::OutboundRtp(_) => Some(RTCStatsType::OutboundRTP),
            RTCStatsReportEntry::RemoteInboundRtp(_) => Some(RTCStatsType::RemoteInboundRTP),
            RTCStatsReportEntry::RemoteOutboundRtp(_) => Some(RTCStatsType::RemoteOutboundRTP),
            RTCStatsReportEntry::CandidatePair(_) => Some(RTCStatsType::CandidatePair),
            RTCStatsReportEntry::LocalCandidate(_) => Some(RTCStatsType::LocalCandidate),
            RTCStatsReportEntry::RemoteCandidate(_) => Some(RTCStatsType::RemoteCandidate),
            RTCStatsReportEntry::Transport(_) => Some(RTCStatsType::Transport),
            RTCStatsReportEntry::Unsupported(_) => None,
        }
    }

    /// Returns the `type` member as reported by the browser.
    pub fn type_name(&self) -> &str {
        match self {
            RTCStatsReportEntry::Unsupported(s) => &s.typ,
            _ => self.stats_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    /// Returns the base stats fields for this entry.
    pub fn stats(&self) -> &RTCStats {
        match self {
            RTCStatsReportEntry::InboundRtp(s) => &s.rtp_stream_stats.stats,
            RTCStatsReportEntry::OutboundRtp(s) => &s.rtp_stream_stats.stats,
            RTCStatsReportEntry::RemoteInboundRtp(s) => &s.rtp_stream_stats.stats,
            RTCStatsReportEntry::RemoteOutboundRtp(s) => &s.rtp_stream_stats.stats,
            RTCStatsReportEntry::CandidatePair(s) => &s.stats,
            RTCStatsReportEntry::LocalCandidate(s) => &s.stats,
            RTCStatsReportEntry::RemoteCandidate(s) => &s.stats,
            RTCStatsReportEntry::Transport(s) => &s.stats,
            RTCStatsReportEntry::Unsupported(s) => &s.stats,
        }
    }

    /// Returns the unique ID for this stats entry.
    pub fn id(&self) -> &str {
        &self.stats().id
    }
}

impl<'de> Deserialize<'de> for RTCStatsReportEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let typ = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let entry = match typ.as_str() {
            "inbound-rtp" => serde_json::from_value(value).map(RTCStatsReportEntry::InboundRtp),
            "outbound-rtp" => serde_json::from_value(value).map(RTCStatsReportEntry::OutboundRtp),
            "remote-inbound-rtp" => {
                serde_json::from_value(value).map(RTCStatsReportEntry::RemoteInboundRtp)
            }
            "remote-outbound-rtp" => {
                serde_json::from_value(value).map(RTCStatsReportEntry::RemoteOutboundRtp)
            }
            "candidate-pair" => {
                serde_json::from_value(value).map(RTCStatsReportEntry::CandidatePair)
            }
            "local-candidate" => {
                serde_json::from_value(value).map(RTCStatsReportEntry::LocalCandidate)
            }
            "remote-candidate" => {
                serde_json::from_value(value).map(RTCStatsReportEntry::RemoteCandidate)
            }
            "transport" => serde_json::from_value(value).map(RTCStatsReportEntry::Transport),
            _ => serde_json::from_value(value)
                .map(|stats| RTCStatsReportEntry::Unsupported(RTCUnsupportedStats { stats, typ })),
        };

        entry.map_err(de::Error::custom)
    }
}

/// A snapshot of statistics objects as returned by `getStats()`.
///
/// Map-like access keyed by stats id. Iteration follows the order in which
/// entries were inserted, which for parsed reports is document order.
///
/// # Example
///
/// ```
/// use rtc_stats::report::RTCStatsReport;
///
/// let report = RTCStatsReport::from_json(
///     r#"{"T01": {"id": "T01", "type": "transport", "timestamp": 1000}}"#,
/// )
/// .unwrap();
/// assert!(report.contains("T01"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct RTCStatsReport {
    /// The stats entries indexed by their unique ID.
    entries: HashMap<String, RTCStatsReportEntry>,
    /// Ordered list of entry IDs for iteration.
    order: Vec<String>,
}

impl RTCStatsReport {
    /// Creates a new stats report from a list of entries.
    pub fn new(entries: Vec<RTCStatsReportEntry>) -> Self {
        let mut report = Self::default();
        for entry in entries {
            report.insert(entry.id().to_owned(), entry);
        }
        report
    }

    /// Parses the JSON form of a `getStats()` result.
    ///
    /// Both an object keyed by stats id (`Object.fromEntries(report)`) and an
    /// array of stats objects (`[...report.values()]`) are accepted.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Inserts an entry under `id`, returning the entry it replaced.
    pub fn insert(
        &mut self,
        id: String,
        entry: RTCStatsReportEntry,
    ) -> Option<RTCStatsReportEntry> {
        let previous = self.entries.insert(id.clone(), entry);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Returns the number of stats entries in the report.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the report contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a stats entry by its unique ID.
    pub fn get(&self, id: &str) -> Option<&RTCStatsReportEntry> {
        self.entries.get(id)
    }

    /// Returns true if the report contains an entry with the given ID.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns an iterator over `(id, entry)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RTCStatsReportEntry)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id.as_str(), entry)))
    }

    /// Returns an iterator over all stats entries.
    pub fn iter(&self) -> impl Iterator<Item = &RTCStatsReportEntry> {
        self.entries().map(|(_, entry)| entry)
    }

    /// Returns an iterator over stats entries of a specific type.
    pub fn iter_by_type(&self, typ: RTCStatsType) -> impl Iterator<Item = &RTCStatsReportEntry> {
        self.iter().filter(move |e| e.stats_type() == Some(typ))
    }

    /// Returns an iterator over all entry IDs.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }
}

impl<'de> Deserialize<'de> for RTCStatsReport {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = RTCStatsReport;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of stats ids to stats objects or a sequence of stats objects")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut report = RTCStatsReport::default();
                while let Some((id, entry)) = map.next_entry::<String, RTCStatsReportEntry>()? {
                    report.insert(id, entry);
                }
                Ok(report)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut report = RTCStatsReport::default();
                while let Some(entry) = seq.next_element::<RTCStatsReportEntry>()? {
                    report.insert(entry.id().to_owned(), entry);
                }
                Ok(report)
            }
        }

        deserializer.deserialize_any(ReportVisitor)
    }
}
