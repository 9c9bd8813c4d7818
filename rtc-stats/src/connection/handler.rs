use super::{ConnectionStats, StatsEvent};
use crate::error::{Error, Result};
use crate::report::RTCStatsReport;
use log::debug;
use std::time::Instant;

/// Drives a [`ConnectionStats`] like any other sans-I/O protocol.
///
/// - `handle_read` takes a snapshot and queues the resulting [`StatsEvent`]
/// - `poll_event` returns queued events
/// - `handle_timeout` records when the host last polled `getStats()`, and
///   `poll_timeout` tells it when the next poll is due; before the first
///   `handle_timeout` there is no deadline and the host should poll now
impl sansio::Protocol<RTCStatsReport, (), ()> for ConnectionStats {
    type Rout = ();
    type Wout = ();
    type Eout = StatsEvent;
    type Error = Error;
    type Time = Instant;

    fn handle_read(&mut self, msg: RTCStatsReport) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClosed);
        }

        if let Some(event) = self.update(&msg)? {
            self.events.push_back(event);
        }
        Ok(())
    }

    fn poll_read(&mut self) -> Option<Self::Rout> {
        None
    }

    fn handle_write(&mut self, _msg: ()) -> Result<()> {
        Ok(())
    }

    fn poll_write(&mut self) -> Option<Self::Wout> {
        None
    }

    fn handle_event(&mut self, _evt: ()) -> Result<()> {
        Ok(())
    }

    fn poll_event(&mut self) -> Option<Self::Eout> {
        self.events.pop_front()
    }

    fn handle_timeout(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClosed);
        }

        self.last_poll = Some(now);
        Ok(())
    }

    fn poll_timeout(&mut self) -> Option<Instant> {
        if self.closed {
            return None;
        }

        self.last_poll.map(|last_poll| last_poll + self.config.polling_interval)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClosed);
        }

        debug!("closing stats with {:?} tracked entries", self.tracked());
        self.closed = true;
        self.reset();
        Ok(())
    }
}
