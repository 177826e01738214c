//! Dashboard clock.
//!
//! [`ClockWidget`] keeps a `YYYY-MM-DD HH:MM:SS (요일)` display string and
//! publishes it over a `watch` channel. [`ClockWidget::spawn`] seeds the
//! display once and then refreshes it from the wall clock every second until
//! the returned [`ClockHandle`] is stopped or dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Offset, TimeZone};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::api::TimeEndpoint;

/// Weekday names, Monday first.
pub const WEEKDAYS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Format a timestamp in its own offset as the clock's display text.
pub fn format_display(at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| String::from("<unformattable>"));
    let weekday = WEEKDAYS[usize::from(at.weekday().number_days_from_monday())];
    format!("{stamp} ({weekday})")
}

/// Re-express `at` in `zone`, using the offset in force at that instant.
pub fn in_zone<Tz: TimeZone>(zone: &Tz, at: OffsetDateTime) -> OffsetDateTime {
    let offset_seconds = chrono::DateTime::from_timestamp(at.unix_timestamp(), 0)
        .map(|utc| zone.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc())
        .unwrap_or(0);
    let offset = UtcOffset::from_whole_seconds(offset_seconds).unwrap_or(UtcOffset::UTC);
    at.to_offset(offset)
}

pub trait WallClock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the system time zone.
///
/// The zone offset is looked up on every read, so a running clock follows
/// daylight-saving changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl WallClock for LocalClock {
    fn now(&self) -> OffsetDateTime {
        in_zone(&Local, OffsetDateTime::now_utc())
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl WallClock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Where the initial display text comes from.
#[derive(Clone, Default)]
pub enum ClockSource {
    #[default]
    Local,
    /// Show the server's time first; fall back to the local clock if the
    /// fetch fails.
    Server(Arc<dyn TimeEndpoint>),
}

pub struct ClockWidget {
    clock: Arc<dyn WallClock>,
    source: ClockSource,
    display: watch::Sender<String>,
}

impl ClockWidget {
    pub fn new(clock: Arc<dyn WallClock>) -> Self {
        let (display, _) = watch::channel(String::new());
        Self {
            clock,
            source: ClockSource::Local,
            display,
        }
    }

    pub fn with_source(mut self, source: ClockSource) -> Self {
        self.source = source;
        self
    }

    pub fn display_text(&self) -> String {
        self.display.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display.subscribe()
    }

    /// Set the initial display text from the configured source.
    pub async fn init(&self) {
        match &self.source {
            ClockSource::Local => self.update_time(),
            ClockSource::Server(endpoint) => match endpoint.fetch_time().await {
                Ok(server_time) => {
                    self.display.send_replace(server_time);
                }
                Err(error) => {
                    warn!(%error, "server time fetch failed; using local clock");
                    self.update_time();
                }
            },
        }
    }

    pub fn update_time(&self) {
        self.display.send_replace(format_display(self.clock.now()));
    }

    /// Run `init` and then refresh once per [`TICK_INTERVAL`] on a tokio task.
    pub fn spawn(self) -> ClockHandle {
        let widget = Arc::new(self);
        let runner = Arc::clone(&widget);

        let task = tokio::spawn(async move {
            runner.init().await;

            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                runner.update_time();
            }
        });

        ClockHandle { widget, task }
    }
}

/// Running clock. Dropping the handle cancels the timer.
pub struct ClockHandle {
    widget: Arc<ClockWidget>,
    task: JoinHandle<()>,
}

impl ClockHandle {
    pub fn display_text(&self) -> String {
        self.widget.display_text()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.widget.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn formats_monday_with_zero_padding() {
        assert_eq!(
            format_display(datetime!(2024-03-04 09:05:07 +09:00)),
            "2024-03-04 09:05:07 (월)"
        );
    }

    #[test]
    fn sunday_maps_to_last_table_entry() {
        assert_eq!(
            format_display(datetime!(2024-03-10 23:59:59 UTC)),
            "2024-03-10 23:59:59 (일)"
        );
    }

    #[test]
    fn pads_years_below_one_thousand() {
        let at = time::Date::from_calendar_date(999, time::Month::January, 1)
            .expect("valid date")
            .midnight()
            .assume_utc();
        assert_eq!(format_display(at), "0999-01-01 00:00:00 (화)");
    }

    #[test]
    fn update_time_is_idempotent_for_fixed_input() {
        let widget = ClockWidget::new(Arc::new(FixedClock(datetime!(2024-03-04 09:05:07 UTC))));
        widget.update_time();
        let first = widget.display_text();
        widget.update_time();
        assert_eq!(widget.display_text(), first);
    }

    #[test]
    fn zone_offset_follows_daylight_saving() {
        let zone = chrono_tz::America::New_York;

        let summer = in_zone(&zone, datetime!(2024-07-01 12:00:00 UTC));
        assert_eq!(summer.offset(), UtcOffset::from_hms(-4, 0, 0).expect("valid offset"));
        assert_eq!(format_display(summer), "2024-07-01 08:00:00 (월)");

        let winter = in_zone(&zone, datetime!(2024-11-04 12:00:00 UTC));
        assert_eq!(winter.offset(), UtcOffset::from_hms(-5, 0, 0).expect("valid offset"));
        assert_eq!(format_display(winter), "2024-11-04 07:00:00 (월)");
    }

    #[test]
    fn fixed_zone_keeps_the_same_instant() {
        let seoul = chrono::FixedOffset::east_opt(9 * 3600).expect("valid offset");
        let at = datetime!(2024-03-04 00:05:07 UTC);
        let local = in_zone(&seoul, at);
        assert_eq!(local, at);
        assert_eq!(format_display(local), "2024-03-04 09:05:07 (월)");
    }
}
