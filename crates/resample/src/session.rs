//! Trading session classification.
//!
//! Futures trade a night session after the 15:00 daytime close. The daily
//! boundary is the 14:59 bar rather than midnight, so night-session bars
//! belong to the next trading day even though their calendar date is today's.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use futbar_core::config::SessionConfig;
use futbar_core::Result;

/// Segment of the trading day a bar falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSegment {
    /// Between the day open and the daily close bar, inclusive.
    Day,
    /// After the daily close, including the post-midnight tail.
    Night,
}

/// Session boundaries used to classify minute bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCalendar {
    /// Timestamp of the last daytime bar.
    daily_close: NaiveTime,
    /// Stamp for emitted daily/weekly bars.
    session_end: NaiveTime,
    /// Start of the daytime session.
    day_open: NaiveTime,
    /// Weekday index (Monday = 0) that closes the week.
    weekly_close_weekday: u32,
}

impl SessionCalendar {
    /// Build a calendar from configuration.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            daily_close: config.daily_close,
            session_end: config.session_end,
            day_open: config.day_open,
            weekly_close_weekday: config.weekly_close_weekday,
        })
    }

    /// Is this the daily closing bar?
    #[inline]
    pub fn is_daily_close(&self, time: NaiveTime) -> bool {
        time == self.daily_close
    }

    /// Is this the closing bar of the trading week?
    ///
    /// Only the configured weekday closes the week. A holiday on that day
    /// leaves the week open until the following week's close.
    #[inline]
    pub fn is_weekly_close(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.is_daily_close(time) && date.weekday().num_days_from_monday() == self.weekly_close_weekday
    }

    /// Which segment of the trading day a bar belongs to.
    ///
    /// Informational only: windowing depends on the daily close and
    /// `trading_day`, never on the segment or `day_open`.
    pub fn segment(&self, time: NaiveTime) -> SessionSegment {
        if time > self.daily_close || time < self.day_open {
            SessionSegment::Night
        } else {
            SessionSegment::Day
        }
    }

    /// Nominal trading day a bar's volume is attributed to.
    ///
    /// Bars after the daily close count toward the next date; dates falling
    /// on a weekend roll forward to Monday. Exchange holidays are not known.
    pub fn trading_day(&self, date: NaiveDate, time: NaiveTime) -> NaiveDate {
        let mut day = if time > self.daily_close {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        day
    }

    /// Timestamp stamped on a daily/weekly bar closed on `date`.
    #[inline]
    pub fn close_timestamp(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.session_end)
    }
}

impl Default for SessionCalendar {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            daily_close: config.daily_close,
            session_end: config.session_end,
            day_open: config.day_open,
            weekly_close_weekday: config.weekly_close_weekday,
        }
    }
}

/// Is this the 14:59:00 daily closing bar?
pub fn is_daily_close(time: NaiveTime) -> bool {
    SessionCalendar::default().is_daily_close(time)
}

/// Is this the Friday 14:59:00 weekly closing bar?
pub fn is_weekly_close(date: NaiveDate, time: NaiveTime) -> bool {
    SessionCalendar::default().is_weekly_close(date, time)
}
