//! Higher-timeframe bar aggregation from minute bars.
//!
//! Folds an ordered stream of 1-minute bars into windows. Intraday
//! timeframes close after a fixed number of bars, daily and weekly
//! timeframes close on the session's closing bar, and clock-hour bars close
//! on the hour's last minute, the daily close, or when the hour changes.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use futbar_core::config::AggregationConfig;
use futbar_core::{AggregatedBar, Config, Error, MinuteBar, Result, Timeframe, Volume};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::session::SessionCalendar;

/// Counters describing what an aggregator has processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationStats {
    /// Minute bars folded.
    pub bars_in: u64,
    /// Aggregated bars emitted.
    pub bars_emitted: u64,
    /// Bars rejected by validation.
    pub bars_rejected: u64,
    /// Unclosed windows dropped at end of input.
    pub windows_discarded: u64,
    /// Minute bars inside dropped windows.
    pub bars_discarded: u64,
}

impl AggregationStats {
    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// How a timeframe decides that a window is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Windowing {
    PassThrough,
    FixedCount(u32),
    ClockHour,
    Session { weekly: bool },
}

impl Windowing {
    fn for_timeframe(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::Min1 => Windowing::PassThrough,
            Timeframe::Hour1 => Windowing::ClockHour,
            Timeframe::Day1 => Windowing::Session { weekly: false },
            Timeframe::Week1 => Windowing::Session { weekly: true },
            tf => Windowing::FixedCount(tf.minutes().unwrap_or(1)),
        }
    }
}

/// Running OHLCV state of the open window.
#[derive(Debug, Clone)]
struct Accumulator {
    trading_day: NaiveDate,
    first_ts: NaiveDateTime,
    last_ts: NaiveDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Volume,
    count: u32,
}

impl Accumulator {
    fn start(bar: &MinuteBar, trading_day: NaiveDate) -> Self {
        Self {
            trading_day,
            first_ts: bar.timestamp,
            last_ts: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            count: 1,
        }
    }

    fn fold(&mut self, bar: &MinuteBar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
        self.last_ts = bar.timestamp;
        self.count += 1;
    }

    fn to_bar(&self, period_timestamp: NaiveDateTime) -> AggregatedBar {
        AggregatedBar {
            period_timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            bar_count: self.count,
        }
    }
}

/// Start of the wall-clock hour containing `ts`.
fn hour_start(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Aggregator turning minute bars into bars of one target timeframe.
///
/// Feed bars with [`BarAggregator::update`] one at a time, or a whole slice
/// with [`BarAggregator::aggregate`]. The open window is kept between calls.
#[derive(Debug, Clone)]
pub struct BarAggregator {
    timeframe: Timeframe,
    windowing: Windowing,
    calendar: SessionCalendar,
    config: AggregationConfig,
    /// Window currently being built.
    window: Option<Accumulator>,
    /// Timestamp of the last accepted bar.
    last_ts: Option<NaiveDateTime>,
    stats: AggregationStats,
}

impl BarAggregator {
    /// Create an aggregator with the default session calendar.
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            windowing: Windowing::for_timeframe(timeframe),
            calendar: SessionCalendar::default(),
            config: AggregationConfig::default(),
            window: None,
            last_ts: None,
            stats: AggregationStats::default(),
        }
    }

    /// Create an aggregator from configuration.
    pub fn with_config(timeframe: Timeframe, config: &Config) -> Result<Self> {
        let calendar = SessionCalendar::new(&config.session)?;
        Ok(Self {
            calendar,
            config: config.aggregation.clone(),
            ..Self::new(timeframe)
        })
    }

    /// Fold one minute bar, returning a bar if this closed a window.
    ///
    /// A rejected bar leaves the open window untouched.
    pub fn update(&mut self, bar: &MinuteBar) -> Result<Option<AggregatedBar>> {
        self.check(bar)?;
        self.last_ts = Some(bar.timestamp);
        self.stats.bars_in += 1;

        let emitted = match self.windowing {
            Windowing::PassThrough => Some(AggregatedBar::from_minute(bar)),
            Windowing::FixedCount(n) => {
                if self.fold(bar) >= n {
                    self.close_window(bar.timestamp)
                } else {
                    None
                }
            }
            Windowing::Session { weekly } => {
                self.fold(bar);
                let closes = if weekly {
                    self.calendar.is_weekly_close(bar.date(), bar.time())
                } else {
                    self.calendar.is_daily_close(bar.time())
                };
                if closes {
                    if let Some(acc) = &self.window {
                        if !weekly && acc.trading_day != bar.date() {
                            debug!(
                                trading_day = %acc.trading_day,
                                close_date = %bar.date(),
                                "session window spans a non-trading day"
                            );
                        }
                    }
                    let stamp = self.calendar.close_timestamp(bar.date());
                    self.close_window(stamp)
                } else {
                    None
                }
            }
            Windowing::ClockHour => {
                let hour = hour_start(bar.timestamp);
                let previous = self.window.as_ref().map(|acc| hour_start(acc.first_ts));
                match previous {
                    Some(prev_hour) if prev_hour != hour => {
                        // A closing minute that also opens a new hour stays
                        // open; `finish` still treats it as complete.
                        let emitted = self.close_window(prev_hour);
                        self.fold(bar);
                        emitted
                    }
                    _ => {
                        self.fold(bar);
                        if self.ends_hour(bar.timestamp) {
                            self.close_window(hour)
                        } else {
                            None
                        }
                    }
                }
            }
        };

        if let Some(out) = &emitted {
            self.stats.bars_emitted += 1;
            debug!(
                timeframe = %self.timeframe,
                period = %out.period_timestamp,
                bars = out.bar_count,
                volume = out.volume,
                "window closed"
            );
        }
        Ok(emitted)
    }

    /// Fold a whole ordered slice and end the stream.
    ///
    /// The trailing unclosed window follows the partial-tail policy.
    pub fn aggregate(&mut self, bars: &[MinuteBar]) -> Result<Vec<AggregatedBar>> {
        let mut out = Vec::with_capacity(self.estimate_len(bars.len()));
        for bar in bars {
            if let Some(agg) = self.update(bar)? {
                out.push(agg);
            }
        }
        if let Some(tail) = self.finish() {
            out.push(tail);
        }
        Ok(out)
    }

    /// End of input: emit or drop the open window.
    ///
    /// A clock-hour window whose last bar ends the hour is complete and is
    /// always emitted.
    pub fn finish(&mut self) -> Option<AggregatedBar> {
        if let Some(acc) = &self.window {
            if self.windowing == Windowing::ClockHour && self.ends_hour(acc.last_ts) {
                let hour = hour_start(acc.first_ts);
                let bar = self.close_window(hour)?;
                self.stats.bars_emitted += 1;
                debug!(timeframe = %self.timeframe, period = %hour, bars = bar.bar_count, "window closed");
                return Some(bar);
            }
        }
        if self.config.emit_partial_tail {
            return self.flush();
        }
        if let Some(acc) = self.window.take() {
            self.stats.windows_discarded += 1;
            self.stats.bars_discarded += u64::from(acc.count);
            debug!(
                timeframe = %self.timeframe,
                first = %acc.first_ts,
                last = %acc.last_ts,
                bars = acc.count,
                "dropping unclosed window"
            );
        }
        None
    }

    /// Force-emit the open window as a partial bar.
    ///
    /// Partial bars are stamped with their last bar's timestamp, except
    /// clock-hour bars which keep their hour start.
    pub fn flush(&mut self) -> Option<AggregatedBar> {
        let acc = self.window.take()?;
        let period_timestamp = match self.windowing {
            Windowing::ClockHour => hour_start(acc.first_ts),
            _ => acc.last_ts,
        };
        let bar = acc.to_bar(period_timestamp);
        self.stats.bars_emitted += 1;
        debug!(
            timeframe = %self.timeframe,
            period = %bar.period_timestamp,
            bars = bar.bar_count,
            "partial window flushed"
        );
        Some(bar)
    }

    /// Number of minute bars in the open window.
    pub fn pending_bar_count(&self) -> u32 {
        self.window.as_ref().map_or(0, |acc| acc.count)
    }

    /// Is there no open window?
    pub fn is_idle(&self) -> bool {
        self.window.is_none()
    }

    /// Get aggregation statistics.
    pub fn stats(&self) -> &AggregationStats {
        &self.stats
    }

    /// Clear all state (open window, ordering watermark, statistics).
    pub fn reset(&mut self) {
        self.window = None;
        self.last_ts = None;
        self.stats.reset();
    }

    /// Validate a bar before it touches any state.
    fn check(&mut self, bar: &MinuteBar) -> Result<()> {
        if self.config.validate_order {
            if let Some(prev) = self.last_ts {
                if bar.timestamp < prev {
                    self.stats.bars_rejected += 1;
                    warn!(bar = %bar.timestamp, previous = %prev, "out-of-order minute bar");
                    return Err(Error::data(format!(
                        "minute bar at {} precedes previous bar at {}",
                        bar.timestamp, prev
                    )));
                }
            }
        }
        if self.config.validate_bars && !bar.is_consistent() {
            self.stats.bars_rejected += 1;
            warn!(bar = %bar.timestamp, "inconsistent minute bar");
            return Err(Error::data(format!(
                "minute bar at {} violates OHLC/volume invariant",
                bar.timestamp
            )));
        }
        Ok(())
    }

    /// Fold a bar into the open window, opening one if needed.
    /// Returns the window's bar count.
    fn fold(&mut self, bar: &MinuteBar) -> u32 {
        match self.window.as_mut() {
            Some(acc) => {
                acc.fold(bar);
                acc.count
            }
            None => {
                let trading_day = self.calendar.trading_day(bar.date(), bar.time());
                trace!(timeframe = %self.timeframe, start = %bar.timestamp, %trading_day, "window opened");
                self.window = Some(Accumulator::start(bar, trading_day));
                1
            }
        }
    }

    /// Is this the last bar of its clock hour: minute 59 or the daily close?
    fn ends_hour(&self, ts: NaiveDateTime) -> bool {
        ts.minute() == 59 || self.calendar.is_daily_close(ts.time())
    }

    fn close_window(&mut self, period_timestamp: NaiveDateTime) -> Option<AggregatedBar> {
        self.window.take().map(|acc| acc.to_bar(period_timestamp))
    }

    fn estimate_len(&self, bars: usize) -> usize {
        match self.windowing {
            Windowing::PassThrough => bars,
            Windowing::FixedCount(n) => bars / n.max(1) as usize,
            Windowing::ClockHour => bars / 60 + 1,
            Windowing::Session { weekly: false } => bars / 225 + 1,
            Windowing::Session { weekly: true } => bars / 1125 + 1,
        }
    }
}
