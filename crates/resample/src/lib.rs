//! Minute-bar resampling for futures contracts with a night session.
//!
//! This crate handles:
//! - Session classification (daily close bar, weekly close, night attribution)
//! - Fixed-count intraday bars (5m, 15m, 30m, 60m)
//! - Clock-aligned hour bars
//! - Trading-day and trading-week bars closing on the 14:59 bar

pub mod aggregator;
pub mod session;

pub use aggregator::{AggregationStats, BarAggregator};
pub use session::{is_daily_close, is_weekly_close, SessionCalendar, SessionSegment};

use futbar_core::{AggregatedBar, Config, MinuteBar, Result, Timeframe};

/// Resample ordered minute bars to `timeframe` with default settings.
pub fn resample(bars: &[MinuteBar], timeframe: Timeframe) -> Result<Vec<AggregatedBar>> {
    BarAggregator::new(timeframe).aggregate(bars)
}

/// Resample using a timeframe label such as `"30m"` or `"1D"`.
///
/// An unsupported label fails before any bar is read.
pub fn resample_str(bars: &[MinuteBar], timeframe: &str) -> Result<Vec<AggregatedBar>> {
    let timeframe: Timeframe = timeframe.parse()?;
    resample(bars, timeframe)
}

/// Resample with explicit session and aggregation settings.
pub fn resample_with(
    bars: &[MinuteBar],
    timeframe: Timeframe,
    config: &Config,
) -> Result<Vec<AggregatedBar>> {
    BarAggregator::with_config(timeframe, config)?.aggregate(bars)
}

/// Resample the same minute bars to several timeframes.
pub fn resample_each(
    bars: &[MinuteBar],
    timeframes: &[Timeframe],
    config: &Config,
) -> Result<Vec<(Timeframe, Vec<AggregatedBar>)>> {
    timeframes
        .iter()
        .map(|&tf| Ok((tf, resample_with(bars, tf, config)?)))
        .collect()
}
