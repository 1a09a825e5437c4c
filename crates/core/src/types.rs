//! Core data types for the futbar system.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size/quantity type.
pub type Volume = f64;

/// A single 1-minute OHLCV observation.
///
/// Timestamps are exchange-local wall clock at minute resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteBar {
    /// Minute timestamp.
    pub timestamp: NaiveDateTime,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: Volume,
}

impl MinuteBar {
    /// Create a new minute bar.
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Volume,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calendar date of the bar.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Clock time of the bar.
    #[inline]
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// Check the OHLC ordering and that volume is a non-negative number.
    pub fn is_consistent(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return false;
        }
        if !(self.volume.is_finite() && self.volume >= 0.0) {
            return false;
        }
        self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}

/// One output bar at a target timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBar {
    /// Representative timestamp of the window.
    pub period_timestamp: NaiveDateTime,
    /// First contributing bar's open.
    pub open: f64,
    /// Max of contributing highs.
    pub high: f64,
    /// Min of contributing lows.
    pub low: f64,
    /// Last contributing bar's close.
    pub close: f64,
    /// Sum of contributing volumes.
    pub volume: Volume,
    /// Number of minute bars folded into this bar.
    pub bar_count: u32,
}

impl AggregatedBar {
    /// Wrap a single minute bar unchanged.
    pub fn from_minute(bar: &MinuteBar) -> Self {
        Self {
            period_timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            bar_count: 1,
        }
    }
}

/// Target timeframe selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1 minute, pass-through.
    #[serde(rename = "1m")]
    Min1,
    /// 5 minute bars.
    #[serde(rename = "5m")]
    Min5,
    /// 15 minute bars.
    #[serde(rename = "15m")]
    Min15,
    /// 30 minute bars.
    #[serde(rename = "30m")]
    Min30,
    /// 60 minute bars, counted rather than clock aligned.
    #[serde(rename = "60m")]
    Min60,
    /// Clock-aligned hour bars.
    #[serde(rename = "1h")]
    Hour1,
    /// Trading day bars closing at 14:59.
    #[serde(rename = "1D")]
    Day1,
    /// Trading week bars closing on the last trading day's 14:59.
    #[serde(rename = "1W")]
    Week1,
}

impl Timeframe {
    /// Every supported timeframe, smallest first.
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Min1,
            Timeframe::Min5,
            Timeframe::Min15,
            Timeframe::Min30,
            Timeframe::Min60,
            Timeframe::Hour1,
            Timeframe::Day1,
            Timeframe::Week1,
        ]
    }

    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Min1 => "1m",
            Timeframe::Min5 => "5m",
            Timeframe::Min15 => "15m",
            Timeframe::Min30 => "30m",
            Timeframe::Min60 => "60m",
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1D",
            Timeframe::Week1 => "1W",
        }
    }

    /// Number of minute bars per window for count-based timeframes.
    pub fn minutes(self) -> Option<u32> {
        match self {
            Timeframe::Min1 => Some(1),
            Timeframe::Min5 => Some(5),
            Timeframe::Min15 => Some(15),
            Timeframe::Min30 => Some(30),
            Timeframe::Min60 => Some(60),
            Timeframe::Hour1 | Timeframe::Day1 | Timeframe::Week1 => None,
        }
    }

    /// Is the window bounded by the session close rather than a bar count?
    pub fn is_session_bounded(self) -> bool {
        matches!(self, Timeframe::Day1 | Timeframe::Week1)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1m" => Ok(Timeframe::Min1),
            "5m" => Ok(Timeframe::Min5),
            "15m" => Ok(Timeframe::Min15),
            "30m" => Ok(Timeframe::Min30),
            "60m" => Ok(Timeframe::Min60),
            "1h" => Ok(Timeframe::Hour1),
            "1D" => Ok(Timeframe::Day1),
            "1W" => Ok(Timeframe::Week1),
            other => Err(Error::config(format!("unsupported timeframe: {other:?}"))),
        }
    }
}
