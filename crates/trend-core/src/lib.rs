//! Core types for censored trend analysis
//!
//! This crate provides the data model every other trend crate builds on:
//!
//! - **Censored values**: [`CensoredValue`] tags a number as exact, `<bound`
//!   or `>bound`. Mixed numeric/marker input is converted once by
//!   [`parse_values`].
//! - **Time axis**: [`Timestamp`] is either an opaque number or a calendar
//!   date-time; [`TimeUnit`] describes physical units for slope scaling.
//! - **Offsets**: [`CalendarOffset`] and [`Period`] turn `"1 year"` or
//!   `"6 months"` into buckets and steps on the axis.
//! - **Series**: [`TimeSeries`] keeps observations sorted by time.
//!
//! # Example
//!
//! ```rust
//! use trend_core::{RawValue, TimeSeries};
//!
//! let raw: Vec<RawValue> = vec![1.2.into(), "<0.5".into(), 2.4.into()];
//! let series = TimeSeries::parse_numeric(&[0.0, 1.0, 2.0], &raw).unwrap();
//! assert_eq!(series.len(), 3);
//! assert!(series.values()[1].is_censored());
//! ```

pub mod censored;
pub mod error;
pub mod offset;
pub mod series;
pub mod time;
pub mod utils;

// Re-export core types
pub use error::{Error, Result};

pub use censored::{apply_hicensor, parse_values, CensorType, CensoredValue, RawValue};
pub use offset::{CalendarOffset, Period};
pub use series::{Observation, TimeSeries};
pub use time::{TimeKind, TimeUnit, Timestamp};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::{
        CalendarOffset, CensorType, CensoredValue, Period, RawValue, Result, TimeKind,
        TimeSeries, TimeUnit, Timestamp,
    };
}
