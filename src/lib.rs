//! Client library for a facility task and ticket backend.
//!
//! [`classify`] holds the pure date-range filter and status bucket counter;
//! [`api`] talks to the backend; [`report`] turns fetched items into the
//! dashboard views.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod session;

pub use classify::{
    categorize, categorize_at, filter_by_range, filter_by_range_at, select_category,
    select_category_at, Bucket, BucketCounts, DateRange, FilterMode,
};
pub use error::{FilterError, ParseError};
pub use model::timestamp::Timestamp;
pub use model::work_item::WorkItem;
pub use model::{DateField, ItemKind, Tracked};
