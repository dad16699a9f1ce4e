//! # Slotwatch Core Library
//!
//! Polls the CoWIN public calendar for one location, filters sessions by
//! age and vaccine preferences, and reports only sessions with open
//! capacity that have not been reported before. The CLI is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Fetch**: [`CalendarFetcher`] issues one GET per cycle through a
//!   [`Transport`] chosen at construction (direct or onion-routed)
//! - **Filter**: [`eligibility::is_eligible`] is a pure predicate with a
//!   read-only [`DedupStore`] capability passed in
//! - **Scan**: [`scanner::scan`] walks centers and sessions in document
//!   order and attaches center metadata to matches
//! - **Storage**: SQLite dedup store and TOML configuration
//! - **Poll**: [`PollCycle`] notifies each match and marks it seen only
//!   after delivery succeeded

pub mod cowin;
pub mod dedup;
pub mod eligibility;
pub mod error;
pub mod notify;
pub mod poll;
pub mod scanner;
pub mod storage;

pub use cowin::{
    today_date, CalendarDocument, CalendarFetcher, Center, MatchedSession, Session, Transport,
    TransportMode,
};
pub use dedup::{DedupStore, MemoryDedupStore};
pub use eligibility::{is_eligible, EligibilityCriteria};
pub use error::{ConfigError, CoreError, FetchCause, FetchError, NotifyError, StoreError};
pub use notify::{LogNotifier, MultiNotifier, Notifier, WebhookNotifier};
pub use poll::{CycleReport, PollCycle};
pub use scanner::scan;
pub use storage::{Config, SqliteDedupStore};
