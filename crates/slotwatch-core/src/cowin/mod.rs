//! CoWIN public appointment API: wire types, transports and the calendar fetcher.

pub mod fetcher;
pub mod transport;
pub mod types;

pub use fetcher::{CalendarFetcher, DEFAULT_BASE_URL};
pub use transport::{DirectTransport, OnionTransport, RawResponse, Transport, TransportMode};
pub use types::{CalendarDocument, Center, MatchedSession, Session};

/// Today's local date in the `dd-mm-YYYY` form the upstream expects.
pub fn today_date() -> String {
    chrono::Local::now().format("%d-%m-%Y").to_string()
}
