//! Calendar fetcher for the CoWIN public appointment API.

use url::Url;

use super::transport::Transport;
use super::types::CalendarDocument;
use crate::error::{ConfigError, FetchError};

pub const DEFAULT_BASE_URL: &str =
    "https://cdn-api.co-vin.in/api/v2/appointment/sessions/public/calendarByPin";

/// Longest body excerpt carried in a fetch error.
const EXCERPT_CHARS: usize = 200;

/// Retrieves one calendar snapshot per call. Holds no mutable state.
pub struct CalendarFetcher {
    transport: Box<dyn Transport>,
    base_url: Url,
}

impl CalendarFetcher {
    pub fn new(transport: Box<dyn Transport>, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            key: "fetch.base_url".into(),
            message: e.to_string(),
        })?;
        Ok(Self {
            transport,
            base_url,
        })
    }

    /// URL for `location` (pincode) and `date` (`dd-mm-YYYY`). Neither is validated.
    pub fn calendar_url(&self, location: &str, date: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("pincode", location)
            .append_pair("date", date);
        url
    }

    /// Fetch and parse the calendar. Never retries; never returns a partial document.
    ///
    /// # Errors
    /// `Transport` for connection failures and timeouts, `HttpStatus` for any
    /// status other than 200, `Parse` when the body is not the documented shape.
    pub async fn fetch(&self, location: &str, date: &str) -> Result<CalendarDocument, FetchError> {
        let url = self.calendar_url(location, date);
        tracing::debug!(%url, transport = self.transport.name(), "fetching calendar");

        let resp = self.transport.get(url.as_str()).await?;
        if resp.status != 200 {
            return Err(FetchError::HttpStatus {
                status: resp.status,
                detail: excerpt(&resp.body),
            });
        }

        serde_json::from_str(&resp.body).map_err(|e| FetchError::Parse {
            detail: e.to_string(),
            excerpt: excerpt(&resp.body),
        })
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
