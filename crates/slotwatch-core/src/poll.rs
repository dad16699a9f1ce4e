//! One fetch -> scan -> notify -> mark pass.

use serde::Serialize;

use crate::cowin::{CalendarFetcher, MatchedSession};
use crate::dedup::DedupStore;
use crate::eligibility::EligibilityCriteria;
use crate::error::Result;
use crate::notify::Notifier;

/// Outcome of a poll cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub location: String,
    pub date: String,
    /// Sessions that passed the filter, in document order.
    pub matched: Vec<MatchedSession>,
    /// Ids that were delivered and marked seen.
    pub notified: Vec<String>,
    /// Ids whose delivery failed; left unmarked for the next cycle.
    pub failed: Vec<String>,
}

/// Wires the collaborators of a poll cycle together.
///
/// Cycles for the same location must not run concurrently against one
/// store, or both may deliver the same session before either marks it.
pub struct PollCycle<'a> {
    pub fetcher: &'a CalendarFetcher,
    pub criteria: &'a EligibilityCriteria,
    pub store: &'a dyn DedupStore,
    pub notifier: &'a dyn Notifier,
}

impl PollCycle<'_> {
    /// Fetch and scan without delivering or marking anything.
    ///
    /// # Errors
    /// Fetch errors are returned before scanning starts; config and store
    /// errors abort the scan.
    pub async fn matches(&self, location: &str, date: &str) -> Result<Vec<MatchedSession>> {
        let document = self.fetcher.fetch(location, date).await.map_err(|e| {
            tracing::debug!(location, date, cause = %e.cause(), "calendar fetch failed");
            e
        })?;
        crate::scanner::scan(&document, self.criteria, self.store)
    }

    /// Full cycle. Each match is marked seen only after the notifier accepted it.
    ///
    /// # Errors
    /// As [`PollCycle::matches`], plus store errors from `mark_seen`.
    /// Delivery failures are recorded in the report, not returned.
    pub async fn run(&self, location: &str, date: &str) -> Result<CycleReport> {
        let matched = self.matches(location, date).await?;
        let mut report = CycleReport {
            location: location.to_string(),
            date: date.to_string(),
            ..CycleReport::default()
        };

        for session in &matched {
            match self.notifier.notify(session).await {
                Ok(()) => {
                    self.store.mark_seen(session.session_id())?;
                    report.notified.push(session.session_id().to_string());
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = session.session_id(),
                        notifier = self.notifier.name(),
                        "delivery failed, will retry next cycle: {e}"
                    );
                    report.failed.push(session.session_id().to_string());
                }
            }
        }

        tracing::info!(
            location,
            date,
            matched = matched.len(),
            notified = report.notified.len(),
            failed = report.failed.len(),
            "poll cycle complete"
        );
        report.matched = matched;
        Ok(report)
    }
}
