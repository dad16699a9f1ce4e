//! Walks a calendar snapshot and collects eligible, unseen sessions.

use crate::cowin::{CalendarDocument, MatchedSession};
use crate::dedup::DedupStore;
use crate::eligibility::{self, EligibilityCriteria};
use crate::error::Result;

/// Scan `document` in center order, then session order within each center.
///
/// Output order follows that traversal. An empty document or a center
/// with no sessions contributes nothing and is not an error.
///
/// # Errors
/// `ConfigError` if `criteria` is invalid (checked before any session is
/// looked at); `StoreError` if a dedup lookup fails. Either aborts the scan.
pub fn scan(
    document: &CalendarDocument,
    criteria: &EligibilityCriteria,
    store: &dyn DedupStore,
) -> Result<Vec<MatchedSession>> {
    criteria.validate()?;

    let mut matches = Vec::new();
    for center in &document.centers {
        for session in &center.sessions {
            if eligibility::check(session, criteria, store)? {
                matches.push(MatchedSession::from_center(center, session));
            }
        }
    }

    tracing::debug!(
        centers = document.centers.len(),
        matches = matches.len(),
        "scanned calendar"
    );
    Ok(matches)
}
