//! Session eligibility predicate.
//!
//! A session is eligible when all of these hold:
//! - some configured age threshold is at or below its `min_age_limit`
//! - its vaccine equals an allowed vaccine, ignoring case
//! - it has capacity left
//! - its id is not in the dedup store
//!
//! The store is only read here. Marking a session as seen happens after
//! delivery, so a crash between detection and notification does not lose it.

use serde::{Deserialize, Serialize};

use crate::cowin::Session;
use crate::dedup::DedupStore;
use crate::error::{ConfigError, Result};

/// User age and vaccine preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    #[serde(default = "default_min_age_thresholds")]
    pub min_age_thresholds: Vec<u32>,
    #[serde(default = "default_allowed_vaccines")]
    pub allowed_vaccines: Vec<String>,
}

fn default_min_age_thresholds() -> Vec<u32> {
    vec![18, 45]
}

fn default_allowed_vaccines() -> Vec<String> {
    vec!["COVISHIELD".into(), "COVAXIN".into(), "SPUTNIK V".into()]
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        Self {
            min_age_thresholds: default_min_age_thresholds(),
            allowed_vaccines: default_allowed_vaccines(),
        }
    }
}

impl EligibilityCriteria {
    /// Build criteria, rejecting empty sets.
    pub fn new(
        min_age_thresholds: Vec<u32>,
        allowed_vaccines: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let criteria = Self {
            min_age_thresholds,
            allowed_vaccines,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    /// # Errors
    /// `InvalidCriteria` if either set is empty or a vaccine name is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_age_thresholds.is_empty() {
            return Err(ConfigError::InvalidCriteria(
                "min_age_thresholds must not be empty".into(),
            ));
        }
        if self.allowed_vaccines.is_empty() {
            return Err(ConfigError::InvalidCriteria(
                "allowed_vaccines must not be empty".into(),
            ));
        }
        if self.allowed_vaccines.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigError::InvalidCriteria(
                "allowed_vaccines contains a blank entry".into(),
            ));
        }
        Ok(())
    }

    pub fn age_matches(&self, session: &Session) -> bool {
        self.min_age_thresholds
            .iter()
            .any(|threshold| *threshold <= session.min_age_limit)
    }

    pub fn vaccine_matches(&self, session: &Session) -> bool {
        let vaccine = session.vaccine.to_uppercase();
        self.allowed_vaccines
            .iter()
            .any(|allowed| allowed.to_uppercase() == vaccine)
    }
}

pub fn has_capacity(session: &Session) -> bool {
    session.available_capacity > 0
}

/// Full eligibility check for one session.
///
/// # Errors
/// `ConfigError` for invalid criteria; `StoreError` if the store lookup fails.
/// A failed lookup is never read as "not seen".
pub fn is_eligible(
    session: &Session,
    criteria: &EligibilityCriteria,
    store: &dyn DedupStore,
) -> Result<bool> {
    criteria.validate()?;
    check(session, criteria, store)
}

/// `is_eligible` without re-validating criteria; the caller has already done so.
pub(crate) fn check(
    session: &Session,
    criteria: &EligibilityCriteria,
    store: &dyn DedupStore,
) -> Result<bool> {
    if !(criteria.age_matches(session) && criteria.vaccine_matches(session) && has_capacity(session))
    {
        return Ok(false);
    }
    Ok(!store.contains(&session.session_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::MemoryDedupStore;
    use crate::error::{CoreError, StoreError};
    use serde_json::Map;

    fn session(id: &str, min_age: u32, vaccine: &str, capacity: i64) -> Session {
        Session {
            session_id: id.into(),
            min_age_limit: min_age,
            vaccine: vaccine.into(),
            available_capacity: capacity,
            extra: Map::new(),
        }
    }

    fn criteria(ages: &[u32], vaccines: &[&str]) -> EligibilityCriteria {
        EligibilityCriteria::new(
            ages.to_vec(),
            vaccines.iter().map(|v| v.to_string()).collect(),
        )
        .unwrap()
    }

    struct BrokenStore;

    impl DedupStore for BrokenStore {
        fn contains(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Locked)
        }
        fn mark_seen(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Locked)
        }
        fn len(&self) -> Result<usize, StoreError> {
            Err(StoreError::Locked)
        }
        fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Locked)
        }
    }

    #[test]
    fn age_matches_any_threshold() {
        let s = session("s1", 45, "COVAXIN", 5);
        assert!(criteria(&[18, 45], &["COVAXIN"]).age_matches(&s));
        assert!(!criteria(&[60], &["COVAXIN"]).age_matches(&s));
    }

    #[test]
    fn age_threshold_is_inclusive() {
        let s = session("s1", 18, "COVAXIN", 5);
        assert!(criteria(&[18], &["COVAXIN"]).age_matches(&s));
        assert!(!criteria(&[19], &["COVAXIN"]).age_matches(&s));
    }

    #[test]
    fn vaccine_match_ignores_case() {
        let s = session("s1", 18, "COVAXIN", 5);
        assert!(criteria(&[18], &["covaxin"]).vaccine_matches(&s));

        let lower = session("s2", 18, "covishield", 5);
        assert!(criteria(&[18], &["COVISHIELD"]).vaccine_matches(&lower));
    }

    #[test]
    fn vaccine_match_is_exact_not_substring() {
        let s = session("s1", 18, "SPUTNIK V", 5);
        assert!(!criteria(&[18], &["SPUTNIK"]).vaccine_matches(&s));
    }

    #[test]
    fn capacity_boundary() {
        assert!(!has_capacity(&session("s1", 18, "COVAXIN", 0)));
        assert!(!has_capacity(&session("s1", 18, "COVAXIN", -3)));
        assert!(has_capacity(&session("s1", 18, "COVAXIN", 1)));
    }

    #[test]
    fn seen_session_is_not_eligible() {
        let store = MemoryDedupStore::new();
        let s = session("s1", 45, "COVAXIN", 1);
        let c = criteria(&[18, 45], &["covaxin"]);

        assert!(is_eligible(&s, &c, &store).unwrap());
        store.mark_seen("s1").unwrap();
        assert!(!is_eligible(&s, &c, &store).unwrap());
    }

    #[test]
    fn filter_never_writes_to_store() {
        let store = MemoryDedupStore::new();
        let s = session("s1", 45, "COVAXIN", 1);
        is_eligible(&s, &EligibilityCriteria::default(), &store).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn empty_criteria_are_rejected() {
        assert!(EligibilityCriteria::new(vec![], vec!["COVAXIN".into()]).is_err());
        assert!(EligibilityCriteria::new(vec![18], vec![]).is_err());

        let bad = EligibilityCriteria {
            min_age_thresholds: vec![],
            allowed_vaccines: vec!["COVAXIN".into()],
        };
        let result = is_eligible(&session("s1", 18, "COVAXIN", 1), &bad, &MemoryDedupStore::new());
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn store_failure_is_propagated() {
        let s = session("s1", 45, "COVAXIN", 1);
        let result = is_eligible(&s, &EligibilityCriteria::default(), &BrokenStore);
        assert!(matches!(result, Err(CoreError::Store(StoreError::Locked))));
    }

    #[test]
    fn defaults_apply_when_keys_absent() {
        let c: EligibilityCriteria = toml::from_str("").unwrap();
        assert_eq!(c, EligibilityCriteria::default());
        assert_eq!(c.min_age_thresholds, vec![18, 45]);
    }
}
