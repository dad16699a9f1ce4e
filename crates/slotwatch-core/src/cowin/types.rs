//! Wire types for the CoWIN `calendarByPin` response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Full calendar snapshot for one location and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDocument {
    pub centers: Vec<Center>,
}

/// A vaccination center and the sessions it hosts on the queried date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "district_name")]
    pub district: String,
    #[serde(default, rename = "state_name")]
    pub state: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Center {
    /// `"{address}, {district}, {state}"`, empty segments kept as-is.
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.address, self.district, self.state)
    }
}

/// One bookable session definition.
///
/// Fields the filter does not interpret (date, slots, fee, ...) are kept
/// in `extra` and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub min_age_limit: u32,
    pub vaccine: String,
    pub available_capacity: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A session that passed the eligibility filter, with its center's
/// display metadata attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSession {
    #[serde(flatten)]
    pub session: Session,
    pub display_name: String,
    pub full_address: String,
}

impl MatchedSession {
    pub fn from_center(center: &Center, session: &Session) -> Self {
        Self {
            session: session.clone(),
            display_name: center.name.clone(),
            full_address: center.full_address(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    /// One-line human summary used by the notifiers.
    pub fn summary(&self) -> String {
        let date = self
            .session
            .extra
            .get("date")
            .and_then(Value::as_str)
            .unwrap_or("?");
        format!(
            "{} slots of {} (age {}+) on {} at {} -- {}",
            self.session.available_capacity,
            self.session.vaccine,
            self.session.min_age_limit,
            date,
            self.display_name,
            self.full_address,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_upstream_shape_and_keeps_passthrough_fields() {
        let body = json!({
            "centers": [{
                "center_id": 1234,
                "name": "PHC Rampur",
                "address": "Main Road",
                "district_name": "Rampur",
                "state_name": "Uttar Pradesh",
                "sessions": [{
                    "session_id": "abc-1",
                    "date": "02-01-2024",
                    "min_age_limit": 18,
                    "vaccine": "COVISHIELD",
                    "available_capacity": 7,
                    "slots": ["09:00AM-11:00AM"]
                }]
            }]
        });

        let doc: CalendarDocument = serde_json::from_value(body).unwrap();
        let center = &doc.centers[0];
        assert_eq!(center.district, "Rampur");
        assert_eq!(center.state, "Uttar Pradesh");

        let session = &center.sessions[0];
        assert_eq!(session.available_capacity, 7);
        assert_eq!(session.extra["date"], "02-01-2024");
        assert_eq!(session.extra["slots"][0], "09:00AM-11:00AM");
    }

    #[test]
    fn absent_address_parts_render_as_empty_segments() {
        let center: Center = serde_json::from_value(json!({ "name": "X" })).unwrap();
        assert_eq!(center.full_address(), ", , ");
        assert!(center.sessions.is_empty());
    }

    #[test]
    fn matched_session_serializes_flat() {
        let center: Center = serde_json::from_value(json!({
            "name": "X",
            "address": "123 St",
            "district_name": "D",
            "state_name": "S",
            "sessions": [{
                "session_id": "s1",
                "min_age_limit": 45,
                "vaccine": "COVAXIN",
                "available_capacity": 2,
                "fee_type": "Free"
            }]
        }))
        .unwrap();

        let matched = MatchedSession::from_center(&center, &center.sessions[0]);
        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(value["session_id"], "s1");
        assert_eq!(value["fee_type"], "Free");
        assert_eq!(value["display_name"], "X");
        assert_eq!(value["full_address"], "123 St, D, S");
    }

    #[test]
    fn missing_session_field_is_rejected() {
        let result: Result<CalendarDocument, _> = serde_json::from_value(json!({
            "centers": [{ "name": "X", "sessions": [{ "session_id": "s1" }] }]
        }));
        assert!(result.is_err());
    }
}
