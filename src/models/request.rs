use chrono::{DateTime, Utc};
use serde::de::{value::StrDeserializer, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

/// Corrective tickets react to a breakdown, preventive ones are scheduled work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Corrective,
    Preventive,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Corrective => "corrective",
            RequestType::Preventive => "preventive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "corrective" => Some(RequestType::Corrective),
            "preventive" => Some(RequestType::Preventive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    New,
    InProgress,
    Repaired,
    Scrap,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Repaired => "repaired",
            RequestStatus::Scrap => "scrap",
        }
    }

    /// Repaired and scrapped tickets are closed by convention only.
    pub fn is_closed(&self) -> bool {
        matches!(self, RequestStatus::Repaired | RequestStatus::Scrap)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A maintenance ticket raised against one piece of equipment.
///
/// `team_id` and `category` are copied from the equipment when the ticket is
/// opened and are never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub equipment_id: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub status: RequestStatus,
    #[serde(default)]
    pub priority: Priority,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub team_id: Option<String>,
    pub category: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    /// Hours worked.
    pub duration: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/requests`.
///
/// Required fields stay optional strings here so that a missing or malformed
/// value is reported with its own message instead of a generic JSON error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub equipment_id: Option<String>,
    #[serde(rename = "type")]
    pub request_type: Option<String>,
    pub priority: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
}

/// Body of `PUT /api/requests/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestPayload {
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    pub notes: Option<String>,
}

impl UpdateRequestPayload {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.request_type.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.scheduled_date.is_none()
            && self.completed_date.is_none()
            && self.duration.is_none()
            && self.notes.is_none()
    }

    /// Workflow fields are the ones the people doing the work fill in:
    /// status, assignee and the work record (completion date, hours spent,
    /// notes). Everything else describes the problem and is detail.
    pub fn touches_workflow(&self) -> bool {
        self.status.is_some()
            || self.assigned_to.is_some()
            || self.completed_date.is_some()
            || self.duration.is_some()
            || self.notes.is_some()
    }

    pub fn touches_details(&self) -> bool {
        self.subject.is_some()
            || self.description.is_some()
            || self.request_type.is_some()
            || self.priority.is_some()
            || self.scheduled_date.is_some()
    }
}

/// Body of `PUT /api/requests/{id}/assign`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequestPayload {
    pub technician_id: Option<String>,
}

/// Query-string value where `?status=` means "no filter".
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let value: StrDeserializer<'_, D::Error> = value.into_deserializer();
            T::deserialize(value).map(Some)
        }
    }
}

/// Optional equality filters of `GET /api/requests`. Blank values are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<RequestStatus>,
    #[serde(rename = "type", default, deserialize_with = "blank_as_none")]
    pub request_type: Option<RequestType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub priority: Option<Priority>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Query;

    #[test]
    fn blank_filters_are_ignored() {
        let query = Query::<RequestQuery>::from_query("status=&type=&priority=high")
            .unwrap()
            .into_inner();
        assert_eq!(query.status, None);
        assert_eq!(query.request_type, None);
        assert_eq!(query.priority, Some(Priority::High));

        let query = Query::<RequestQuery>::from_query("status=in-progress&type=preventive")
            .unwrap()
            .into_inner();
        assert_eq!(query.status, Some(RequestStatus::InProgress));
        assert_eq!(query.request_type, Some(RequestType::Preventive));
        assert_eq!(query.priority, None);
    }

    #[test]
    fn unknown_filter_values_are_rejected() {
        assert!(Query::<RequestQuery>::from_query("status=fixed").is_err());
    }

    #[test]
    fn work_record_counts_as_workflow() {
        let closing = UpdateRequestPayload {
            status: Some(RequestStatus::Repaired),
            completed_date: Some(Utc::now()),
            duration: Some(1.5),
            notes: Some("new seal".into()),
            ..Default::default()
        };
        assert!(closing.touches_workflow());
        assert!(!closing.touches_details());

        let rewording = UpdateRequestPayload {
            subject: Some("Press leaks hydraulic oil".into()),
            scheduled_date: Some(Utc::now()),
            ..Default::default()
        };
        assert!(rewording.touches_details());
        assert!(!rewording.touches_workflow());
    }
}
