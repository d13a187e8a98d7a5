//! Maintenance request lifecycle.
//!
//! Pure functions over model values: the handlers in `requests` load what
//! they need from the stores, call into here, and persist the result. Nothing
//! in this module touches storage.

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateRequestPayload, Equipment, MaintenanceRequest, Priority, RequestStatus, RequestType,
    UpdateRequestPayload,
};
use crate::policy::Scope;

/// A creation payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub subject: String,
    pub description: String,
    pub equipment_id: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
}

/// Check a creation payload. Runs before any lookup so a bad payload never
/// reaches the store.
pub fn validate_new_request(payload: CreateRequestPayload) -> AppResult<NewRequest> {
    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Subject is required"))?
        .to_string();

    let equipment_id = payload
        .equipment_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Equipment is required"))?
        .to_string();

    let request_type = payload
        .request_type
        .as_deref()
        .and_then(RequestType::parse)
        .ok_or_else(|| {
            AppError::validation("Valid request type is required (corrective or preventive)")
        })?;

    let priority = match payload.priority.as_deref() {
        None | Some("") => Priority::default(),
        Some(value) => Priority::parse(value).ok_or_else(|| {
            AppError::validation("Priority must be one of low, medium or high")
        })?,
    };

    if request_type == RequestType::Preventive && payload.scheduled_date.is_none() {
        return Err(AppError::validation(
            "Scheduled date is required for preventive requests",
        ));
    }

    Ok(NewRequest {
        subject,
        description: payload
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default(),
        equipment_id,
        request_type,
        priority,
        scheduled_date: payload.scheduled_date,
        assigned_to: payload.assigned_to.filter(|a| !a.trim().is_empty()),
    })
}

/// Build a fresh ticket for `equipment`, snapshotting its team and category.
pub fn open_request(
    new: NewRequest,
    equipment: &Equipment,
    created_by: &str,
    now: DateTime<Utc>,
) -> MaintenanceRequest {
    MaintenanceRequest {
        id: Uuid::new_v4().to_string(),
        subject: new.subject,
        description: new.description,
        equipment_id: equipment.id.clone(),
        request_type: new.request_type,
        status: RequestStatus::New,
        priority: new.priority,
        created_by: created_by.to_string(),
        assigned_to: new.assigned_to,
        team_id: Some(equipment.team_id.clone()),
        category: Some(equipment.category.as_str().to_string()),
        scheduled_date: new.scheduled_date,
        completed_date: None,
        duration: None,
        notes: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Hand the ticket to `technician_id`. Assignment always moves the ticket to
/// in-progress, whatever state it was in.
pub fn assign(
    mut request: MaintenanceRequest,
    technician_id: String,
    now: DateTime<Utc>,
) -> MaintenanceRequest {
    request.assigned_to = Some(technician_id);
    request.status = RequestStatus::InProgress;
    request.updated_at = now;
    request
}

pub fn validate_update(patch: &UpdateRequestPayload) -> AppResult<()> {
    if patch.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }
    if let Some(subject) = &patch.subject {
        if subject.trim().is_empty() {
            return Err(AppError::validation("Subject is required"));
        }
    }
    if let Some(duration) = patch.duration {
        if duration.is_nan() || duration < 0.0 {
            return Err(AppError::validation("Duration must be a non-negative number of hours"));
        }
    }
    Ok(())
}

/// Result of merging an update into a stored ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub request: MaintenanceRequest,
    /// False when the merge produced exactly the stored ticket; nothing
    /// needs writing then.
    pub changed: bool,
    /// Equipment to flip to scrapped once the ticket is written.
    pub scrap_equipment: Option<String>,
}

/// Merge `patch` into `current`.
///
/// Moving to repaired stamps `completed_date` with `now` unless the same
/// patch supplies one. Moving to scrap asks the caller to scrap the linked
/// equipment. No transition is refused.
pub fn apply_update(
    current: &MaintenanceRequest,
    patch: &UpdateRequestPayload,
    now: DateTime<Utc>,
) -> UpdateOutcome {
    let mut next = current.clone();

    if let Some(subject) = &patch.subject {
        next.subject = subject.trim().to_string();
    }
    if let Some(description) = &patch.description {
        next.description = description.trim().to_string();
    }
    if let Some(request_type) = patch.request_type {
        next.request_type = request_type;
    }
    if let Some(priority) = patch.priority {
        next.priority = priority;
    }
    if let Some(assigned_to) = &patch.assigned_to {
        next.assigned_to = Some(assigned_to.clone());
    }
    if let Some(scheduled) = patch.scheduled_date {
        next.scheduled_date = Some(scheduled);
    }
    if let Some(completed) = patch.completed_date {
        next.completed_date = Some(completed);
    }
    if let Some(duration) = patch.duration {
        next.duration = Some(duration);
    }
    if let Some(notes) = &patch.notes {
        next.notes = notes.clone();
    }

    let mut scrap_equipment = None;
    if let Some(status) = patch.status {
        next.status = status;
        match status {
            RequestStatus::Repaired if patch.completed_date.is_none() => {
                next.completed_date = Some(now);
            }
            RequestStatus::Scrap => scrap_equipment = Some(next.equipment_id.clone()),
            _ => {}
        }
    }

    let changed = next != *current;
    if changed {
        next.updated_at = now;
    }

    UpdateOutcome {
        request: next,
        changed,
        scrap_equipment,
    }
}

/// Role scope plus the optional equality filters of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFilter {
    pub scope: Scope,
    pub equipment_id: Option<String>,
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub priority: Option<Priority>,
}

impl RequestFilter {
    pub fn scoped(scope: Scope) -> Self {
        RequestFilter {
            scope,
            equipment_id: None,
            status: None,
            request_type: None,
            priority: None,
        }
    }

    pub fn for_equipment(equipment_id: &str) -> Self {
        RequestFilter {
            equipment_id: Some(equipment_id.to_string()),
            ..RequestFilter::scoped(Scope::All)
        }
    }

    /// The equivalent MongoDB query document.
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};

        match &self.scope {
            Scope::All => {}
            Scope::CreatedBy(user_id) => {
                filter.insert("createdBy", user_id.as_str());
            }
            Scope::AssignedOrTeamBacklog { user_id, team_id } => {
                let mut branches = vec![doc! { "assignedTo": user_id.as_str() }];
                if let Some(team_id) = team_id {
                    branches.push(doc! {
                        "status": RequestStatus::New.as_str(),
                        "teamId": team_id.as_str(),
                    });
                }
                filter.insert("$or", branches);
            }
        }

        if let Some(equipment_id) = &self.equipment_id {
            filter.insert("equipmentId", equipment_id.as_str());
        }
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(request_type) = self.request_type {
            filter.insert("type", request_type.as_str());
        }
        if let Some(priority) = self.priority {
            filter.insert("priority", priority.as_str());
        }
        filter
    }

    /// In-process evaluation of the same predicate as [`Self::to_document`].
    pub fn matches(&self, request: &MaintenanceRequest) -> bool {
        let in_scope = match &self.scope {
            Scope::All => true,
            Scope::CreatedBy(user_id) => request.created_by == *user_id,
            Scope::AssignedOrTeamBacklog { user_id, team_id } => {
                let assigned = request.assigned_to.as_deref() == Some(user_id.as_str());
                let backlog = team_id.is_some()
                    && request.status == RequestStatus::New
                    && request.team_id == *team_id;
                assigned || backlog
            }
        };

        in_scope
            && self
                .equipment_id
                .as_ref()
                .map_or(true, |id| request.equipment_id == *id)
            && self.status.map_or(true, |s| request.status == s)
            && self.request_type.map_or(true, |t| request.request_type == t)
            && self.priority.map_or(true, |p| request.priority == p)
    }
}

/// Newest first, the order every listing is returned in.
pub fn sort_newest_first(requests: &mut [MaintenanceRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
