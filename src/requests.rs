// src/requests.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info, warn};

use crate::app_state::AppState;
use crate::auth::current_actor;
use crate::error::{AppError, AppResult};
use crate::lifecycle::{self, RequestFilter};
use crate::models::{
    AssignRequestPayload, CreateRequestPayload, EquipmentStatus, MaintenanceRequest, RequestQuery,
    UpdateRequestPayload, User,
};
use crate::policy::{self, Operation};
use crate::response;

/// GET /api/requests
/// Lists the requests visible to the caller, newest first.
pub async fn list_requests(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<RequestQuery>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    let scope = policy::authorize(&actor, Operation::ListRequests)?;

    let query = query.into_inner();
    let filter = RequestFilter {
        status: query.status,
        request_type: query.request_type,
        priority: query.priority,
        ..RequestFilter::scoped(scope)
    };
    debug!("Listing requests for {} with {:?}", actor.id, filter);

    let mut requests = data.requests.find(&filter).await?;
    lifecycle::sort_newest_first(&mut requests);
    Ok(response::list(requests))
}

/// GET /api/requests/{id}
pub async fn get_request(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewRequest)?;

    let request = load(&data, &path).await?;
    Ok(response::ok(request))
}

/// POST /api/requests
/// Opens a ticket against a piece of equipment. The equipment's team and
/// category are copied onto the ticket.
pub async fn create_request(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateRequestPayload>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::CreateRequest)?;
    debug!("create_request called by {} with payload: {:?}", actor.id, payload);

    let new = lifecycle::validate_new_request(payload.into_inner())?;
    let equipment = data
        .equipment
        .resolve(&new.equipment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment", new.equipment_id.as_str()))?;

    let request = lifecycle::open_request(new, &equipment, &actor.id, Utc::now());
    data.requests.insert(&request).await?;

    info!(
        "Request {} created by {} for equipment {}",
        request.id, actor.id, equipment.id
    );
    Ok(response::created(request))
}

/// PUT /api/requests/{id}
/// Merges the supplied fields. Moving to `repaired` stamps the completion
/// date; moving to `scrap` scraps the equipment after the ticket is written.
pub async fn update_request(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRequestPayload>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::UpdateRequest)?;

    let request_id = path.into_inner();
    let patch = payload.into_inner();
    debug!("Updating request {} with {:?}", request_id, patch);

    lifecycle::validate_update(&patch)?;
    let current = load(&data, &request_id).await?;
    check_edit_hooks(&actor, &current, &patch, data.config.enforce_edit_policy)?;

    let outcome = lifecycle::apply_update(&current, &patch, Utc::now());
    if outcome.changed {
        if !data.requests.replace(&outcome.request).await? {
            return Err(AppError::not_found("Request", request_id));
        }
        info!(
            "Request {} updated by {} (status {})",
            request_id,
            actor.id,
            outcome.request.status.as_str()
        );
    }

    // The ticket is already written; a failure here is reported but the
    // ticket keeps its new status.
    if let Some(equipment_id) = &outcome.scrap_equipment {
        if data
            .equipment
            .set_status(equipment_id, EquipmentStatus::Scrapped)
            .await?
        {
            info!("Equipment {} scrapped via request {}", equipment_id, request_id);
        } else {
            warn!(
                "Request {} scrapped but equipment {} does not exist",
                request_id, equipment_id
            );
        }
    }

    Ok(response::ok(outcome.request))
}

/// PUT /api/requests/{id}/assign
/// Assigns the named technician, or the caller when none is given, and
/// moves the ticket to in-progress.
pub async fn assign_request(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::AssignRequest)?;

    let request_id = path.into_inner();
    let technician_id = assign_payload(&body)?
        .technician_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| actor.id.clone());

    let current = load(&data, &request_id).await?;
    let assigned = lifecycle::assign(current, technician_id, Utc::now());
    if !data.requests.replace(&assigned).await? {
        return Err(AppError::not_found("Request", request_id));
    }

    info!(
        "Request {} assigned to {} by {}",
        request_id,
        assigned.assigned_to.as_deref().unwrap_or_default(),
        actor.id
    );
    Ok(response::ok(assigned))
}

/// DELETE /api/requests/{id}
pub async fn delete_request(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::DeleteRequest)?;

    let request_id = path.into_inner();
    if !data.requests.delete(&request_id).await? {
        return Err(AppError::not_found("Request", request_id));
    }

    info!("Request {} deleted by {}", request_id, actor.id);
    Ok(response::message("Request deleted successfully"))
}

/// The assign body is optional, but one that is sent must parse.
fn assign_payload(body: &[u8]) -> AppResult<AssignRequestPayload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AssignRequestPayload::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid assignment body: {}", e)))
}

async fn load(data: &AppState, request_id: &str) -> AppResult<MaintenanceRequest> {
    data.requests
        .get(request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request", request_id))
}

/// Evaluate the edit hooks for an update. Violations are refused only when
/// enforcement is switched on; otherwise they are logged and let through.
fn check_edit_hooks(
    actor: &User,
    request: &MaintenanceRequest,
    patch: &UpdateRequestPayload,
    enforce: bool,
) -> AppResult<()> {
    let mut refused = Vec::new();
    if patch.touches_details() && !policy::may_edit_details(actor, request) {
        refused.push("details");
    }
    if patch.touches_workflow() && !policy::may_edit_workflow(actor) {
        refused.push("status or assignee");
    }
    if refused.is_empty() {
        return Ok(());
    }

    let msg = format!(
        "Role {} may not edit the {} of request {}",
        actor.role.as_str(),
        refused.join(" and "),
        request.id
    );
    if enforce {
        Err(AppError::Forbidden(msg))
    } else {
        warn!("{} (user {}); edit allowed", msg, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_body_may_be_empty() {
        assert_eq!(assign_payload(b"").unwrap().technician_id, None);
        assert_eq!(assign_payload(b" \n").unwrap().technician_id, None);
        assert_eq!(
            assign_payload(br#"{"technicianId":"tech-7"}"#)
                .unwrap()
                .technician_id
                .as_deref(),
            Some("tech-7")
        );
    }

    #[test]
    fn malformed_assign_body_is_rejected() {
        for body in [&br#"{"technicianId": 5}"#[..], b"not json"] {
            let err = assign_payload(body).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }
}
