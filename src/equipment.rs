// src/equipment.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::current_actor;
use crate::error::{AppError, AppResult};
use crate::lifecycle::{self, RequestFilter};
use crate::models::{CreateEquipmentRequest, Equipment, UpdateEquipmentRequest};
use crate::policy::{self, Operation};
use crate::response;

fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn build_equipment(payload: CreateEquipmentRequest) -> AppResult<Equipment> {
    let now = Utc::now();
    Ok(Equipment {
        id: Uuid::new_v4().to_string(),
        name: required(&payload.name, "Equipment name")?,
        serial_number: required(&payload.serial_number, "Serial number")?,
        category: payload.category.unwrap_or_default(),
        department: required(&payload.department, "Department")?,
        location: required(&payload.location, "Location")?,
        purchase_date: payload.purchase_date,
        warranty: payload.warranty,
        assigned_employee: payload.assigned_employee,
        team_id: required(&payload.team_id, "Maintenance team")?,
        technician_id: required(&payload.technician_id, "Default technician")?,
        status: payload.status.unwrap_or_default(),
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

fn merge_equipment(mut equipment: Equipment, patch: UpdateEquipmentRequest) -> AppResult<Equipment> {
    if let Some(name) = patch.name {
        equipment.name = required(&name, "Equipment name")?;
    }
    if let Some(serial_number) = patch.serial_number {
        equipment.serial_number = required(&serial_number, "Serial number")?;
    }
    if let Some(category) = patch.category {
        equipment.category = category;
    }
    if let Some(department) = patch.department {
        equipment.department = required(&department, "Department")?;
    }
    if let Some(location) = patch.location {
        equipment.location = required(&location, "Location")?;
    }
    if let Some(purchase_date) = patch.purchase_date {
        equipment.purchase_date = purchase_date;
    }
    if let Some(warranty) = patch.warranty {
        equipment.warranty = Some(warranty);
    }
    if let Some(assigned_employee) = patch.assigned_employee {
        equipment.assigned_employee = Some(assigned_employee);
    }
    if let Some(team_id) = patch.team_id {
        equipment.team_id = required(&team_id, "Maintenance team")?;
    }
    if let Some(technician_id) = patch.technician_id {
        equipment.technician_id = required(&technician_id, "Default technician")?;
    }
    if let Some(status) = patch.status {
        equipment.status = status;
    }
    equipment.updated_at = Utc::now();
    Ok(equipment)
}

async fn load(data: &AppState, equipment_id: &str) -> AppResult<Equipment> {
    data.equipment
        .resolve(equipment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment", equipment_id))
}

/// GET /api/equipment
pub async fn list_equipment(req: HttpRequest, data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewEquipment)?;

    let mut equipment = data.equipment.list_active().await?;
    equipment.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(response::list(equipment))
}

/// GET /api/equipment/{id}
pub async fn get_equipment(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewEquipment)?;

    Ok(response::ok(load(&data, &path).await?))
}

/// GET /api/equipment/{id}/requests
/// Maintenance history of one asset, newest first.
pub async fn get_equipment_requests(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewEquipment)?;

    let mut requests = data
        .requests
        .find(&RequestFilter::for_equipment(&path))
        .await?;
    lifecycle::sort_newest_first(&mut requests);
    Ok(response::list(requests))
}

/// POST /api/equipment
pub async fn create_equipment(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateEquipmentRequest>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageEquipment)?;
    debug!("create_equipment called with payload: {:?}", payload);

    let equipment = build_equipment(payload.into_inner())?;
    data.equipment.insert(&equipment).await?;

    info!("Equipment {} ({}) created", equipment.id, equipment.name);
    Ok(response::created(equipment))
}

/// PUT /api/equipment/{id}
/// Later team or category changes do not touch tickets already opened.
pub async fn update_equipment(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateEquipmentRequest>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageEquipment)?;

    let equipment_id = path.into_inner();
    let current = load(&data, &equipment_id).await?;
    let updated = merge_equipment(current, payload.into_inner())?;
    if !data.equipment.replace(&updated).await? {
        return Err(AppError::not_found("Equipment", equipment_id));
    }

    info!("Equipment {} updated", equipment_id);
    Ok(response::ok(updated))
}

/// DELETE /api/equipment/{id}
/// Soft delete: the asset disappears from listings but keeps its history.
pub async fn delete_equipment(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageEquipment)?;

    let equipment_id = path.into_inner();
    let mut equipment = load(&data, &equipment_id).await?;
    equipment.is_active = false;
    equipment.updated_at = Utc::now();
    if !data.equipment.replace(&equipment).await? {
        return Err(AppError::not_found("Equipment", equipment_id));
    }

    info!("Equipment {} deactivated", equipment_id);
    Ok(response::message("Equipment deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentCategory, EquipmentStatus};
    use chrono::TimeZone;

    fn payload() -> CreateEquipmentRequest {
        CreateEquipmentRequest {
            name: " Lathe ".into(),
            serial_number: "LT-001".into(),
            category: None,
            department: "Workshop".into(),
            location: "Bay 2".into(),
            purchase_date: Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
            warranty: None,
            assigned_employee: None,
            team_id: "team-1".into(),
            technician_id: "tech-1".into(),
            status: None,
        }
    }

    #[test]
    fn new_equipment_gets_defaults() {
        let equipment = build_equipment(payload()).unwrap();
        assert_eq!(equipment.name, "Lathe");
        assert_eq!(equipment.category, EquipmentCategory::Other);
        assert_eq!(equipment.status, EquipmentStatus::Operational);
        assert!(equipment.is_active);
    }

    #[test]
    fn team_is_required() {
        let err = build_equipment(CreateEquipmentRequest {
            team_id: "  ".into(),
            ..payload()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Maintenance team is required");
    }

    #[test]
    fn merge_changes_only_supplied_fields() {
        let equipment = build_equipment(payload()).unwrap();
        let merged = merge_equipment(
            equipment.clone(),
            UpdateEquipmentRequest {
                category: Some(EquipmentCategory::Hvac),
                team_id: Some("team-2".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(merged.category, EquipmentCategory::Hvac);
        assert_eq!(merged.team_id, "team-2");
        assert_eq!(merged.name, equipment.name);
        assert_eq!(merged.serial_number, equipment.serial_number);
    }
}
