// team_management.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::current_actor;
use crate::error::{AppError, AppResult};
use crate::models::{CreateTeamRequest, Team, UpdateTeamRequest, DEFAULT_TEAM_ICON};
use crate::policy::{self, Operation};
use crate::response;

fn team_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Team name is required"));
    }
    Ok(name.to_string())
}

async fn load(data: &AppState, team_id: &str) -> AppResult<Team> {
    data.teams
        .get(team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team", team_id))
}

// GET /api/teams
// Active teams, newest first.
pub async fn list_teams(req: HttpRequest, data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewTeams)?;

    let mut teams = data.teams.list_active().await?;
    teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(response::list(teams))
}

// GET /api/teams/{team_id}
pub async fn get_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewTeams)?;

    Ok(response::ok(load(&data, &team_id).await?))
}

// POST /api/teams
pub async fn create_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_info: web::Json<CreateTeamRequest>,
) -> AppResult<HttpResponse> {
    debug!("create_team endpoint called with payload: {:?}", team_info);
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageTeams)?;

    let team_info = team_info.into_inner();
    let now = Utc::now();
    let new_team = Team {
        id: Uuid::new_v4().to_string(),
        name: team_name(&team_info.name)?,
        icon: team_info
            .icon
            .filter(|icon| !icon.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEAM_ICON.to_string()),
        description: team_info.description.unwrap_or_default(),
        members: team_info.members,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    data.teams.insert(&new_team).await?;
    info!("Team created successfully: {} ({})", new_team.name, new_team.id);
    Ok(response::created(new_team))
}

// PUT /api/teams/{team_id}
pub async fn update_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
    team_info: web::Json<UpdateTeamRequest>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageTeams)?;

    let team_id = team_id.into_inner();
    let patch = team_info.into_inner();
    let mut team = load(&data, &team_id).await?;

    if let Some(name) = patch.name {
        team.name = team_name(&name)?;
    }
    if let Some(icon) = patch.icon {
        team.icon = icon;
    }
    if let Some(description) = patch.description {
        team.description = description;
    }
    if let Some(members) = patch.members {
        team.members = members;
    }
    team.updated_at = Utc::now();

    if !data.teams.replace(&team).await? {
        return Err(AppError::not_found("Team", team_id));
    }
    info!("Team {} updated", team_id);
    Ok(response::ok(team))
}

// DELETE /api/teams/{team_id}
// Soft delete; members and tickets keep pointing at the team.
pub async fn delete_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageTeams)?;

    let team_id = team_id.into_inner();
    let mut team = load(&data, &team_id).await?;
    team.is_active = false;
    team.updated_at = Utc::now();
    if !data.teams.replace(&team).await? {
        return Err(AppError::not_found("Team", team_id));
    }

    info!("Team {} deactivated", team_id);
    Ok(response::message("Team deleted successfully"))
}
