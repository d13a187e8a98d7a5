use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;

use crate::app_state::AppState;
use crate::auth::current_actor;
use crate::error::{AppError, AppResult};
use crate::models::{UpdateUserRequest, User, UserProfile};
use crate::policy::{self, Operation};
use crate::response;

async fn load(data: &AppState, user_id: &str) -> AppResult<User> {
    data.users
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id))
}

fn profiles(mut users: Vec<User>) -> Vec<UserProfile> {
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    users.iter().map(UserProfile::from).collect()
}

/// GET /api/users
pub async fn list_users(req: HttpRequest, data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ListUsers)?;

    let users = data.users.list_active().await?;
    Ok(response::list(profiles(users)))
}

/// GET /api/users/technicians/{team_id}
/// The assignment choices offered for a team's tickets.
pub async fn get_technicians_by_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewUser)?;

    let technicians = data.users.technicians_of(&team_id).await?;
    Ok(response::list(profiles(technicians)))
}

/// GET /api/users/{id}
pub async fn get_user_by_id(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewUser)?;

    let user = load(&data, &path).await?;
    Ok(response::ok(UserProfile::from(&user)))
}

/// PUT /api/users/{id}
pub async fn update_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageUsers)?;

    let user_id = path.into_inner();
    let patch = payload.into_inner();
    let mut user = load(&data, &user_id).await?;

    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        user.name = name.trim().to_string();
    }
    if let Some(email) = patch.email {
        if !email.contains('@') {
            return Err(AppError::validation("Please provide a valid email"));
        }
        user.email = email.trim().to_lowercase();
    }
    if let Some(role) = patch.role {
        user.role = role;
    }
    if let Some(team_id) = patch.team_id {
        user.team_id = Some(team_id).filter(|t| !t.is_empty());
    }
    if let Some(avatar) = patch.avatar {
        user.avatar = Some(avatar);
    }
    if let Some(is_active) = patch.is_active {
        user.is_active = is_active;
    }
    user.updated_at = Utc::now();

    if !data.users.replace(&user).await? {
        return Err(AppError::not_found("User", user_id));
    }
    info!("User {} updated by {}", user_id, actor.id);
    Ok(response::ok(UserProfile::from(&user)))
}

/// DELETE /api/users/{id}
/// Deactivates the account; the document stays.
pub async fn delete_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ManageUsers)?;

    let user_id = path.into_inner();
    let mut user = load(&data, &user_id).await?;
    user.is_active = false;
    user.updated_at = Utc::now();
    if !data.users.replace(&user).await? {
        return Err(AppError::not_found("User", user_id));
    }

    info!("User {} deactivated by {}", user_id, actor.id);
    Ok(response::message("User deleted successfully"))
}
