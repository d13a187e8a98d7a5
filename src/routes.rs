use actix_web::web;

use crate::dashboard_data::get_dashboard_stats;
use crate::equipment::{
    create_equipment, delete_equipment, get_equipment, get_equipment_requests, list_equipment,
    update_equipment,
};
use crate::error::AppError;
use crate::requests::{
    assign_request, create_request, delete_request, get_request, list_requests, update_request,
};
use crate::team_management::{create_team, delete_team, get_team, list_teams, update_team};
use crate::user_management::{
    delete_user, get_technicians_by_team, get_user_by_id, list_users, update_user,
};

/// Malformed bodies and query strings get the same envelope as every other
/// validation failure.
fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    extractor_config(cfg);

    cfg.service(
        web::scope("/api")
            // REQUESTS
            .service(
                web::scope("/requests")
                    .route("", web::get().to(list_requests))
                    .route("", web::post().to(create_request))
                    .route("/{request_id}", web::get().to(get_request))
                    .route("/{request_id}", web::put().to(update_request))
                    .route("/{request_id}", web::delete().to(delete_request))
                    .route("/{request_id}/assign", web::put().to(assign_request)),
            )
            // EQUIPMENT
            .service(
                web::scope("/equipment")
                    .route("", web::get().to(list_equipment))
                    .route("", web::post().to(create_equipment))
                    .route("/{equipment_id}", web::get().to(get_equipment))
                    .route("/{equipment_id}", web::put().to(update_equipment))
                    .route("/{equipment_id}", web::delete().to(delete_equipment))
                    .route("/{equipment_id}/requests", web::get().to(get_equipment_requests)),
            )
            // TEAMS
            .service(
                web::scope("/teams")
                    .route("", web::get().to(list_teams))
                    .route("", web::post().to(create_team))
                    .route("/{team_id}", web::get().to(get_team))
                    .route("/{team_id}", web::put().to(update_team))
                    .route("/{team_id}", web::delete().to(delete_team)),
            )
            // USERS
            .service(
                web::scope("/users")
                    .route("", web::get().to(list_users))
                    .route("/technicians/{team_id}", web::get().to(get_technicians_by_team))
                    .route("/{user_id}", web::get().to(get_user_by_id))
                    .route("/{user_id}", web::put().to(update_user))
                    .route("/{user_id}", web::delete().to(delete_user)),
            )
            // DASHBOARD
            .service(
                web::scope("/dashboard").route("/stats", web::get().to(get_dashboard_stats)),
            ),
    );
}
