// src/main.rs

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;

use gearguard::app_state::AppState;
use gearguard::auth::Authentication;
use gearguard::config::Config;
use gearguard::db::MongoDB;
use gearguard::routes;
use gearguard::store::mongo::MongoStore;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io::Error::other)?;
    let mongodb = MongoDB::init(&config.mongo_uri, &config.database_name)
        .await
        .map_err(io::Error::other)?;
    let state = AppState::with_store(Arc::new(MongoStore::new(Arc::new(mongodb))), config.clone());

    info!("Server running at http://{}", config.bind_addr);
    info!("Allowed CORS Origin: {}", config.frontend_origin);
    if config.enforce_edit_policy {
        info!("Request edit policy is enforced");
    }

    let frontend_origin = config.frontend_origin.clone();
    let jwt_secret = config.jwt_secret.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
                http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Authentication::new(jwt_secret.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
