#![allow(dead_code)]

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;

use gearguard::app_state::AppState;
use gearguard::auth::{Authentication, Claims};
use gearguard::config::Config;
use gearguard::models::{
    Equipment, EquipmentCategory, EquipmentStatus, MaintenanceRequest, Priority, RequestStatus,
    RequestType, Role, Team, User,
};
use gearguard::routes;
use gearguard::store::memory::MemoryStore;

pub const SECRET: &str = "test-secret";

pub const ADMIN: &str = "admin-1";
pub const MANAGER: &str = "manager-1";
pub const TECH_A: &str = "tech-a";
pub const TECH_B: &str = "tech-b";
pub const EMPLOYEE: &str = "employee-1";
pub const OTHER_EMPLOYEE: &str = "employee-2";

pub const TEAM_A: &str = "team-a";
pub const TEAM_B: &str = "team-b";

pub const PRESS: &str = "eq-press";
pub const LAPTOP: &str = "eq-laptop";

/// Build a test `Config`. The Mongo URI is never dialled.
pub fn test_config() -> Config {
    Config {
        mongo_uri: "mongodb://localhost:27017".to_string(),
        database_name: "gearguard_test".to_string(),
        jwt_secret: SECRET.to_string(),
        frontend_origin: "http://localhost:3000".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        enforce_edit_policy: false,
    }
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

pub fn user(id: &str, role: Role, team: Option<&str>) -> User {
    User {
        id: id.to_string(),
        name: id.to_string(),
        email: format!("{id}@gearguard.test"),
        role,
        team_id: team.map(str::to_string),
        avatar: None,
        is_active: true,
        password: Some("$2b$10$hash".to_string()),
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn team(id: &str, name: &str, members: &[&str]) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        icon: "🔧".to_string(),
        description: String::new(),
        members: members.iter().map(|m| m.to_string()).collect(),
        is_active: true,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn equipment(id: &str, team: &str, category: EquipmentCategory) -> Equipment {
    Equipment {
        id: id.to_string(),
        name: id.to_string(),
        serial_number: format!("SN-{id}"),
        category,
        department: "Operations".to_string(),
        location: "Building 1".to_string(),
        purchase_date: at(0),
        warranty: None,
        assigned_employee: None,
        team_id: team.to_string(),
        technician_id: TECH_A.to_string(),
        status: EquipmentStatus::Operational,
        is_active: true,
        created_at: at(0),
        updated_at: at(0),
    }
}

/// A ticket placed straight into the store, bypassing the API.
pub fn ticket(
    id: &str,
    created_by: &str,
    team: &str,
    status: RequestStatus,
    assigned_to: Option<&str>,
    hour: u32,
) -> MaintenanceRequest {
    MaintenanceRequest {
        id: id.to_string(),
        subject: format!("ticket {id}"),
        description: String::new(),
        equipment_id: PRESS.to_string(),
        request_type: RequestType::Corrective,
        status,
        priority: Priority::Medium,
        created_by: created_by.to_string(),
        assigned_to: assigned_to.map(str::to_string),
        team_id: Some(team.to_string()),
        category: Some("Production".to_string()),
        scheduled_date: None,
        completed_date: None,
        duration: None,
        notes: String::new(),
        created_at: at(hour),
        updated_at: at(hour),
    }
}

/// Two teams, one technician each, a manager, an admin, two employees and
/// one asset per team.
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.put_user(user(ADMIN, Role::Admin, None));
    store.put_user(user(MANAGER, Role::Manager, None));
    store.put_user(user(TECH_A, Role::Technician, Some(TEAM_A)));
    store.put_user(user(TECH_B, Role::Technician, Some(TEAM_B)));
    store.put_user(user(EMPLOYEE, Role::Employee, None));
    store.put_user(user(OTHER_EMPLOYEE, Role::Employee, None));
    store.put_team(team(TEAM_A, "Mechanics", &[TECH_A]));
    store.put_team(team(TEAM_B, "IT Support", &[TECH_B]));
    store.put_equipment(equipment(PRESS, TEAM_A, EquipmentCategory::Production));
    store.put_equipment(equipment(LAPTOP, TEAM_B, EquipmentCategory::ItEquipment));
    store
}

pub fn token_for(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Test client over the full route table, backed by one shared store.
pub struct TestClient {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = seeded_store();
        let state = AppState::with_store(store.clone(), config);
        TestClient { store, state }
    }

    pub async fn send(&self, req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .wrap(Authentication::new(SECRET))
                .app_data(web::Data::new(self.state.clone()))
                .configure(routes::configure),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn authed(req: test::TestRequest, user_id: &str) -> test::TestRequest {
        req.insert_header((AUTHORIZATION, format!("Bearer {}", token_for(user_id))))
    }

    pub async fn get(&self, path: &str, as_user: &str) -> (StatusCode, Value) {
        self.send(Self::authed(test::TestRequest::get().uri(path), as_user))
            .await
    }

    pub async fn post(&self, path: &str, as_user: &str, body: Value) -> (StatusCode, Value) {
        self.send(Self::authed(
            test::TestRequest::post().uri(path).set_json(body),
            as_user,
        ))
        .await
    }

    pub async fn put(&self, path: &str, as_user: &str, body: Value) -> (StatusCode, Value) {
        self.send(Self::authed(
            test::TestRequest::put().uri(path).set_json(body),
            as_user,
        ))
        .await
    }

    pub async fn delete(&self, path: &str, as_user: &str) -> (StatusCode, Value) {
        self.send(Self::authed(test::TestRequest::delete().uri(path), as_user))
            .await
    }
}

/// Ids of a `{ data: [...] }` listing, in response order.
pub fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|item| item["_id"].as_str().unwrap().to_string())
        .collect()
}
