// src/dashboard_data.rs

use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app_state::AppState;
use crate::auth::current_actor;
use crate::error::AppResult;
use crate::lifecycle::{self, RequestFilter};
use crate::models::{
    Equipment, EquipmentCategory, MaintenanceRequest, Priority, RequestStatus, RequestType, Team,
};
use crate::policy::{self, Operation, Scope};
use crate::response;

const RECENT_REQUESTS: usize = 5;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_equipment: usize,
    pub total_users: usize,
    pub total_teams: usize,
    pub total_requests: usize,
    pub active_requests: usize,
    pub overdue_requests: usize,
    pub completed_requests: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestBreakdown {
    pub new: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    pub corrective: usize,
    pub preventive: usize,
    pub high_priority: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamLoad {
    #[serde(rename = "_id")]
    pub team_id: String,
    pub team_name: String,
    pub team_icon: String,
    pub count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub category: EquipmentCategory,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overview: Overview,
    pub requests: RequestBreakdown,
    pub recent_requests: Vec<MaintenanceRequest>,
    pub requests_by_team: Vec<TeamLoad>,
    pub equipment_by_category: Vec<CategoryCount>,
}

/// Open tickets whose scheduled date fell before the start of `now`'s day.
fn is_overdue(request: &MaintenanceRequest, start_of_today: DateTime<Utc>) -> bool {
    !request.status.is_closed()
        && request
            .scheduled_date
            .map_or(false, |date| date < start_of_today)
}

/// Aggregate the dashboard from full listings. `equipment`, `teams` and
/// `total_users` cover active records only.
pub fn compute_stats(
    mut requests: Vec<MaintenanceRequest>,
    equipment: &[Equipment],
    teams: &[Team],
    total_users: usize,
    now: DateTime<Utc>,
) -> DashboardStats {
    let start_of_today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now);

    let count = |pred: fn(&MaintenanceRequest) -> bool| requests.iter().filter(|r| pred(r)).count();

    let active = count(|r| !r.status.is_closed());
    let overdue = requests
        .iter()
        .filter(|r| is_overdue(r, start_of_today))
        .count();
    let completed = count(|r| r.status == RequestStatus::Repaired);

    let breakdown = RequestBreakdown {
        new: count(|r| r.status == RequestStatus::New),
        in_progress: count(|r| r.status == RequestStatus::InProgress),
        completed,
        overdue,
        corrective: count(|r| r.request_type == RequestType::Corrective),
        preventive: count(|r| r.request_type == RequestType::Preventive),
        high_priority: count(|r| r.priority == Priority::High && !r.status.is_closed()),
    };

    // Open tickets per team; tickets whose team no longer exists are dropped.
    let mut per_team: HashMap<&str, usize> = HashMap::new();
    for request in requests.iter().filter(|r| !r.status.is_closed()) {
        if let Some(team_id) = request.team_id.as_deref() {
            *per_team.entry(team_id).or_default() += 1;
        }
    }
    let mut requests_by_team: Vec<TeamLoad> = teams
        .iter()
        .filter_map(|team| {
            per_team.get(team.id.as_str()).map(|count| TeamLoad {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                team_icon: team.icon.clone(),
                count: *count,
            })
        })
        .collect();
    requests_by_team.sort_by(|a, b| b.count.cmp(&a.count).then(a.team_name.cmp(&b.team_name)));

    let mut per_category: HashMap<EquipmentCategory, usize> = HashMap::new();
    for item in equipment.iter().filter(|e| e.is_active) {
        *per_category.entry(item.category).or_default() += 1;
    }
    let mut equipment_by_category: Vec<CategoryCount> = per_category
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    equipment_by_category.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()));

    let overview = Overview {
        total_equipment: equipment.iter().filter(|e| e.is_active).count(),
        total_users,
        total_teams: teams.iter().filter(|t| t.is_active).count(),
        total_requests: requests.len(),
        active_requests: active,
        overdue_requests: overdue,
        completed_requests: completed,
    };

    lifecycle::sort_newest_first(&mut requests);
    requests.truncate(RECENT_REQUESTS);

    DashboardStats {
        overview,
        requests: breakdown,
        recent_requests: requests,
        requests_by_team,
        equipment_by_category,
    }
}

/// GET /api/dashboard/stats
pub async fn get_dashboard_stats(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let actor = current_actor(&req, &data).await?;
    policy::authorize(&actor, Operation::ViewDashboard)?;

    let everything = RequestFilter::scoped(Scope::All);
    let (requests, equipment, teams, users) = tokio::try_join!(
        data.requests.find(&everything),
        data.equipment.list_active(),
        data.teams.list_active(),
        data.users.list_active(),
    )?;

    let stats = compute_stats(requests, &equipment, &teams, users.len(), Utc::now());
    Ok(response::ok(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EquipmentStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap()
    }

    fn request(id: &str, status: RequestStatus, team: &str, age_minutes: i64) -> MaintenanceRequest {
        MaintenanceRequest {
            id: id.into(),
            subject: format!("ticket {id}"),
            description: String::new(),
            equipment_id: "eq-1".into(),
            request_type: RequestType::Corrective,
            status,
            priority: Priority::Medium,
            created_by: "emp-1".into(),
            assigned_to: None,
            team_id: Some(team.into()),
            category: Some("Production".into()),
            scheduled_date: None,
            completed_date: None,
            duration: None,
            notes: String::new(),
            created_at: now() - Duration::minutes(age_minutes),
            updated_at: now() - Duration::minutes(age_minutes),
        }
    }

    fn team(id: &str, name: &str) -> Team {
        Team {
            id: id.into(),
            name: name.into(),
            icon: "🔧".into(),
            description: String::new(),
            members: vec![],
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn equipment(id: &str, category: EquipmentCategory) -> Equipment {
        Equipment {
            id: id.into(),
            name: id.into(),
            serial_number: id.into(),
            category,
            department: "Plant".into(),
            location: "Hall".into(),
            purchase_date: now(),
            warranty: None,
            assigned_employee: None,
            team_id: "t1".into(),
            technician_id: "tech-1".into(),
            status: EquipmentStatus::Operational,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn overdue_ignores_closed_and_today() {
        let mut late_open = request("a", RequestStatus::InProgress, "t1", 10);
        late_open.scheduled_date = Some(now() - Duration::days(2));
        let mut late_repaired = request("b", RequestStatus::Repaired, "t1", 20);
        late_repaired.scheduled_date = Some(now() - Duration::days(2));
        let mut late_scrap = request("c", RequestStatus::Scrap, "t1", 30);
        late_scrap.scheduled_date = Some(now() - Duration::days(2));
        let mut due_this_morning = request("d", RequestStatus::New, "t1", 40);
        due_this_morning.scheduled_date = Some(now() - Duration::hours(3));

        let stats = compute_stats(
            vec![late_open, late_repaired, late_scrap, due_this_morning],
            &[],
            &[],
            0,
            now(),
        );
        assert_eq!(stats.overview.overdue_requests, 1);
        assert_eq!(stats.requests.overdue, 1);
        assert_eq!(stats.overview.active_requests, 2);
        assert_eq!(stats.overview.completed_requests, 1);
    }

    #[test]
    fn team_load_counts_open_tickets() {
        let requests = vec![
            request("a", RequestStatus::New, "t1", 1),
            request("b", RequestStatus::InProgress, "t1", 2),
            request("c", RequestStatus::Repaired, "t1", 3),
            request("d", RequestStatus::New, "t2", 4),
            request("e", RequestStatus::New, "gone", 5),
        ];
        let teams = vec![team("t1", "Mechanics"), team("t2", "IT")];
        let stats = compute_stats(requests, &[], &teams, 3, now());

        assert_eq!(stats.requests_by_team.len(), 2);
        assert_eq!(stats.requests_by_team[0].team_name, "Mechanics");
        assert_eq!(stats.requests_by_team[0].count, 2);
        assert_eq!(stats.requests_by_team[1].count, 1);
        assert_eq!(stats.overview.total_users, 3);
        assert_eq!(stats.overview.total_teams, 2);
    }

    #[test]
    fn recent_requests_are_the_five_newest() {
        let requests = (0..7)
            .map(|i| request(&format!("r{i}"), RequestStatus::New, "t1", i))
            .collect();
        let stats = compute_stats(requests, &[], &[], 0, now());
        let ids: Vec<&str> = stats.recent_requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r0", "r1", "r2", "r3", "r4"]);
        assert_eq!(stats.overview.total_requests, 7);
    }

    #[test]
    fn equipment_grouped_by_category() {
        let equipment = vec![
            equipment("a", EquipmentCategory::Production),
            equipment("b", EquipmentCategory::Production),
            equipment("c", EquipmentCategory::Hvac),
        ];
        let stats = compute_stats(vec![], &equipment, &[], 0, now());
        assert_eq!(stats.overview.total_equipment, 3);
        assert_eq!(
            stats.equipment_by_category,
            vec![
                CategoryCount { category: EquipmentCategory::Hvac, count: 1 },
                CategoryCount { category: EquipmentCategory::Production, count: 2 },
            ]
        );
    }
}
