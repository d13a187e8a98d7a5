use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    #[default]
    Operational,
    Maintenance,
    Repair,
    Scrapped,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Repair => "repair",
            EquipmentStatus::Scrapped => "scrapped",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentCategory {
    Production,
    #[serde(rename = "IT Equipment")]
    ItEquipment,
    Logistics,
    #[serde(rename = "HVAC")]
    Hvac,
    Electrical,
    #[default]
    Other,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Production => "Production",
            EquipmentCategory::ItEquipment => "IT Equipment",
            EquipmentCategory::Logistics => "Logistics",
            EquipmentCategory::Hvac => "HVAC",
            EquipmentCategory::Electrical => "Electrical",
            EquipmentCategory::Other => "Other",
        }
    }
}

/// A maintained asset. Every asset belongs to a maintenance team and has a
/// default technician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub serial_number: String,
    #[serde(default)]
    pub category: EquipmentCategory,
    pub department: String,
    pub location: String,
    pub purchase_date: DateTime<Utc>,
    pub warranty: Option<DateTime<Utc>>,
    pub assigned_employee: Option<String>,
    pub team_id: String,
    pub technician_id: String,
    #[serde(default)]
    pub status: EquipmentStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentRequest {
    pub name: String,
    pub serial_number: String,
    pub category: Option<EquipmentCategory>,
    pub department: String,
    pub location: String,
    pub purchase_date: DateTime<Utc>,
    pub warranty: Option<DateTime<Utc>>,
    pub assigned_employee: Option<String>,
    pub team_id: String,
    pub technician_id: String,
    pub status: Option<EquipmentStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipmentRequest {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub category: Option<EquipmentCategory>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub warranty: Option<DateTime<Utc>>,
    pub assigned_employee: Option<String>,
    pub team_id: Option<String>,
    pub technician_id: Option<String>,
    pub status: Option<EquipmentStatus>,
}
