//! GearGuard maintenance-request API.
//!
//! Employees report equipment breakdowns, technicians and managers work the
//! resulting tickets, admins look after equipment, teams and users. The
//! ticket lifecycle lives in [`lifecycle`], access rules in [`policy`], and
//! storage behind the traits in [`store`].

pub mod app_state;
pub mod auth;
pub mod config;
pub mod dashboard_data;
pub mod db;
pub mod equipment;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod policy;
pub mod requests;
pub mod response;
pub mod routes;
pub mod store;
pub mod team_management;
pub mod user_management;
