//! `{ "success": true, ... }` envelopes shared by every handler.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(DataResponse {
        success: true,
        data,
    })
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(DataResponse {
        success: true,
        data,
    })
}

pub fn list<T: Serialize>(data: Vec<T>) -> HttpResponse {
    HttpResponse::Ok().json(ListResponse {
        success: true,
        count: data.len(),
        data,
    })
}

pub fn message(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: message.into(),
    })
}
