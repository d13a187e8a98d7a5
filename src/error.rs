use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{debug, error};
use serde_json::json;

/// Every failure a handler can report.
///
/// Validation and not-found errors carry a message meant for the caller.
/// Storage failures are passed through unclassified and rendered as a
/// generic 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Storage(_) | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Storage(e) => {
                error!("Storage failure: {}", e);
                "An internal error occurred".to_string()
            }
            AppError::Serialization(e) => {
                error!("Document encoding failure: {}", e);
                "An internal error occurred".to_string()
            }
            AppError::NotFound { entity, id } => {
                debug!("{} {} not found", entity, id);
                self.to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn validation_error_is_400_with_message() {
        let (status, body) = render(AppError::validation("Subject is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Subject is required");
    }

    #[actix_web::test]
    async fn not_found_names_the_entity() {
        let (status, body) = render(AppError::not_found("Equipment", "abc")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Equipment not found");

        let (_, body) = render(AppError::not_found("Request", "abc")).await;
        assert_eq!(body["message"], "Request not found");
    }

    #[actix_web::test]
    async fn auth_failures_map_to_401_and_403() {
        let (status, _) = render(AppError::Unauthorized("Not authorized".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = render(AppError::Forbidden("Role employee may not assign".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Role employee may not assign");
    }
}
