use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;
use uuid::Uuid;

use crate::http::AppError;
use crate::AppState;

/// Identity of the back-office operator, injected upstream by the
/// gateway as a trusted header. Authentication itself happens before
/// requests reach this service.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: Uuid,
}

const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing x-user-id header"))?;

        let user_id = Uuid::parse_str(header)
            .map_err(|_| AppError::unauthorized("invalid x-user-id header"))?;

        Ok(AdminUser { user_id })
    }
}
