//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use robur_domain::{UserID, UserService};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// The authenticated user, as asserted by the upstream proxy through the
/// `X-User-Id` header. Authentication itself happens outside this service;
/// the id is still required to resolve to a known user.
pub struct CurrentUser(pub UserID);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .ok_or(AppError::Unauthorized)?;
        let value = header.to_str().map_err(|_| AppError::Unauthorized)?;
        let id = Uuid::parse_str(value).map_err(|_| AppError::Unauthorized)?;

        let user = state
            .service
            .get_user(id.into())
            .await
            .map_err(|_| AppError::Unauthorized)?;
        Ok(CurrentUser(user.id))
    }
}
