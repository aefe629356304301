use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::AppError;
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// A request carrying a valid bearer token.
pub struct AuthClaims(pub Claims);

/// A request carrying a valid bearer token for an admin account.
pub struct AdminClaims(pub Claims);

async fn claims_from_parts(parts: &mut Parts, state: &AppState) -> Result<Claims, AppError> {
    let TypedHeader(auth) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::Unauthorized("Missing authorization header".to_string()))?;

    verify_token(auth.token(), &state.config.jwt_secret)
}

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state).await?;
        Ok(AuthClaims(claims))
    }
}

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state).await?;

        if !claims.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminClaims(claims))
    }
}
