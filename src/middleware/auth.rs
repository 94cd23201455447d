use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::UserRole};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub orderer_code: String,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role == UserRole::Staff
    }
}

pub fn ensure_role(user: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Staff)
}

pub fn ensure_customer(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Customer)
}

pub(crate) fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?
            .trim();

        let secret = jwt_secret()?;
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;
        let role = UserRole::parse(&decoded.claims.role).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            role,
            orderer_code: decoded.claims.orderer_code,
        })
    }
}
