use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, MeResponse, RegisterRequest},
    entity::{
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
        verification_codes::{ActiveModel as CodeActive, Entity as VerificationCodes},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, jwt_secret},
    models::{User, UserRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        email,
        password,
        verification_code,
    } = payload;
    let email = email.trim().to_lowercase();
    let code = verification_code.trim().to_string();
    if email.is_empty() || password.len() < 8 {
        return Err(AppError::BadRequest(
            "email is required and password must be at least 8 characters".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let verification = VerificationCodes::find_by_id(code.clone())
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid verification code".into()))?;
    if verification.claimed_by.is_some() {
        return Err(AppError::Conflict("Verification code already used".into()));
    }
    let role = UserRole::parse(&verification.role)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        orderer_code: Set(code),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut claimed: CodeActive = verification.into();
    claimed.claimed_by = Set(Some(user.id));
    claimed.update(&txn).await?;

    txn.commit().await?;

    let user = user_from_entity(user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    audit::record(
        state,
        None,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "orderer_code": user.orderer_code }),
    )
    .await;

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid email or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let secret = jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        orderer_code: user.orderer_code.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    audit::record(
        state,
        None,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

pub fn me(user: &AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::ok(MeResponse {
        user_id: user.user_id,
        role: user.role,
        orderer_code: user.orderer_code.clone(),
    })
}

fn user_from_entity(model: UserModel) -> AppResult<User> {
    Ok(User {
        id: model.id,
        email: model.email,
        role: UserRole::parse(&model.role)?,
        orderer_code: model.orderer_code,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
