use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::auth::{
        ChangePasswordRequest, Claims, LoginRequest, LoginResponse, RegisterRequest, SetupRequest,
        SetupResponse, StatusResponse, UpdateMeRequest,
    },
    entity::{
        families::ActiveModel as FamilyActive,
        family_members::ActiveModel as MemberActive,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Family, User},
    response::{ApiResponse, Meta},
    services::family_service,
    state::AppState,
};

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn issue_token(secret: &str, user_id: Uuid, is_admin: bool) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        is_admin,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok(token)
}

/// Whether the instance still needs its first-run setup. Raw count on the
/// sqlx pool; no auth required.
pub async fn status(state: &AppState) -> AppResult<ApiResponse<StatusResponse>> {
    let total: (i64,) = sqlx::query_as("SELECT count(*) FROM users")
        .fetch_one(&state.pool)
        .await?;
    Ok(ApiResponse::success(
        "OK",
        StatusResponse {
            needs_setup: total.0 == 0,
        },
        None,
    ))
}

/// First-run bootstrap: create the admin user and their family. Only allowed
/// while the users table is empty.
pub async fn setup(state: &AppState, payload: SetupRequest) -> AppResult<ApiResponse<SetupResponse>> {
    let txn = state.orm.begin().await?;

    let existing = Users::find().count(&txn).await?;
    if existing > 0 {
        return Err(AppError::BadRequest(
            "Setup is only allowed on an empty database".into(),
        ));
    }

    let admin = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.admin.email),
        username: Set(payload.admin.username),
        password_hash: Set(hash_password(&payload.admin.password)?),
        is_admin: Set(true),
        nombre: Set(payload.admin.nombre),
        direccion: Set(payload.admin.direccion),
        telefono: Set(payload.admin.telefono),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let family = FamilyActive {
        id: Set(Uuid::new_v4()),
        code: Set(family_service::generate_unique_code(&txn).await?),
        nombre: Set(payload.family_nombre),
        notas: Set(payload.family_notas),
        owner_id: Set(admin.id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    MemberActive {
        user_id: Set(admin.id),
        family_id: Set(family.id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Setup complete",
        SetupResponse {
            admin: admin.into(),
            family: family.into(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let txn = state.orm.begin().await?;

    let exists = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&txn)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        username: Set(payload.username),
        password_hash: Set(hash_password(&payload.password)?),
        is_admin: Set(false),
        nombre: Set(payload.nombre),
        direccion: Set(payload.direccion),
        telefono: Set(payload.telefono),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    // An unknown join code is ignored; registration still succeeds.
    if let Some(code) = payload.family_code.as_deref() {
        if let Some(family) = family_service::find_by_code(&txn, code).await? {
            MemberActive {
                user_id: Set(user.id),
                family_id: Set(family.id),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    Ok(ApiResponse::success("User created", user.into(), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = Users::find()
        .filter(UserCol::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid username or password".into())),
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let token = issue_token(&state.config.jwt_secret, user.id, user.is_admin)?;
    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", model.into(), None))
}

pub async fn update_me(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateMeRequest,
) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = model.into();
    if let Some(nombre) = payload.nombre {
        active.nombre = Set(Some(nombre));
    }
    if let Some(direccion) = payload.direccion {
        active.direccion = Set(Some(direccion));
    }
    if let Some(telefono) = payload.telefono {
        active.telefono = Set(Some(telefono));
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Profile updated", updated.into(), None))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !verify_password(&payload.current_password, &model.password_hash)? {
        return Err(AppError::BadRequest("Incorrect current password".into()));
    }

    let mut active: UserActive = model.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Password changed", updated.into(), None))
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation, decode};

    use super::*;

    #[test]
    fn token_round_trips_with_the_configured_secret() {
        let user_id = Uuid::new_v4();
        let token = issue_token("configured-secret", user_id, true).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"configured-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id.to_string());
        assert!(decoded.claims.is_admin);

        let wrong = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"another-secret"),
            &Validation::default(),
        );
        assert!(wrong.is_err());
    }

    #[test]
    fn hashed_passwords_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
