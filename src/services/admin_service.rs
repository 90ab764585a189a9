//! Admin-only management surface: user accounts and family rosters across
//! every family, not just the caller's.
//!
//! Every entry point assumes the router already ran `ensure_admin`; the
//! checks are repeated here so a future route wiring mistake fails closed.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::admin::{AddMemberRequest, AdminCreateUserRequest, AdminUpdateUserRequest, UserPage},
    entity::{
        families::{Column as FamilyCol, Entity as Families},
        family_members::{ActiveModel as MemberActive, Column as MemberCol, Entity as FamilyMembers},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Family, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service,
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserPage>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let total = Users::find().count(&state.orm).await? as i64;
    let items = Users::find()
        .order_by_asc(UserCol::Username)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", UserPage { items }, Some(meta)))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: AdminCreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let taken = Users::find()
        .filter(UserCol::Email.eq(payload.email.clone()))
        .one(&state.orm)
        .await?
        .is_some();
    if taken {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let created = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        username: Set(payload.username),
        password_hash: Set(auth_service::hash_password(&payload.password)?),
        is_admin: Set(payload.is_admin.unwrap_or(false)),
        nombre: Set(payload.nombre),
        direccion: Set(payload.direccion),
        telefono: Set(payload.telefono),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success("User created", created.into(), None))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    target_id: Uuid,
    patch: AdminUpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let target = Users::find_by_id(target_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = target.into();
    if let Some(email) = patch.email {
        active.email = Set(email);
    }
    if let Some(nombre) = patch.nombre {
        active.nombre = Set(Some(nombre));
    }
    if let Some(direccion) = patch.direccion {
        active.direccion = Set(Some(direccion));
    }
    if let Some(telefono) = patch.telefono {
        active.telefono = Set(Some(telefono));
    }
    if let Some(is_admin) = patch.is_admin {
        // An admin may not strip their own flag; lockout protection.
        if target_id == user.user_id && !is_admin {
            return Err(AppError::BadRequest(
                "Cannot revoke your own admin flag".into(),
            ));
        }
        active.is_admin = Set(is_admin);
    }
    if let Some(password) = patch.password.filter(|p| !p.is_empty()) {
        active.password_hash = Set(auth_service::hash_password(&password)?);
    }

    let updated = active.update(&state.orm).await?;
    Ok(ApiResponse::success("User updated", updated.into(), None))
}

/// Idempotent. Membership rows go first so no orphaned roster entries
/// survive the account.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    target_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    if target_id == user.user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }

    let Some(target) = Users::find_by_id(target_id).one(&state.orm).await? else {
        return Ok(ApiResponse::success(
            "User already deleted",
            serde_json::json!({"deleted": false}),
            None,
        ));
    };

    let owned = Families::find()
        .filter(FamilyCol::OwnerId.eq(target_id))
        .count(&state.orm)
        .await?;
    if owned > 0 {
        return Err(AppError::Conflict(
            "User still owns families; transfer ownership first".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    FamilyMembers::delete_many()
        .filter(MemberCol::UserId.eq(target_id))
        .exec(&txn)
        .await?;
    target.delete(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({"deleted": true}),
        None,
    ))
}

pub async fn list_families(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Family>>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let total = Families::find().count(&state.orm).await? as i64;
    let items = Families::find()
        .order_by_asc(FamilyCol::Nombre)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Family::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", items, Some(meta)))
}

pub async fn add_member(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    payload: AddMemberRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    Families::find_by_id(family_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    member_exists(state, payload.user_id).await?;

    let already = FamilyMembers::find()
        .filter(MemberCol::FamilyId.eq(family_id))
        .filter(MemberCol::UserId.eq(payload.user_id))
        .one(&state.orm)
        .await?
        .is_some();
    if already {
        return Ok(ApiResponse::success(
            "Already a member",
            serde_json::json!({"added": false}),
            None,
        ));
    }

    MemberActive {
        user_id: Set(payload.user_id),
        family_id: Set(family_id),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Member added",
        serde_json::json!({"added": true}),
        None,
    ))
}

pub async fn remove_member(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    member_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let family = Families::find_by_id(family_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if family.owner_id == member_id {
        return Err(AppError::BadRequest(
            "Cannot remove the family owner".into(),
        ));
    }

    let result = FamilyMembers::delete_many()
        .filter(MemberCol::FamilyId.eq(family_id))
        .filter(MemberCol::UserId.eq(member_id))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Member removed",
        serde_json::json!({"removed": result.rows_affected > 0}),
        None,
    ))
}

async fn member_exists(state: &AppState, user_id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}
