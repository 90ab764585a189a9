use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::families::{
        CreateFamilyRequest, FamilyList, JoinFamilyRequest, TransferOwnershipRequest,
        UpdateFamilyRequest,
    },
    entity::{
        families::{self, ActiveModel as FamilyActive, Column as FamilyCol, Entity as Families},
        family_members::{ActiveModel as MemberActive, Column as MemberCol, Entity as FamilyMembers},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Family, FamilyWithMembers, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

const CODE_LEN: usize = 8;
const CODE_RETRIES: usize = 16;

/// Derive one candidate join code: 8 uppercase hex characters from a fresh
/// v4 uuid. The space is large enough that the collision-check loop below
/// converges almost immediately.
fn candidate_code() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    raw[..CODE_LEN].to_ascii_uppercase()
}

/// Generate a join code, re-rolling on collision. Exhausting the retries is
/// reported as a conflict; it should never happen in practice.
pub async fn generate_unique_code<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..CODE_RETRIES {
        let code = candidate_code();
        let taken = Families::find()
            .filter(FamilyCol::Code.eq(code.as_str()))
            .one(conn)
            .await?;
        if taken.is_none() {
            return Ok(code);
        }
    }
    Err(AppError::Conflict(
        "could not generate a unique family code".into(),
    ))
}

pub async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> AppResult<Option<families::Model>> {
    let family = Families::find()
        .filter(FamilyCol::Code.eq(code))
        .one(conn)
        .await?;
    Ok(family)
}

pub async fn is_member<C: ConnectionTrait>(
    conn: &C,
    family_id: Uuid,
    user_id: Uuid,
) -> AppResult<bool> {
    let membership = FamilyMembers::find()
        .filter(MemberCol::FamilyId.eq(family_id))
        .filter(MemberCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(membership.is_some())
}

/// Ids of every family the user belongs to.
pub async fn member_family_ids<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    let ids = FamilyMembers::find()
        .filter(MemberCol::UserId.eq(user_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.family_id)
        .collect();
    Ok(ids)
}

/// Family-membership gate used by every family-scoped operation. Checked
/// before any mutation begins.
pub async fn ensure_member<C: ConnectionTrait>(
    conn: &C,
    family_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    if is_member(conn, family_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

async fn ensure_owner<C: ConnectionTrait>(
    conn: &C,
    family_id: Uuid,
    user_id: Uuid,
) -> AppResult<families::Model> {
    let family = Families::find_by_id(family_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    if family.owner_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(family)
}

pub async fn create_family(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFamilyRequest,
) -> AppResult<ApiResponse<Family>> {
    let txn = state.orm.begin().await?;

    let family = FamilyActive {
        id: Set(Uuid::new_v4()),
        code: Set(generate_unique_code(&txn).await?),
        nombre: Set(payload.nombre),
        notas: Set(payload.notas),
        owner_id: Set(user.user_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    // The owner is always a member.
    MemberActive {
        user_id: Set(user.user_id),
        family_id: Set(family.id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Family created",
        family.into(),
        Some(Meta::empty()),
    ))
}

pub async fn join_family(
    state: &AppState,
    user: &AuthUser,
    payload: JoinFamilyRequest,
) -> AppResult<ApiResponse<Family>> {
    let family = find_by_code(&state.orm, &payload.code)
        .await?
        .ok_or(AppError::NotFound)?;

    if is_member(&state.orm, family.id, user.user_id).await? {
        return Err(AppError::BadRequest("User is already in this family".into()));
    }

    MemberActive {
        user_id: Set(user.user_id),
        family_id: Set(family.id),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success("Joined family", family.into(), None))
}

pub async fn my_families(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<FamilyList>> {
    let families = if user.is_admin {
        Families::find().all(&state.orm).await?
    } else {
        let u = Users::find_by_id(user.user_id)
            .one(&state.orm)
            .await?
            .ok_or(AppError::NotFound)?;
        u.find_related(Families).all(&state.orm).await?
    };

    let items = families.into_iter().map(Family::from).collect();
    Ok(ApiResponse::success("OK", FamilyList { items }, None))
}

pub async fn family_details(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
) -> AppResult<ApiResponse<FamilyWithMembers>> {
    let family = Families::find_by_id(family_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    ensure_member(&state.orm, family_id, user.user_id).await?;

    let members: Vec<User> = family
        .find_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        FamilyWithMembers {
            family: family.into(),
            members,
        },
        None,
    ))
}

pub async fn remove_member(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    member_id: Uuid,
) -> AppResult<ApiResponse<FamilyWithMembers>> {
    let family = ensure_owner(&state.orm, family_id, user.user_id).await?;

    if member_id == family.owner_id {
        return Err(AppError::BadRequest(
            "Cannot remove the family owner; transfer ownership first".into(),
        ));
    }
    if !is_member(&state.orm, family_id, member_id).await? {
        return Err(AppError::NotFound);
    }

    FamilyMembers::delete_many()
        .filter(MemberCol::FamilyId.eq(family_id))
        .filter(MemberCol::UserId.eq(member_id))
        .exec(&state.orm)
        .await?;

    let members: Vec<User> = family
        .find_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Member removed",
        FamilyWithMembers {
            family: family.into(),
            members,
        },
        None,
    ))
}

pub async fn update_family(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    patch: UpdateFamilyRequest,
) -> AppResult<ApiResponse<Family>> {
    let family = ensure_owner(&state.orm, family_id, user.user_id).await?;

    let mut active: FamilyActive = family.into();
    if let Some(nombre) = patch.nombre.filter(|n| !n.is_empty()) {
        active.nombre = Set(nombre);
    }
    if let Some(notas) = patch.notas {
        active.notas = Set(Some(notas));
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Family updated", updated.into(), None))
}

pub async fn transfer_ownership(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    payload: TransferOwnershipRequest,
) -> AppResult<ApiResponse<Family>> {
    let family = ensure_owner(&state.orm, family_id, user.user_id).await?;

    if !is_member(&state.orm, family_id, payload.new_owner_id).await? {
        return Err(AppError::NotFound);
    }

    let mut active: FamilyActive = family.into();
    active.owner_id = Set(payload.new_owner_id);
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Ownership transferred",
        updated.into(),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_code_shape() {
        let code = candidate_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn candidate_codes_vary() {
        // Not a uniqueness proof, just a sanity check that we are not
        // handing out a constant.
        let a = candidate_code();
        let b = candidate_code();
        let c = candidate_code();
        assert!(a != b || b != c);
    }
}
