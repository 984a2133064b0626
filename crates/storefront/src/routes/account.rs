//! Account handlers: profile and saved addresses.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use marigold_core::AddressId;

use crate::db::addresses::{Address, AddressInput, AddressRepository};
use crate::db::profile::{ProfileInput, ProfileRepository, UserProfile};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response for `GET /account/profile`.
///
/// A customer who has never saved profile details still gets their email
/// back - that much we always know from the session.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub profile: Option<UserProfile>,
}

/// The customer's profile.
///
/// GET /account/profile
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let profile = ProfileRepository::new(state.pool()).get(&user.email).await?;

    Ok(Json(ProfileResponse {
        email: user.email.into_inner(),
        profile,
    }))
}

/// Update the customer's profile.
///
/// PUT /account/profile
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<ProfileInput>,
) -> Result<Json<UserProfile>> {
    let profile = ProfileRepository::new(state.pool())
        .upsert(&user.email, &input)
        .await?;

    Ok(Json(profile))
}

/// Response for `GET /account/addresses`.
#[derive(Debug, Serialize)]
pub struct AddressListResponse {
    pub addresses: Vec<Address>,
}

/// The customer's saved addresses, default first.
///
/// GET /account/addresses
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AddressListResponse>> {
    let addresses = AddressRepository::new(state.pool()).list(&user.email).await?;

    Ok(Json(AddressListResponse { addresses }))
}

/// Save a new address.
///
/// POST /account/addresses
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = AddressRepository::new(state.pool())
        .create(&user.email, &input)
        .await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// Update a saved address.
///
/// PUT /account/addresses/{id}
///
/// # Errors
///
/// 404 if the address does not exist or belongs to someone else.
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .update(AddressId::new(id), &user.email, &input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("address {id}"))
            }
            other => other.into(),
        })?;

    Ok(Json(address))
}

/// Delete a saved address.
///
/// DELETE /account/addresses/{id}
///
/// # Errors
///
/// 404 if the address does not exist or belongs to someone else.
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = AddressRepository::new(state.pool())
        .delete(AddressId::new(id), &user.email)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("address {id}")))
    }
}
