//! Saved address route handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use bazaar_core::{AddressId, UserId};

use crate::db::addresses::AddressRepository;
use crate::error::{Result, not_found_as};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::address::{Address, AddressUpdate, NewAddress};
use crate::response::ApiResponse;
use crate::state::AppState;

const ADDRESS_NOT_FOUND: &str = "Address not found!";

#[derive(Debug, Serialize)]
pub struct DeletedAddress {
    pub id: AddressId,
}

/// `POST /api/shop/address/add/{userId}`
#[instrument(skip(state, user, body))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(body): ApiJson<NewAddress>,
) -> Result<impl IntoResponse> {
    user.ensure_can_access(user_id)?;
    body.validate()?;

    let address = AddressRepository::new(state.pool())
        .create(user_id, &body)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(address)))
}

/// `GET /api/shop/address/get/{userId}`
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<ApiResponse<Vec<Address>>> {
    user.ensure_can_access(user_id)?;
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    Ok(ApiResponse::ok(addresses))
}

/// `PUT /api/shop/address/update/{userId}/{addressId}`
#[instrument(skip(state, user, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath((user_id, address_id)): ApiPath<(UserId, AddressId)>,
    ApiJson(body): ApiJson<AddressUpdate>,
) -> Result<ApiResponse<Address>> {
    user.ensure_can_access(user_id)?;
    body.validate()?;

    let address = AddressRepository::new(state.pool())
        .update(user_id, address_id, &body)
        .await
        .map_err(not_found_as(ADDRESS_NOT_FOUND))?;
    Ok(ApiResponse::ok(address))
}

/// `DELETE /api/shop/address/delete/{userId}/{addressId}`
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath((user_id, address_id)): ApiPath<(UserId, AddressId)>,
) -> Result<ApiResponse<DeletedAddress>> {
    user.ensure_can_access(user_id)?;

    AddressRepository::new(state.pool())
        .delete(user_id, address_id)
        .await
        .map_err(not_found_as(ADDRESS_NOT_FOUND))?;
    Ok(ApiResponse::ok(DeletedAddress { id: address_id }).with_message("Address deleted successfully"))
}
