//! # Address API
//!
//! Routes:
//! - POST/PUT /customer/{id}/address — bulk create/replace the customer's
//!   addresses; an empty `addresses` array removes them all
//! - DELETE   /customer/{id}/address — fail-fast bulk removal by id

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use cadastro_core::AddressDraft;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, MessageBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Bulk create/replace request. Drafts carrying an id are updated in
/// place; drafts without one are created.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceAddressesRequest {
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub addresses: Vec<AddressDraft>,
}

impl Validate for ReplaceAddressesRequest {
    fn validate(&self) -> Result<(), String> {
        // An empty list is meaningful: it removes every address.
        Ok(())
    }
}

/// Bulk removal request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveAddressesRequest {
    #[serde(default, rename = "addressIds")]
    pub address_ids: Vec<i64>,
}

impl Validate for RemoveAddressesRequest {
    fn validate(&self) -> Result<(), String> {
        if self.address_ids.is_empty() {
            return Err("Invalid or missing addressIds".to_string());
        }
        Ok(())
    }
}

/// Build the addresses router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/customer/:id/address",
        post(replace_addresses)
            .put(replace_addresses)
            .delete(remove_addresses),
    )
}

/// POST|PUT /customer/{id}/address — bulk create/replace addresses.
#[utoipa::path(
    put,
    path = "/customer/{id}/address",
    params(("id" = i64, Path, description = "Owning customer id")),
    request_body = ReplaceAddressesRequest,
    responses(
        (status = 200, description = "Addresses replaced or cleared", body = MessageBody),
        (status = 400, description = "Validation failure", body = crate::error::ErrorsBody),
    ),
    security(("bearer_auth" = [])),
    tag = "addresses"
)]
pub(crate) async fn replace_addresses(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    body: Result<Json<ReplaceAddressesRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let req = extract_validated_json(body)?;

    if req.addresses.is_empty() {
        state
            .addresses
            .remove_all_by_customer_id(customer_id)
            .await?;
        return Ok(Json(MessageBody::new("All addresses removed successfully")));
    }

    let (updates, creates): (Vec<AddressDraft>, Vec<AddressDraft>) = req
        .addresses
        .into_iter()
        .partition(|draft| draft.id.is_some());

    if !creates.is_empty() {
        state.addresses.create_many(customer_id, creates).await?;
    }
    if !updates.is_empty() {
        let mapped = state.addresses.map_addresses(customer_id, updates)?;
        state.addresses.update_many(mapped).await?;
    }

    Ok(Json(MessageBody::new("Addresses updated successfully")))
}

/// DELETE /customer/{id}/address — fail-fast bulk removal.
#[utoipa::path(
    delete,
    path = "/customer/{id}/address",
    params(("id" = i64, Path, description = "Owning customer id")),
    request_body = RemoveAddressesRequest,
    responses(
        (status = 200, description = "Addresses removed", body = MessageBody),
        (status = 400, description = "Missing addressIds", body = crate::error::ErrorsBody),
        (status = 404, description = "An id did not resolve; nothing was deleted", body = crate::error::ErrorsBody),
    ),
    security(("bearer_auth" = [])),
    tag = "addresses"
)]
pub(crate) async fn remove_addresses(
    State(state): State<AppState>,
    Path(_customer_id): Path<i64>,
    body: Result<Json<RemoveAddressesRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let req = extract_validated_json(body)?;
    state.addresses.remove_many(&req.address_ids).await?;
    Ok(Json(MessageBody::new("Addresses removed successfully")))
}
