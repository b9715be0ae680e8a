//! # Customer API
//!
//! Routes:
//! - POST   /customer — create a customer (optionally with addresses)
//! - PUT    /customer/{id} — full-replacement update
//! - GET    /customer — list customers with nested addresses
//! - DELETE /customer/{id} — cascade removal
//! - POST   /customer/credentials — validate email + password (public)
//! - POST   /customer/exists — email existence check (public)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use cadastro_core::AddressDraft;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, MessageBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::service::CustomerView;
use crate::state::AppState;

/// Request to create a customer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    /// Plaintext password; hashed before storage. Absent or empty marks a
    /// non-privileged customer.
    #[serde(default)]
    pub password: Option<String>,
    /// `YYYY-MM-DD`.
    pub birthday: String,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub addresses: Option<Vec<AddressDraft>>,
}

impl Validate for CreateCustomerRequest {
    fn validate(&self) -> Result<(), String> {
        // Field rules live in the entity constructor.
        Ok(())
    }
}

/// Request to update a customer. `email` is required for the existence
/// pre-check but is immutable post-creation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// `YYYY-MM-DD`.
    pub birthday: String,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub addresses: Option<Vec<AddressDraft>>,
}

impl Validate for UpdateCustomerRequest {
    fn validate(&self) -> Result<(), String> {
        match self.email.as_deref() {
            Some(email) if !email.trim().is_empty() => Ok(()),
            _ => Err("Missing required field: email".to_string()),
        }
    }
}

/// Credential validation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for CredentialsRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.as_deref().map_or(true, str::is_empty) {
            return Err("Email is required".to_string());
        }
        if self.password.is_none() {
            return Err("Password is required".to_string());
        }
        Ok(())
    }
}

/// Email existence request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExistsRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl Validate for ExistsRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.as_deref().map_or(true, str::is_empty) {
            return Err("Email is required".to_string());
        }
        Ok(())
    }
}

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customer", get(list_customers).post(create_customer))
        .route("/customer/:id", put(update_customer).delete(remove_customer))
        .route("/customer/credentials", post(validate_credentials))
        .route("/customer/exists", post(customer_exists))
}

/// POST /customer — create a customer.
#[utoipa::path(
    post,
    path = "/customer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = MessageBody),
        (status = 400, description = "Validation failure, one entry per violated rule", body = crate::error::ErrorsBody),
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub(crate) async fn create_customer(
    State(state): State<AppState>,
    body: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), AppError> {
    let req = extract_validated_json(body)?;
    state.customers.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new("Customer created successfully")),
    ))
}

/// PUT /customer/{id} — update a customer.
#[utoipa::path(
    put,
    path = "/customer/{id}",
    params(("id" = i64, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = MessageBody),
        (status = 400, description = "Validation failure", body = crate::error::ErrorsBody),
        (status = 404, description = "Unknown customer", body = crate::error::ErrorsBody),
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub(crate) async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateCustomerRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let req = extract_validated_json(body)?;

    // Validate guarantees the email is present.
    let email = req.email.clone().unwrap_or_default();
    if !state.customers.exists(&email).await? {
        return Err(AppError::NotFound("Customer not found".to_string()));
    }

    state.customers.update(id, req).await?;
    Ok(Json(MessageBody::new("Customer updated successfully")))
}

/// GET /customer — list customers with their addresses.
#[utoipa::path(
    get,
    path = "/customer",
    responses(
        (status = 200, description = "All customers", body = [CustomerView]),
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub(crate) async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerView>>, AppError> {
    Ok(Json(state.customers.list().await?))
}

/// DELETE /customer/{id} — remove a customer and its addresses.
#[utoipa::path(
    delete,
    path = "/customer/{id}",
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer removed", body = MessageBody),
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub(crate) async fn remove_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageBody>, AppError> {
    state.customers.remove(id).await?;
    Ok(Json(MessageBody::new("Customer deleted successfully")))
}

/// POST /customer/credentials — validate email + password. Public route.
#[utoipa::path(
    post,
    path = "/customer/credentials",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Credentials are valid", body = bool),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorsBody),
    ),
    tag = "customers"
)]
pub(crate) async fn validate_credentials(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<bool>, AppError> {
    let req = extract_validated_json(body)?;

    let valid = state
        .customers
        .validate_credentials(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(Json(true))
}

/// POST /customer/exists — email existence check. Public route.
#[utoipa::path(
    post,
    path = "/customer/exists",
    request_body = ExistsRequest,
    responses(
        (status = 200, description = "Whether a customer with that email exists", body = bool),
    ),
    tag = "customers"
)]
pub(crate) async fn customer_exists(
    State(state): State<AppState>,
    body: Result<Json<ExistsRequest>, JsonRejection>,
) -> Result<Json<bool>, AppError> {
    let req = extract_validated_json(body)?;
    let exists = state
        .customers
        .exists(req.email.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(exists))
}
