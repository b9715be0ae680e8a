//! Address orchestration: batch lifecycle for the addresses owned by a
//! customer.

use std::sync::Arc;

use cadastro_core::{Address, AddressDraft, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::repo::AddressRepository;

/// Serializable projection of an [`Address`].
///
/// Built by an explicit per-entity projection function; entity fields are
/// never reflected into transport shapes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub id: Option<i64>,
    pub customer_id: i64,
    pub street: String,
    pub number: String,
    pub zipcode: String,
    pub city: String,
    pub state: String,
}

/// Service over the address store.
#[derive(Clone)]
pub struct AddressService {
    repo: Arc<dyn AddressRepository>,
}

impl AddressService {
    pub fn new(repo: Arc<dyn AddressRepository>) -> Self {
        Self { repo }
    }

    /// The explicit draft→entity conversion for a batch, binding every
    /// draft to `customer_id`. Fails on the first invalid draft with its
    /// aggregated rule violations.
    pub fn map_addresses(
        &self,
        customer_id: i64,
        drafts: Vec<AddressDraft>,
    ) -> Result<Vec<Address>, ValidationError> {
        drafts
            .into_iter()
            .map(|draft| Address::new(customer_id, draft))
            .collect()
    }

    /// Validate and persist a batch of new addresses for one customer.
    ///
    /// Returns `None` for empty input (a deliberate no-op), otherwise the
    /// persisted entities carrying their storage-assigned ids.
    pub async fn create_many(
        &self,
        customer_id: i64,
        drafts: Vec<AddressDraft>,
    ) -> AppResult<Option<Vec<Address>>> {
        if drafts.is_empty() {
            return Ok(None);
        }

        let addresses = self.map_addresses(customer_id, drafts)?;
        let created = self.repo.create_many(customer_id, &addresses).await?;
        Ok(Some(created))
    }

    /// All addresses owned by the customer; empty when there are none.
    pub async fn list_by_customer_id(&self, customer_id: i64) -> AppResult<Vec<Address>> {
        self.repo.find_by_customer_id(customer_id).await
    }

    /// Bulk full-replacement update. Every entity must carry an id.
    pub async fn update_many(&self, addresses: Vec<Address>) -> AppResult<()> {
        if addresses.is_empty() {
            return Ok(());
        }

        if addresses.iter().any(|a| a.id().is_none()) {
            return Err(AppError::BadRequest(
                "Every address in an update must carry an id.".to_string(),
            ));
        }

        self.repo.update_many(&addresses).await
    }

    /// Remove every address owned by the customer. Used by customer
    /// removal, which must clear addresses before the customer row.
    pub async fn remove_all_by_customer_id(&self, customer_id: i64) -> AppResult<()> {
        let ids: Vec<i64> = self
            .repo
            .find_by_customer_id(customer_id)
            .await?
            .iter()
            .filter_map(Address::id)
            .collect();

        if ids.is_empty() {
            return Ok(());
        }

        self.repo.remove_many(&ids).await
    }

    /// Remove one address. Existence is a precondition, not best-effort.
    pub async fn remove(&self, id: i64) -> AppResult<()> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Address not found".to_string()));
        }

        self.repo.remove(id).await
    }

    /// Fail-fast batch removal: every id must resolve before anything is
    /// deleted, so a missing id leaves the whole batch untouched.
    pub async fn remove_many(&self, ids: &[i64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        for id in ids {
            if self.repo.find_by_id(*id).await?.is_none() {
                return Err(AppError::NotFound(
                    "One or more addresses not found".to_string(),
                ));
            }
        }

        self.repo.remove_many(ids).await
    }

    /// Project an address for transport.
    pub fn map_address_to_view(address: &Address) -> AddressView {
        AddressView {
            id: address.id(),
            customer_id: address.customer_id(),
            street: address.street().to_string(),
            number: address.number().to_string(),
            zipcode: address.zipcode().to_string(),
            city: address.city().to_string(),
            state: address.state().to_string(),
        }
    }
}
