//! Customer orchestration: aggregate lifecycle, credential checks, and the
//! cascade rules tying customers to their addresses.

use std::sync::Arc;

use cadastro_core::{password, Address, Customer, CustomerDraft, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::repo::CustomerRepository;
use crate::routes::customers::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::service::addresses::{AddressService, AddressView};

/// Serializable projection of a [`Customer`] with its addresses.
///
/// The stored password hash is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerView {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub cpf: String,
    pub rg: String,
    pub phone: String,
    pub addresses: Vec<AddressView>,
}

/// Service over the customer store and the owned-address service.
#[derive(Clone)]
pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
    addresses: AddressService,
}

impl CustomerService {
    pub fn new(repo: Arc<dyn CustomerRepository>, addresses: AddressService) -> Self {
        Self { repo, addresses }
    }

    /// Create a customer and any nested addresses.
    ///
    /// The password is hashed iff present and non-empty; its absence marks a
    /// non-privileged customer. If nested address persistence fails after
    /// the customer row was inserted, the row is removed again so the
    /// operation is atomic from the caller's point of view.
    pub async fn create(&self, data: CreateCustomerRequest) -> AppResult<CustomerView> {
        let password_hash = match data.password.as_deref() {
            Some(plaintext) if !plaintext.is_empty() => Some(password::hash(plaintext)?),
            _ => None,
        };

        let mut customer = Customer::new(CustomerDraft {
            id: None,
            name: data.name,
            email: data.email,
            password_hash,
            birthday: parse_birthday(&data.birthday)?,
            cpf: data.cpf,
            rg: data.rg,
            phone: data.phone,
        })?;

        let id = self.repo.create(&customer).await?;
        customer.set_id(id);

        let addresses = match data.addresses {
            Some(drafts) if !drafts.is_empty() => {
                match self.addresses.create_many(id, drafts).await {
                    Ok(created) => created.unwrap_or_default(),
                    Err(e) => {
                        // Compensating delete keeps the aggregate consistent.
                        if let Err(cleanup) = self.repo.remove(id).await {
                            tracing::error!(
                                customer_id = id,
                                error = %cleanup,
                                "failed to remove customer after address persistence failure"
                            );
                        }
                        return Err(e);
                    }
                }
            }
            _ => Vec::new(),
        };

        Ok(Self::map_customer_to_view(&customer, &addresses))
    }

    /// Full-replacement update preserving id, the original email, and the
    /// stored password hash. Fails with not-found before any write when the
    /// id does not resolve.
    pub async fn update(&self, id: i64, data: UpdateCustomerRequest) -> AppResult<()> {
        let found = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

        let customer = Customer::new(CustomerDraft {
            id: found.id(),
            name: data.name,
            email: found.email().to_string(),
            password_hash: found.password_hash().map(str::to_string),
            birthday: parse_birthday(&data.birthday)?,
            cpf: data.cpf,
            rg: data.rg,
            phone: data.phone,
        })?;

        self.repo.update(&customer).await?;

        if let Some(drafts) = data.addresses {
            if !drafts.is_empty() {
                let mapped = self.addresses.map_addresses(id, drafts)?;
                self.addresses.update_many(mapped).await?;
            }
        }

        Ok(())
    }

    /// Cascade removal: addresses first, then the customer row, honoring
    /// referential integrity without relying on database cascades.
    pub async fn remove(&self, id: i64) -> AppResult<()> {
        self.addresses.remove_all_by_customer_id(id).await?;
        self.repo.remove(id).await
    }

    /// All customers, each enriched with its addresses.
    pub async fn list(&self) -> AppResult<Vec<CustomerView>> {
        let customers = self.repo.list().await?;

        let mut views = Vec::with_capacity(customers.len());
        for customer in &customers {
            let addresses = match customer.id() {
                Some(id) => self.addresses.list_by_customer_id(id).await?,
                None => Vec::new(),
            };
            views.push(Self::map_customer_to_view(customer, &addresses));
        }

        Ok(views)
    }

    /// True iff a customer with that email exists.
    pub async fn exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.repo.find_by_email(email).await?.is_some())
    }

    /// Verify a plaintext password against the stored hash. Unknown emails
    /// and customers without a stored hash verify as false.
    pub async fn validate_credentials(&self, email: &str, plaintext: &str) -> AppResult<bool> {
        let Some(customer) = self.repo.find_by_email(email).await? else {
            return Ok(false);
        };

        Ok(customer
            .password_hash()
            .is_some_and(|hash| password::verify(plaintext, hash)))
    }

    fn map_customer_to_view(customer: &Customer, addresses: &[Address]) -> CustomerView {
        CustomerView {
            id: customer.id(),
            name: customer.name().to_string(),
            email: customer.email().to_string(),
            birthday: customer.birthday(),
            cpf: customer.cpf().to_string(),
            rg: customer.rg().to_string(),
            phone: customer.phone().to_string(),
            addresses: addresses
                .iter()
                .map(AddressService::map_address_to_view)
                .collect(),
        }
    }
}

fn parse_birthday(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(ValidationError::new(vec![
            "Invalid birthday format. Expected: YYYY-MM-DD.".to_string(),
        ]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{InMemoryAddressRepository, InMemoryCustomerRepository};
    use cadastro_core::AddressDraft;

    fn service() -> CustomerService {
        let addresses = AddressService::new(Arc::new(InMemoryAddressRepository::new()));
        CustomerService::new(Arc::new(InMemoryCustomerRepository::new()), addresses)
    }

    fn create_request(email: &str) -> CreateCustomerRequest {
        CreateCustomerRequest {
            name: "Beatriz Lima".to_string(),
            email: email.to_string(),
            password: None,
            birthday: "1991-08-20".to_string(),
            cpf: "987.654.321-00".to_string(),
            rg: "9.876.543-2".to_string(),
            phone: "+55 11 91234-5678".to_string(),
            addresses: None,
        }
    }

    fn address_draft() -> AddressDraft {
        AddressDraft {
            id: None,
            street: "Rua Harmonia".to_string(),
            number: "7".to_string(),
            zipcode: "05435-000".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_view_with_nested_addresses() {
        let service = service();
        let mut request = create_request("bia@example.com");
        request.addresses = Some(vec![address_draft(), address_draft()]);

        let view = service.create(request).await.unwrap();

        assert!(view.id.is_some());
        assert_eq!(view.addresses.len(), 2);
        assert!(view.addresses.iter().all(|a| a.id.is_some()));
    }

    #[tokio::test]
    async fn create_with_invalid_fields_reports_every_rule() {
        let service = service();
        let mut request = create_request("bad-email");
        request.cpf = "123".to_string();

        let err = service.create(request).await.unwrap_err();
        let AppError::Validation(e) = err else {
            panic!("expected validation error");
        };
        assert_eq!(e.violations().len(), 2);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found_before_any_write() {
        let service = service();
        let err = service
            .update(
                1,
                UpdateCustomerRequest {
                    name: "X".to_string(),
                    email: Some("x@example.com".to_string()),
                    password: None,
                    birthday: "1990-01-01".to_string(),
                    cpf: "111.222.333-44".to_string(),
                    rg: "1.234.567-8".to_string(),
                    phone: "1".to_string(),
                    addresses: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_preserves_the_original_email() {
        let service = service();
        let created = service.create(create_request("fixed@example.com")).await.unwrap();
        let id = created.id.unwrap();

        service
            .update(
                id,
                UpdateCustomerRequest {
                    name: "Renamed".to_string(),
                    email: Some("other@example.com".to_string()),
                    password: None,
                    birthday: "1991-08-20".to_string(),
                    cpf: "987.654.321-00".to_string(),
                    rg: "9.876.543-2".to_string(),
                    phone: "+55 11 91234-5678".to_string(),
                    addresses: None,
                },
            )
            .await
            .unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed[0].name, "Renamed");
        assert_eq!(listed[0].email, "fixed@example.com");
    }

    #[tokio::test]
    async fn remove_cascades_to_addresses() {
        let service = service();
        let mut request = create_request("cascata@example.com");
        request.addresses = Some(vec![address_draft()]);
        let id = service.create(request).await.unwrap().id.unwrap();

        service.remove(id).await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
        assert!(service
            .addresses
            .list_by_customer_id(id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn credentials_verify_only_for_the_stored_password() {
        let service = service();
        let mut request = create_request("admin@example.com");
        request.password = Some("s3nha-segura".to_string());
        service.create(request).await.unwrap();

        assert!(service
            .validate_credentials("admin@example.com", "s3nha-segura")
            .await
            .unwrap());
        assert!(!service
            .validate_credentials("admin@example.com", "errada")
            .await
            .unwrap());
        assert!(!service
            .validate_credentials("ghost@example.com", "s3nha-segura")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn customer_without_password_never_validates() {
        let service = service();
        service.create(create_request("nopass@example.com")).await.unwrap();

        assert!(!service
            .validate_credentials("nopass@example.com", "")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn exists_reflects_creation() {
        let service = service();
        assert!(!service.exists("eva@example.com").await.unwrap());
        service.create(create_request("eva@example.com")).await.unwrap();
        assert!(service.exists("eva@example.com").await.unwrap());
    }
}
