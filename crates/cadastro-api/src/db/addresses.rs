//! Address persistence operations over the `customer_address` table.
//!
//! Bulk insert goes through `UNNEST` arrays with `RETURNING id`, so assigned
//! ids come straight from the statement instead of being inferred from a
//! last-insert-id. Bulk update runs in an explicit transaction; bulk delete
//! is a single `ANY($1)` statement.

use async_trait::async_trait;
use cadastro_core::{Address, AddressDraft};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::repo::AddressRepository;

/// SQLx-backed [`AddressRepository`].
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn create_many(
        &self,
        customer_id: i64,
        addresses: &[Address],
    ) -> AppResult<Vec<Address>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let streets: Vec<&str> = addresses.iter().map(Address::street).collect();
        let numbers: Vec<&str> = addresses.iter().map(Address::number).collect();
        let zipcodes: Vec<&str> = addresses.iter().map(Address::zipcode).collect();
        let cities: Vec<&str> = addresses.iter().map(Address::city).collect();
        let states: Vec<&str> = addresses.iter().map(Address::state).collect();

        let ids: Vec<i64> = sqlx::query_scalar(
            "INSERT INTO customer_address (customer_id, street, number, zipcode, city, state)
             SELECT $1, street, number, zipcode, city, state
             FROM UNNEST($2::text[], $3::text[], $4::text[], $5::text[], $6::text[])
                  AS t(street, number, zipcode, city, state)
             RETURNING id",
        )
        .bind(customer_id)
        .bind(&streets)
        .bind(&numbers)
        .bind(&zipcodes)
        .bind(&cities)
        .bind(&states)
        .fetch_all(&self.pool)
        .await?;

        if ids.len() != addresses.len() {
            return Err(AppError::Internal(format!(
                "bulk address insert returned {} ids for {} rows",
                ids.len(),
                addresses.len()
            )));
        }

        Ok(addresses
            .iter()
            .zip(ids)
            .map(|(address, id)| {
                let mut created = address.clone();
                created.set_id(id);
                created
            })
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Address>> {
        let row = sqlx::query_as::<_, AddressRow>(
            "SELECT id, customer_id, street, number, zipcode, city, state
             FROM customer_address WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AddressRow::into_entity).transpose()
    }

    async fn find_by_customer_id(&self, customer_id: i64) -> AppResult<Vec<Address>> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT id, customer_id, street, number, zipcode, city, state
             FROM customer_address WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AddressRow::into_entity).collect()
    }

    async fn update_many(&self, addresses: &[Address]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for address in addresses {
            sqlx::query(
                "UPDATE customer_address
                 SET street = $1, number = $2, zipcode = $3, city = $4, state = $5
                 WHERE id = $6",
            )
            .bind(address.street())
            .bind(address.number())
            .bind(address.zipcode())
            .bind(address.city())
            .bind(address.state())
            .bind(address.id())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM customer_address WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_many(&self, ids: &[i64]) -> AppResult<()> {
        sqlx::query("DELETE FROM customer_address WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_all_by_customer_id(&self, customer_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM customer_address WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i64,
    customer_id: i64,
    street: String,
    number: String,
    zipcode: String,
    city: String,
    state: String,
}

impl AddressRow {
    fn into_entity(self) -> AppResult<Address> {
        let id = self.id;
        Address::new(
            self.customer_id,
            AddressDraft {
                id: Some(self.id),
                street: self.street,
                number: self.number,
                zipcode: self.zipcode,
                city: self.city,
                state: self.state,
            },
        )
        .map_err(|e| {
            tracing::error!(address_id = id, error = %e, "stored address fails validation");
            AppError::Internal(format!("stored address {id} fails validation"))
        })
    }
}
