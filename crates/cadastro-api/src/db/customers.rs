//! Customer persistence operations over the `customer` table.

use async_trait::async_trait;
use cadastro_core::{Customer, CustomerDraft};
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::repo::CustomerRepository;

/// SQLx-backed [`CustomerRepository`].
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn create(&self, customer: &Customer) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customer (name, email, password, birthday, cpf, rg, phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(customer.name())
        .bind(customer.email())
        .bind(customer.password_hash())
        .bind(customer.birthday())
        .bind(customer.cpf())
        .bind(customer.rg())
        .bind(customer.phone())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, customer: &Customer) -> AppResult<()> {
        // Email and password are immutable through this path.
        sqlx::query(
            "UPDATE customer SET name = $1, birthday = $2, cpf = $3, rg = $4, phone = $5
             WHERE id = $6",
        )
        .bind(customer.name())
        .bind(customer.birthday())
        .bind(customer.cpf())
        .bind(customer.rg())
        .bind(customer.phone())
        .bind(customer.id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, password, birthday, cpf, rg, phone
             FROM customer WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerRow::into_entity).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, password, birthday, cpf, rg, phone
             FROM customer WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerRow::into_entity).transpose()
    }

    async fn list(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, password, birthday, cpf, rg, phone
             FROM customer ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CustomerRow::into_entity).collect()
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM customer WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    password: Option<String>,
    birthday: NaiveDate,
    cpf: String,
    rg: String,
    phone: String,
}

impl CustomerRow {
    /// Rehydrate through the validating constructor. Rows were validated on
    /// the way in, so a failure here means the stored data was corrupted
    /// outside the application and is surfaced as an internal error.
    fn into_entity(self) -> AppResult<Customer> {
        let id = self.id;
        Customer::new(CustomerDraft {
            id: Some(self.id),
            name: self.name,
            email: self.email,
            password_hash: self.password,
            birthday: self.birthday,
            cpf: self.cpf,
            rg: self.rg,
            phone: self.phone,
        })
        .map_err(|e| {
            tracing::error!(customer_id = id, error = %e, "stored customer fails validation");
            AppError::Internal(format!("stored customer {id} fails validation"))
        })
    }
}
