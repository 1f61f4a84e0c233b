//! PostgreSQL implementation of CustomerRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::Customer;
use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, PaymentMethodId, Timestamp};
use crate::ports::CustomerRepository;

/// Foreign key from `customer.payment_id` to `payment_method.id`.
const PAYMENT_FK: &str = "customer_payment_id_fkey";

/// PostgreSQL implementation of the CustomerRepository port.
pub struct PostgresCustomerRepository {
    pool: PgPool,
}

impl PostgresCustomerRepository {
    /// Creates a new PostgresCustomerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a customer.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    payment_id: String,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DomainError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: CustomerId::new(row.id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid customer.id: {}", e))
            })?,
            payment_method_id: PaymentMethodId::new(row.payment_id).map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid customer.payment_id: {}", e),
                )
            })?,
            name: row.name,
            email: row.email,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    async fn save(&self, customer: &Customer) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO customer (id, payment_id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(customer.id.as_str())
        .bind(customer.payment_method_id.as_str())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.created_at.as_datetime())
        .bind(customer.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(PAYMENT_FK) {
                    return DomainError::new(
                        ErrorCode::PaymentMethodNotFound,
                        format!("Payment method {} not found", customer.payment_method_id),
                    );
                }
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        format!("Customer {} already exists", customer.id),
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save customer: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, payment_id, name, email, created_at, updated_at
            FROM customer
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find customer: {}", e))
        })?;

        row.map(Customer::try_from).transpose()
    }
}
