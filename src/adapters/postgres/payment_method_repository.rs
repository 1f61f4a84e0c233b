//! PostgreSQL implementation of PaymentMethodRepository.
//!
//! Card fields are stored verbatim as text, exactly as they were submitted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::{CardDetails, PaymentMethod};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentMethodId, Timestamp};
use crate::ports::PaymentMethodRepository;

/// PostgreSQL implementation of the PaymentMethodRepository port.
pub struct PostgresPaymentMethodRepository {
    pool: PgPool,
}

impl PostgresPaymentMethodRepository {
    /// Creates a new PostgresPaymentMethodRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment method.
#[derive(sqlx::FromRow)]
struct PaymentMethodRow {
    id: String,
    card_number: String,
    expiry_month: String,
    expiry_year: String,
    cvc: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentMethodRow> for PaymentMethod {
    type Error = DomainError;

    fn try_from(row: PaymentMethodRow) -> Result<Self, Self::Error> {
        Ok(PaymentMethod {
            id: PaymentMethodId::new(row.id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid payment_method.id: {}", e))
            })?,
            card: CardDetails::new(row.card_number, row.expiry_month, row.expiry_year, row.cvc),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PaymentMethodRepository for PostgresPaymentMethodRepository {
    async fn save(&self, payment_method: &PaymentMethod) -> Result<(), DomainError> {
        let card = &payment_method.card;

        sqlx::query(
            r#"
            INSERT INTO payment_method (
                id, card_number, expiry_month, expiry_year, cvc, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment_method.id.as_str())
        .bind(card.number())
        .bind(card.exp_month())
        .bind(card.exp_year())
        .bind(card.cvc())
        .bind(payment_method.created_at.as_datetime())
        .bind(payment_method.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        format!("Payment method {} already exists", payment_method.id),
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save payment method: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, DomainError> {
        let row: Option<PaymentMethodRow> = sqlx::query_as(
            r#"
            SELECT id, card_number, expiry_month, expiry_year, cvc, created_at, updated_at
            FROM payment_method
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment method: {}", e),
            )
        })?;

        row.map(PaymentMethod::try_from).transpose()
    }
}
