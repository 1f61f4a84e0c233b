//! PostgreSQL implementation of SubscriptionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, PriceId, SubscriptionId, Timestamp,
};
use crate::ports::SubscriptionRepository;

/// Foreign key from `subscription.customer_id` to `customer.id`.
const CUSTOMER_FK: &str = "subscription_customer_id_fkey";

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new PostgresSubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    subscription_status: String,
    price_id: String,
    purchase_date: DateTime<Utc>,
    customer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn invalid_column(column: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid subscription.{}: {}", column, e),
    )
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::new(row.id).map_err(|e| invalid_column("id", e))?,
            customer_id: CustomerId::new(row.customer_id)
                .map_err(|e| invalid_column("customer_id", e))?,
            price_id: PriceId::new(row.price_id).map_err(|e| invalid_column("price_id", e))?,
            status: SubscriptionStatus::new(row.subscription_status),
            purchase_date: Timestamp::from_datetime(row.purchase_date),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscription (
                id, subscription_status, price_id, purchase_date, customer_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(subscription.id.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.price_id.as_str())
        .bind(subscription.purchase_date.as_datetime())
        .bind(subscription.customer_id.as_str())
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(CUSTOMER_FK) {
                    return DomainError::new(
                        ErrorCode::CustomerNotFound,
                        format!("Customer {} not found", subscription.customer_id),
                    );
                }
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        format!("Subscription {} already exists", subscription.id),
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save subscription: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_status, price_id, purchase_date, customer_id,
                   created_at, updated_at
            FROM subscription
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn update_status(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscription SET
                subscription_status = $2,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription status: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription {} not found", subscription.id),
            ));
        }

        Ok(())
    }
}
