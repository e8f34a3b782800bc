use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::exchange_rate::{self, Entity as ExchangeRate},
    errors::ServiceError,
};

/// Result of converting an amount between currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Amount in the target currency, rounded to two decimal places.
    pub converted_amount: Decimal,
    /// Rate that was applied, kept at full precision.
    pub rate: Decimal,
}

#[derive(Clone)]
pub struct CurrencyConversionService {
    db_pool: Arc<DbPool>,
}

impl CurrencyConversionService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Converts an amount using the stored rate for the exact (from, to)
    /// pair. Equal currencies skip the lookup and return the amount as is.
    /// There is no inverse-pair or multi-hop fallback; a missing pair is an
    /// error.
    #[instrument(skip(self), fields(from = %from_currency_id, to = %to_currency_id))]
    pub async fn convert(
        &self,
        amount: Decimal,
        from_currency_id: Uuid,
        to_currency_id: Uuid,
    ) -> Result<Conversion, ServiceError> {
        if from_currency_id == to_currency_id {
            return Ok(Conversion {
                converted_amount: amount,
                rate: Decimal::ONE,
            });
        }

        let rate = self.rate_for(from_currency_id, to_currency_id).await?;

        let converted_amount =
            (amount * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Ok(Conversion {
            converted_amount,
            rate,
        })
    }

    /// Stored multiplier for the (from, to) pair.
    pub async fn rate_for(
        &self,
        from_currency_id: Uuid,
        to_currency_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        let db = &*self.db_pool;

        let record = ExchangeRate::find()
            .filter(exchange_rate::Column::FromCurrencyId.eq(from_currency_id))
            .filter(exchange_rate::Column::ToCurrencyId.eq(to_currency_id))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to look up exchange rate");
                ServiceError::DatabaseError(e.into())
            })?;

        match record {
            Some(row) => Ok(row.rate),
            None => {
                warn!(
                    from = %from_currency_id,
                    to = %to_currency_id,
                    "No exchange rate configured for pair"
                );
                Err(ServiceError::ExchangeRateNotFound {
                    from: from_currency_id,
                    to: to_currency_id,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;

    #[tokio::test]
    async fn identity_conversion_skips_the_lookup() {
        // A disconnected pool fails any query, so this also proves the
        // identity path never reaches the database.
        let service = CurrencyConversionService::new(Arc::new(DatabaseConnection::Disconnected));
        let currency = Uuid::new_v4();

        let conversion = service
            .convert(dec!(123.456), currency, currency)
            .await
            .unwrap();

        assert_eq!(conversion.converted_amount, dec!(123.456));
        assert_eq!(conversion.rate, Decimal::ONE);
    }
}
