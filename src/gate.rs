//! Payment check in front of subscription extension.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{DateError, compute_end_date};

/// Outcome of a payment transaction as reported by the provider.
///
/// Statuses travel as upper-case strings; anything unrecognised is kept
/// verbatim in `Unknown`. An `Unknown` built by hand around a known status
/// string is treated as that status (see [`TransactionStatus::canonical`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Success,
    Declined,
    Pending,
    Unknown(String),
}

impl TransactionStatus {
    /// Re-reads an `Unknown` status through the wire mapping, so
    /// `Unknown("SUCCESS")` becomes `Success`.
    pub fn canonical(self) -> Self {
        match self {
            Self::Unknown(raw) => Self::from(raw),
            known => known,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::Declined => "DECLINED",
            Self::Pending => "PENDING",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for TransactionStatus {
    fn from(value: &str) -> Self {
        match value {
            "SUCCESS" => Self::Success,
            "DECLINED" => Self::Declined,
            "PENDING" => Self::Pending,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SUCCESS" => Self::Success,
            "DECLINED" => Self::Declined,
            "PENDING" => Self::Pending,
            _ => Self::Unknown(value),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Unknown(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's most recent transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub status: TransactionStatus,
}

/// Source of a user's latest payment transaction
#[async_trait]
pub trait PaymentLookup: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn get_last_transaction(&self, user_id: &str) -> Result<Transaction, Self::Error>;
}

#[async_trait]
impl<T: PaymentLookup + ?Sized> PaymentLookup for Arc<T> {
    type Error = T::Error;

    async fn get_last_transaction(&self, user_id: &str) -> Result<Transaction, Self::Error> {
        (**self).get_last_transaction(user_id).await
    }
}

/// Reasons an extension was refused. `E` is the lookup's own error type.
#[derive(Debug, thiserror::Error)]
pub enum GateError<E>
where
    E: std::error::Error + 'static,
{
    #[error("Транзакция отклонена")]
    Declined,
    #[error("Транзакция в обработке")]
    Pending,
    #[error("Неизвестный статус транзакции: {0:?}")]
    UnknownStatus(String),
    /// The lookup itself failed
    #[error(transparent)]
    Lookup(E),
    #[error(transparent)]
    Date(#[from] DateError),
}

/// Extends subscriptions only for users whose last payment went through.
#[derive(Debug, Clone)]
pub struct SubscriptionGate<L> {
    lookup: L,
}

impl<L: PaymentLookup> SubscriptionGate<L> {
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub const fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Looks up the user's last transaction once and, if it succeeded,
    /// returns the subscription end date as `compute_end_date` would.
    ///
    /// # Errors
    /// `GateError::Lookup` with the lookup's error untouched,
    /// `Declined`/`Pending`/`UnknownStatus` for a transaction that did not
    /// succeed (no date work is attempted), or `GateError::Date` from the
    /// date computation.
    #[instrument(skip(self, start), fields(start = %start))]
    pub async fn extend_with_payment(
        &self,
        user_id: &str,
        start: &str,
        duration_months: i32,
    ) -> Result<String, GateError<L::Error>> {
        let transaction = self
            .lookup
            .get_last_transaction(user_id)
            .await
            .map_err(GateError::Lookup)?;

        match transaction.status.canonical() {
            TransactionStatus::Success => {}
            TransactionStatus::Declined => {
                warn!("last transaction declined, not extending");
                return Err(GateError::Declined);
            }
            TransactionStatus::Pending => {
                warn!("last transaction pending, not extending");
                return Err(GateError::Pending);
            }
            TransactionStatus::Unknown(raw) => {
                warn!(status = %raw, "unknown transaction status, not extending");
                return Err(GateError::UnknownStatus(raw));
            }
        }

        let end = compute_end_date(start, duration_months)?;
        info!(end = %end, "subscription extended");
        Ok(end)
    }
}
