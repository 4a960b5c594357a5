//! Building and tracking `addLiquidity` submissions

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cosmwasm_std::Uint256;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::abi;
use crate::error::Error;
use crate::session::AddLiquiditySession;

/// Solidity signature of the exchange's deposit method
pub const ADD_LIQUIDITY_SELECTOR: &str = "addLiquidity(uint256,uint256,uint256)";

/// Unix deadline `window_secs` after `now`, rounding the current second up
pub fn deadline(now: DateTime<Utc>, window_secs: u64) -> u64 {
    let millis = now.timestamp_millis().max(0) as u64;
    millis.div_ceil(1000) + window_secs
}

/// Arguments of one `addLiquidity` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityCall {
    /// Fewest pool-share tokens the caller accepts (zero for a new exchange)
    pub min_liquidity: Uint256,
    /// Most tokens the exchange may pull; exact for a new exchange
    pub max_tokens: Uint256,
    /// Unix timestamp after which the call reverts
    pub deadline: u64,
    /// Base currency attached to the call
    pub call_value: Uint256,
}

impl AddLiquidityCall {
    /// Package the session's current amounts. Fails with the session's
    /// contextual message when it cannot be submitted.
    pub fn from_session(session: &AddLiquiditySession, now: DateTime<Utc>) -> Result<Self, Error> {
        if !session.can_submit() {
            return Err(Error::Validation(session.blocking_message()));
        }
        let parsed = session.parsed();
        let call_value = parsed
            .input
            .ok_or(Error::Validation(session.blocking_message()))?;
        let max_tokens = session
            .token_amount_to_send()
            .ok_or(Error::Validation(session.blocking_message()))?;

        let min_liquidity = if session.is_new_exchange() {
            Uint256::zero()
        } else {
            session
                .liquidity_minimum()
                .ok_or(Error::Validation(session.blocking_message()))?
        };

        Ok(Self {
            min_liquidity,
            max_tokens,
            deadline: deadline(now, session.settings().deadline_from_now_secs),
            call_value,
        })
    }

    /// ABI-encoded positional arguments
    pub fn encode_parameters(&self) -> String {
        abi::encode_params(&[
            abi::encode_uint(self.min_liquidity),
            abi::encode_uint(self.max_tokens),
            abi::encode_uint(Uint256::from(self.deadline)),
        ])
    }
}

/// Handle returned by the node for a broadcast transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub txid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub txid: String,
    pub summary: String,
    pub submitted_at: DateTime<Utc>,
    pub status: TxStatus,
}

/// Store of submitted transactions awaiting confirmation
#[async_trait]
pub trait PendingTransactions: Send + Sync {
    async fn add(&self, handle: &TxHandle, summary: String);

    async fn set_status(&self, txid: &str, status: TxStatus);

    async fn list(&self) -> Vec<PendingTransaction>;
}

#[derive(Debug, Default)]
pub struct InMemoryPendingTransactions {
    transactions: RwLock<HashMap<String, PendingTransaction>>,
}

impl InMemoryPendingTransactions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingTransactions for InMemoryPendingTransactions {
    async fn add(&self, handle: &TxHandle, summary: String) {
        let tx = PendingTransaction {
            txid: handle.txid.clone(),
            summary,
            submitted_at: Utc::now(),
            status: TxStatus::Pending,
        };
        self.transactions.write().await.insert(handle.txid.clone(), tx);
    }

    async fn set_status(&self, txid: &str, status: TxStatus) {
        if let Some(tx) = self.transactions.write().await.get_mut(txid) {
            tx.status = status;
        }
    }

    async fn list(&self) -> Vec<PendingTransaction> {
        let mut list: Vec<_> = self.transactions.read().await.values().cloned().collect();
        list.sort_by_key(|tx| tx.submitted_at);
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deadline_rounds_up_partial_seconds() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
        assert_eq!(deadline(now, 900), 1_700_000_001 + 900);

        let whole = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(deadline(whole, 900), 1_700_000_000 + 900);
    }

    #[tokio::test]
    async fn pending_store_tracks_status() {
        let store = InMemoryPendingTransactions::new();
        let handle = TxHandle {
            txid: "abc".to_string(),
        };
        store.add(&handle, "Add liquidity".to_string()).await;
        store.set_status("abc", TxStatus::Confirmed).await;

        let list = store.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, TxStatus::Confirmed);
    }
}
