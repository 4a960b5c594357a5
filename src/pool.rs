//! Pool and token state as read from the chain

use cosmwasm_std::Uint256;
use serde::{Deserialize, Serialize};

use crate::address::TronAddress;

/// Reserves of one exchange: the base currency side and the token side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub reserve_base: Uint256,
    pub reserve_token: Uint256,
}

impl ReserveSnapshot {
    pub fn new(reserve_base: impl Into<Uint256>, reserve_token: impl Into<Uint256>) -> Self {
        Self {
            reserve_base: reserve_base.into(),
            reserve_token: reserve_token.into(),
        }
    }

    /// A pool nobody has deposited into yet. The first depositor sets the
    /// price, so no rate can be derived.
    pub fn is_new_exchange(&self) -> bool {
        self.reserve_base.is_zero() && self.reserve_token.is_zero()
    }
}

/// Everything the liquidity form reads from the chain for one token.
///
/// Each field is optional because the values arrive independently and may
/// not be loaded yet (or, for account balances, no account is connected).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Block the snapshot was taken at
    pub block: Option<u64>,
    pub reserves: Option<ReserveSnapshot>,
    /// Total supply of the exchange's pool-share token
    pub total_supply: Option<Uint256>,
    /// Pool-share tokens held by the connected account
    pub pool_token_balance: Option<Uint256>,
    /// Base currency balance of the connected account
    pub base_balance: Option<Uint256>,
    /// Token balance of the connected account
    pub token_balance: Option<Uint256>,
    /// Token allowance granted by the account to the exchange
    pub allowance: Option<Uint256>,
}

impl PoolSnapshot {
    pub fn is_new_exchange(&self) -> bool {
        self.reserves.is_some_and(|r| r.is_new_exchange())
    }
}

/// Metadata of the token on the output side of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub address: TronAddress,
    pub symbol: String,
    pub decimals: u8,
    /// Exchange contract for this token, `None` when the factory has none
    pub exchange_address: Option<TronAddress>,
}
