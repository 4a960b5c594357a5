use async_trait::async_trait;
use config::{Config as ConfigLoader, File};
use cosmwasm_std::Uint256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tron_dex_sdk::{
    client::TokenMetadata,
    config::{Config, NetworkConstants, TokenInfo},
    form::LaunchParams,
    pool::{PoolSnapshot, ReserveSnapshot, TokenDetails},
    session::{AddLiquiditySession, SessionEvent, SessionSettings},
    submit::{AddLiquidityCall, TxHandle},
    ChainReader, Error, LiquiditySubmitter, TronAddress,
};

#[cfg(test)]
pub mod test_utils {
    use super::*;

    /// Test configuration loaded from config/test.toml
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TestConfig {
        pub test: TestSettings,
        /// Test tokens, keyed by a short name
        pub tokens: HashMap<String, TestToken>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TestSettings {
        /// Network to use for testing
        pub network: String,
        /// The connected account
        pub account: String,
        #[serde(default)]
        pub broken_tokens: Vec<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TestToken {
        pub name: String,
        pub symbol: String,
        pub decimals: u8,
        pub address: String,
        pub exchange_address: Option<String>,
    }

    impl TestToken {
        #[allow(dead_code)]
        pub fn address(&self) -> TronAddress {
            self.address.parse().expect("test token address")
        }

        #[allow(dead_code)]
        pub fn exchange(&self) -> TronAddress {
            self.exchange_address
                .as_deref()
                .expect("test token has an exchange")
                .parse()
                .expect("test exchange address")
        }

        #[allow(dead_code)]
        pub fn details(&self) -> TokenDetails {
            TokenDetails {
                address: self.address(),
                symbol: self.symbol.clone(),
                decimals: self.decimals,
                exchange_address: Some(self.exchange()),
            }
        }
    }

    pub fn init_test_env() {
        let _ = dotenv::dotenv();
    }

    /// Load test configuration from config/test.toml
    pub fn load_test_config() -> TestConfig {
        let config_dir =
            std::env::var("TRON_DEX_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let settings = ConfigLoader::builder()
            .add_source(File::with_name(&format!("{}/test", config_dir)))
            .build()
            .expect("Failed to load test config");

        settings
            .try_deserialize::<TestConfig>()
            .expect("Failed to deserialize test config")
    }

    /// A token from config/test.toml by its short name
    pub fn test_token(name: &str) -> TestToken {
        load_test_config()
            .tokens
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("Token '{}' not found in test config", name))
    }

    #[allow(dead_code)]
    pub fn test_account() -> TronAddress {
        load_test_config()
            .test
            .account
            .parse()
            .expect("test account address")
    }

    /// Config for the test network with only the `test` token registered;
    /// `unlisted` stays out of the registry.
    pub fn create_test_config() -> Config {
        init_test_env();
        let test_config = load_test_config();
        let network = NetworkConstants::load(&test_config.test.network)
            .unwrap_or_else(|_| NetworkConstants::nile());

        let mut config = Config::with_network(network);
        let token = test_token("test");
        config.add_token(
            token.address.clone(),
            TokenInfo {
                name: token.name.clone(),
                symbol: token.symbol.clone(),
                decimals: token.decimals,
                exchange_address: token.exchange_address.clone(),
            },
        );
        config.broken_tokens = test_config.test.broken_tokens.clone();
        config
    }

    /// Units of a 6-decimal amount
    #[allow(dead_code)]
    pub fn units(whole: u128) -> Uint256 {
        Uint256::from(whole * 1_000_000)
    }

    /// Balances, allowance and pool figures of the test account
    #[derive(Debug, Clone, Copy)]
    pub struct Funding {
        pub base: Uint256,
        pub token: Uint256,
        pub pool_tokens: Uint256,
        pub allowance: Uint256,
    }

    impl Default for Funding {
        fn default() -> Self {
            Self {
                base: units(1_000),
                token: units(1_000),
                pool_tokens: Uint256::zero(),
                allowance: Uint256::MAX,
            }
        }
    }

    /// A snapshot of the test token's pool, funded for the test account
    #[allow(dead_code)]
    pub fn pool_snapshot(
        reserve_base: u128,
        reserve_token: u128,
        total_supply: u128,
        funding: Funding,
    ) -> PoolSnapshot {
        PoolSnapshot {
            block: Some(1),
            reserves: Some(ReserveSnapshot::new(reserve_base, reserve_token)),
            total_supply: Some(Uint256::from(total_supply)),
            pool_token_balance: Some(funding.pool_tokens),
            base_balance: Some(funding.base),
            token_balance: Some(funding.token),
            allowance: Some(funding.allowance),
        }
    }

    /// Session with the `test` token selected, resolved and loaded, and the
    /// test account connected
    #[allow(dead_code)]
    pub fn session_with_pool(snapshot: PoolSnapshot) -> AddLiquiditySession {
        let config = create_test_config();
        let token = test_token("test");
        let launch = LaunchParams {
            token: Some(token.address.clone()),
            ..Default::default()
        };
        let mut session = AddLiquiditySession::new(SessionSettings::from_config(&config), launch);
        session.apply(SessionEvent::AccountChanged(Some(test_account())));
        session.apply(SessionEvent::TokenResolved(Some(token.details())));
        session.apply(SessionEvent::ReservesUpdated(snapshot));
        session
    }

    #[derive(Debug, Default)]
    pub struct MockState {
        pub block: u64,
        pub base_balances: HashMap<TronAddress, Uint256>,
        pub token_balances: HashMap<(TronAddress, TronAddress), Uint256>,
        pub allowances: HashMap<(TronAddress, TronAddress, TronAddress), Uint256>,
        pub total_supplies: HashMap<TronAddress, Uint256>,
        pub exchanges: HashMap<TronAddress, TronAddress>,
        pub metadata: HashMap<TronAddress, TokenMetadata>,
    }

    /// In-memory chain answering [`ChainReader`] queries
    #[derive(Debug, Default)]
    pub struct MockChain {
        pub state: Mutex<MockState>,
    }

    #[allow(dead_code)]
    impl MockChain {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register an exchange for `token` holding the given reserves
        pub fn with_pool(
            self,
            token: &TestToken,
            reserve_base: Uint256,
            reserve_token: Uint256,
            total_supply: Uint256,
        ) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                let (token_address, exchange) = (token.address(), token.exchange());
                state.exchanges.insert(token_address, exchange);
                state.metadata.insert(
                    token_address,
                    TokenMetadata {
                        symbol: token.symbol.clone(),
                        decimals: token.decimals,
                    },
                );
                state.base_balances.insert(exchange, reserve_base);
                state
                    .token_balances
                    .insert((token_address, exchange), reserve_token);
                state.total_supplies.insert(exchange, total_supply);
                state.block = 100;
            }
            self
        }

        /// Give `account` balances of base currency and `token`, and approve
        /// the token's exchange
        pub fn with_account(self, token: &TestToken, account: TronAddress, funding: Funding) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                let (token_address, exchange) = (token.address(), token.exchange());
                state.base_balances.insert(account, funding.base);
                state
                    .token_balances
                    .insert((token_address, account), funding.token);
                state
                    .token_balances
                    .insert((exchange, account), funding.pool_tokens);
                state
                    .allowances
                    .insert((token_address, account, exchange), funding.allowance);
            }
            self
        }

        pub fn set_reserves(&self, token: &TestToken, reserve_base: Uint256, reserve_token: Uint256) {
            let mut state = self.state.lock().unwrap();
            let exchange = token.exchange();
            state.base_balances.insert(exchange, reserve_base);
            state
                .token_balances
                .insert((token.address(), exchange), reserve_token);
        }

        pub fn advance_block(&self) {
            self.state.lock().unwrap().block += 1;
        }
    }

    #[async_trait]
    impl ChainReader for MockChain {
        async fn latest_block(&self) -> Result<u64, Error> {
            Ok(self.state.lock().unwrap().block)
        }

        async fn base_balance(&self, owner: &TronAddress) -> Result<Uint256, Error> {
            let state = self.state.lock().unwrap();
            Ok(state.base_balances.get(owner).copied().unwrap_or_default())
        }

        async fn token_balance(
            &self,
            token: &TronAddress,
            owner: &TronAddress,
        ) -> Result<Uint256, Error> {
            let state = self.state.lock().unwrap();
            Ok(state
                .token_balances
                .get(&(*token, *owner))
                .copied()
                .unwrap_or_default())
        }

        async fn allowance(
            &self,
            token: &TronAddress,
            owner: &TronAddress,
            spender: &TronAddress,
        ) -> Result<Uint256, Error> {
            let state = self.state.lock().unwrap();
            Ok(state
                .allowances
                .get(&(*token, *owner, *spender))
                .copied()
                .unwrap_or_default())
        }

        async fn total_supply(&self, exchange: &TronAddress) -> Result<Uint256, Error> {
            let state = self.state.lock().unwrap();
            Ok(state
                .total_supplies
                .get(exchange)
                .copied()
                .unwrap_or_default())
        }

        async fn exchange_for_token(
            &self,
            token: &TronAddress,
        ) -> Result<Option<TronAddress>, Error> {
            Ok(self.state.lock().unwrap().exchanges.get(token).copied())
        }

        async fn token_metadata(&self, token: &TronAddress) -> Result<TokenMetadata, Error> {
            self.state
                .lock()
                .unwrap()
                .metadata
                .get(token)
                .cloned()
                .ok_or_else(|| Error::Contract(format!("{} is not a token", token)))
        }
    }

    /// Records every submission instead of broadcasting it
    #[derive(Debug, Default)]
    pub struct MockSubmitter {
        pub calls: Mutex<Vec<(TronAddress, AddLiquidityCall)>>,
        pub reject: bool,
    }

    #[allow(dead_code)]
    impl MockSubmitter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting() -> Self {
            Self {
                reject: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(TronAddress, AddLiquidityCall)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LiquiditySubmitter for MockSubmitter {
        async fn add_liquidity(
            &self,
            exchange: &TronAddress,
            call: &AddLiquidityCall,
        ) -> Result<TxHandle, Error> {
            if self.reject {
                return Err(Error::Tx("user rejected the transaction".to_string()));
            }
            let mut calls = self.calls.lock().unwrap();
            calls.push((*exchange, call.clone()));
            Ok(TxHandle {
                txid: format!("tx-{}", calls.len()),
            })
        }
    }
}
