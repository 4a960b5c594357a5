use std::sync::Arc;

use async_trait::async_trait;
use cosmwasm_std::{Uint128, Uint256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::abi;
use crate::address::TronAddress;
use crate::config::{Config, NetworkConstants};
use crate::error::Error;
use crate::pool::{PoolSnapshot, ReserveSnapshot, TokenDetails};
use crate::submit::{AddLiquidityCall, TxHandle, ADD_LIQUIDITY_SELECTOR};

/// Symbol and precision of a TRC-20 token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// Read access to the chain state the liquidity form depends on
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Height of the latest block
    async fn latest_block(&self) -> Result<u64, Error>;

    /// Base currency balance of an account, in sun
    async fn base_balance(&self, owner: &TronAddress) -> Result<Uint256, Error>;

    async fn token_balance(&self, token: &TronAddress, owner: &TronAddress)
        -> Result<Uint256, Error>;

    async fn allowance(
        &self,
        token: &TronAddress,
        owner: &TronAddress,
        spender: &TronAddress,
    ) -> Result<Uint256, Error>;

    /// Supply of an exchange's pool-share token
    async fn total_supply(&self, exchange: &TronAddress) -> Result<Uint256, Error>;

    /// Exchange paired with `token`, `None` when the factory has none
    async fn exchange_for_token(&self, token: &TronAddress) -> Result<Option<TronAddress>, Error>;

    async fn token_metadata(&self, token: &TronAddress) -> Result<TokenMetadata, Error>;

    /// An exchange holds its base reserve as its own balance and its token
    /// reserve as a token balance
    async fn exchange_reserves(
        &self,
        token: &TronAddress,
        exchange: &TronAddress,
    ) -> Result<ReserveSnapshot, Error> {
        let (reserve_base, reserve_token) = futures::try_join!(
            self.base_balance(exchange),
            self.token_balance(token, exchange)
        )?;
        Ok(ReserveSnapshot {
            reserve_base,
            reserve_token,
        })
    }

    /// Everything the form reads for one token, in one round
    async fn pool_snapshot(
        &self,
        token: &TokenDetails,
        account: Option<&TronAddress>,
    ) -> Result<PoolSnapshot, Error> {
        let block = self.latest_block().await?;
        let Some(exchange) = token.exchange_address else {
            return Ok(PoolSnapshot {
                block: Some(block),
                ..Default::default()
            });
        };

        let (reserves, total_supply) = futures::try_join!(
            self.exchange_reserves(&token.address, &exchange),
            self.total_supply(&exchange)
        )?;

        let mut snapshot = PoolSnapshot {
            block: Some(block),
            reserves: Some(reserves),
            total_supply: Some(total_supply),
            ..Default::default()
        };

        if let Some(owner) = account {
            let (base_balance, token_balance, pool_token_balance, allowance) = futures::try_join!(
                self.base_balance(owner),
                self.token_balance(&token.address, owner),
                self.token_balance(&exchange, owner),
                self.allowance(&token.address, owner, &exchange)
            )?;
            snapshot.base_balance = Some(base_balance);
            snapshot.token_balance = Some(token_balance);
            snapshot.pool_token_balance = Some(pool_token_balance);
            snapshot.allowance = Some(allowance);
        }

        Ok(snapshot)
    }
}

/// Sends the deposit to an exchange
#[async_trait]
pub trait LiquiditySubmitter: Send + Sync {
    async fn add_liquidity(
        &self,
        exchange: &TronAddress,
        call: &AddLiquidityCall,
    ) -> Result<TxHandle, Error>;
}

/// Signs transactions built by the full node. Key custody lives outside
/// this crate (browser wallet, hardware wallet, KMS).
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> TronAddress;

    /// Return the transaction with its `signature` array filled in
    async fn sign(&self, transaction: Value) -> Result<Value, Error>;
}

/// Resolve the selected currency to token details: registry entries win,
/// anything else is read from the token contract.
pub async fn resolve_token_details<R: ChainReader + ?Sized>(
    reader: &R,
    config: &Config,
    currency: &str,
) -> Result<Option<TokenDetails>, Error> {
    if currency.is_empty() || currency == config.network.native_symbol {
        return Ok(None);
    }
    let address: TronAddress = currency.parse()?;

    let registered_exchange = config
        .token(currency)
        .and_then(|info| info.exchange_address.as_deref())
        .map(str::parse::<TronAddress>)
        .transpose()?;
    let exchange_address = match registered_exchange {
        Some(exchange) => Some(exchange),
        None => reader.exchange_for_token(&address).await?,
    };

    let metadata = match config.token(currency) {
        Some(info) => TokenMetadata {
            symbol: info.symbol.clone(),
            decimals: info.decimals,
        },
        None => reader.token_metadata(&address).await?,
    };

    Ok(Some(TokenDetails {
        address,
        symbol: metadata.symbol,
        decimals: metadata.decimals,
        exchange_address,
    }))
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    block_header: BlockHeader,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    raw_data: BlockRawData,
}

#[derive(Debug, Deserialize)]
struct BlockRawData {
    #[serde(default)]
    number: u64,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(default)]
    balance: u64,
}

#[derive(Debug, Default, Deserialize)]
struct TriggerResult {
    #[serde(default)]
    result: bool,
    code: Option<String>,
    message: Option<String>,
}

impl TriggerResult {
    /// Node messages are hex-encoded UTF-8
    fn describe(&self) -> String {
        let message = self
            .message
            .as_deref()
            .map(|m| {
                hex::decode(m)
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .unwrap_or_else(|_| m.to_string())
            })
            .unwrap_or_default();
        match &self.code {
            Some(code) => format!("{}: {}", code, message),
            None => message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConstantCallResponse {
    #[serde(default)]
    result: TriggerResult,
    #[serde(default)]
    constant_result: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    #[serde(default)]
    result: TriggerResult,
    transaction: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    #[serde(default)]
    result: bool,
    txid: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Client for a TRON full node's HTTP API
pub struct TronClient {
    http: reqwest::Client,
    config: NetworkConstants,
    signer: Option<Arc<dyn TransactionSigner>>,
}

impl TronClient {
    /// Create a new client with the given configuration
    pub fn new(config: NetworkConstants) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            config,
            signer: None,
        })
    }

    /// Set the signer used for submissions
    pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Get the network configuration
    pub fn config(&self) -> &NetworkConstants {
        &self.config
    }

    pub fn signer_address(&self) -> Option<TronAddress> {
        self.signer.as_ref().map(|s| s.address())
    }

    fn signer(&self) -> Result<&Arc<dyn TransactionSigner>, Error> {
        self.signer
            .as_ref()
            .ok_or_else(|| Error::Wallet("No signer configured".to_string()))
    }

    fn factory(&self) -> Result<TronAddress, Error> {
        if self.config.factory_address.is_empty() {
            return Err(Error::Config(format!(
                "No exchange factory configured for {}",
                self.config.network_name
            )));
        }
        self.config.factory_address.parse()
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, Error> {
        let url = format!("{}{}", self.config.full_node_url.trim_end_matches('/'), path);
        debug!(%url, "full node request");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Rpc(format!("{} returned {}: {}", path, status, text)));
        }
        Ok(response.json::<R>().await?)
    }

    /// Run a read-only contract method and return its first result
    async fn call_constant(
        &self,
        contract: &TronAddress,
        selector: &str,
        parameter: String,
    ) -> Result<String, Error> {
        let owner = self
            .signer_address()
            .unwrap_or_else(|| TronAddress::from_account_id([0u8; 20]));
        let body = json!({
            "owner_address": owner.to_base58(),
            "contract_address": contract.to_base58(),
            "function_selector": selector,
            "parameter": parameter,
            "visible": true,
        });
        let response: ConstantCallResponse =
            self.post("/wallet/triggerconstantcontract", &body).await?;
        if !response.result.result {
            return Err(Error::Contract(format!(
                "{} on {} failed: {}",
                selector,
                contract,
                response.result.describe()
            )));
        }
        response
            .constant_result
            .into_iter()
            .next()
            .ok_or_else(|| Error::Contract(format!("{} on {} returned nothing", selector, contract)))
    }

    async fn broadcast(&self, signed: Value) -> Result<TxHandle, Error> {
        let response: BroadcastResponse = self.post("/wallet/broadcasttransaction", &signed).await?;
        if !response.result {
            let message = TriggerResult {
                result: false,
                code: response.code,
                message: response.message,
            }
            .describe();
            return Err(Error::Tx(format!("Broadcast rejected: {}", message)));
        }
        let txid = response
            .txid
            .or_else(|| signed.get("txID").and_then(Value::as_str).map(str::to_string))
            .ok_or_else(|| Error::Tx("Broadcast response carried no txid".to_string()))?;
        Ok(TxHandle { txid })
    }
}

fn uint_to_u8(value: Uint256) -> Result<u8, Error> {
    Uint128::try_from(value)
        .ok()
        .and_then(|v| u8::try_from(v.u128()).ok())
        .ok_or_else(|| Error::Contract(format!("decimals out of range: {}", value)))
}

#[async_trait]
impl ChainReader for TronClient {
    async fn latest_block(&self) -> Result<u64, Error> {
        let block: BlockResponse = self.post("/wallet/getnowblock", &json!({})).await?;
        Ok(block.block_header.raw_data.number)
    }

    async fn base_balance(&self, owner: &TronAddress) -> Result<Uint256, Error> {
        let body = json!({ "address": owner.to_base58(), "visible": true });
        // Accounts that never received TRX come back as `{}`
        let account: AccountResponse = self.post("/wallet/getaccount", &body).await?;
        Ok(Uint256::from(account.balance))
    }

    async fn token_balance(
        &self,
        token: &TronAddress,
        owner: &TronAddress,
    ) -> Result<Uint256, Error> {
        let result = self
            .call_constant(token, "balanceOf(address)", abi::encode_address(owner))
            .await?;
        abi::decode_uint(&result)
    }

    async fn allowance(
        &self,
        token: &TronAddress,
        owner: &TronAddress,
        spender: &TronAddress,
    ) -> Result<Uint256, Error> {
        let parameter = abi::encode_params(&[abi::encode_address(owner), abi::encode_address(spender)]);
        let result = self
            .call_constant(token, "allowance(address,address)", parameter)
            .await?;
        abi::decode_uint(&result)
    }

    async fn total_supply(&self, exchange: &TronAddress) -> Result<Uint256, Error> {
        let result = self
            .call_constant(exchange, "totalSupply()", String::new())
            .await?;
        abi::decode_uint(&result)
    }

    async fn exchange_for_token(&self, token: &TronAddress) -> Result<Option<TronAddress>, Error> {
        let factory = self.factory()?;
        let result = self
            .call_constant(&factory, "getExchange(address)", abi::encode_address(token))
            .await?;
        let exchange = abi::decode_address(&result)?;
        Ok((!exchange.is_zero()).then_some(exchange))
    }

    async fn token_metadata(&self, token: &TronAddress) -> Result<TokenMetadata, Error> {
        let (symbol, decimals) = futures::try_join!(
            self.call_constant(token, "symbol()", String::new()),
            self.call_constant(token, "decimals()", String::new())
        )?;
        Ok(TokenMetadata {
            symbol: abi::decode_string(&symbol)?,
            decimals: uint_to_u8(abi::decode_uint(&decimals)?)?,
        })
    }
}

#[async_trait]
impl LiquiditySubmitter for TronClient {
    async fn add_liquidity(
        &self,
        exchange: &TronAddress,
        call: &AddLiquidityCall,
    ) -> Result<TxHandle, Error> {
        let signer = self.signer()?;
        let call_value = Uint128::try_from(call.call_value)
            .ok()
            .and_then(|v| i64::try_from(v.u128()).ok())
            .ok_or_else(|| Error::Tx(format!("call value {} exceeds int64", call.call_value)))?;

        let body = json!({
            "owner_address": signer.address().to_base58(),
            "contract_address": exchange.to_base58(),
            "function_selector": ADD_LIQUIDITY_SELECTOR,
            "parameter": call.encode_parameters(),
            "call_value": call_value,
            "fee_limit": self.config.fee_limit,
            "visible": true,
        });
        let response: TriggerResponse = self.post("/wallet/triggersmartcontract", &body).await?;
        if !response.result.result {
            return Err(Error::Contract(format!(
                "addLiquidity rejected by node: {}",
                response.result.describe()
            )));
        }
        let transaction = response
            .transaction
            .ok_or_else(|| Error::Tx("Node returned no transaction to sign".to_string()))?;

        let signed = signer.sign(transaction).await?;
        let handle = self.broadcast(signed).await;
        match &handle {
            Ok(h) => info!(txid = %h.txid, exchange = %exchange, "addLiquidity broadcast"),
            Err(e) => warn!(error = %e, exchange = %exchange, "addLiquidity broadcast failed"),
        }
        handle
    }
}
