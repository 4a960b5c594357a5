mod utils;

use tron_dex_sdk::client::resolve_token_details;
use tron_dex_sdk::config::NetworkConstants;
use tron_dex_sdk::{ChainReader, Error, TronAddress, TronClient};
use utils::test_utils::{create_test_config, test_account, test_token, units, Funding, MockChain};

#[tokio::test]
async fn test_client_creation() {
    let client = TronClient::new(NetworkConstants::nile()).expect("Failed to create client");
    assert_eq!(client.config().network_name, "nile");
    assert!(client.signer_address().is_none());
}

#[tokio::test]
async fn test_missing_factory_is_a_config_error() {
    let client = TronClient::new(NetworkConstants::nile()).expect("Failed to create client");
    let token = test_token("unlisted").address();

    // Fails before any request is made
    let result = client.exchange_for_token(&token).await;
    assert!(matches!(result, Err(Error::Config(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_registered_token_resolves_from_config() {
    let config = create_test_config();
    let token = test_token("test");
    // The chain knows nothing about the token
    let chain = MockChain::new();

    let details = resolve_token_details(&chain, &config, &token.address)
        .await
        .expect("resolve")
        .expect("token details");
    assert_eq!(details.symbol, "TEST");
    assert_eq!(details.exchange_address, Some(token.exchange()));
}

#[tokio::test]
async fn test_unlisted_token_resolves_from_chain() {
    let config = create_test_config();
    let token = test_token("unlisted");
    let chain = MockChain::new().with_pool(&token, units(5), 20u128.into(), units(5));

    let details = resolve_token_details(&chain, &config, &token.address)
        .await
        .expect("resolve")
        .expect("token details");
    assert_eq!(details.symbol, "UNL");
    assert_eq!(details.decimals, 0);
    assert_eq!(details.exchange_address, Some(token.exchange()));
}

#[tokio::test]
async fn test_native_and_empty_currency_resolve_to_nothing() {
    let config = create_test_config();
    let chain = MockChain::new();

    assert!(resolve_token_details(&chain, &config, "TRX").await.unwrap().is_none());
    assert!(resolve_token_details(&chain, &config, "").await.unwrap().is_none());
    assert!(matches!(
        resolve_token_details(&chain, &config, "not-an-address").await,
        Err(Error::Address(_))
    ));
}

#[tokio::test]
async fn test_pool_snapshot_reads_pool_and_account() {
    let token = test_token("test");
    let account = test_account();
    let funding = Funding {
        pool_tokens: units(1),
        ..Default::default()
    };
    let chain = MockChain::new()
        .with_pool(&token, units(100), units(200), units(50))
        .with_account(&token, account, funding);

    let snapshot = chain
        .pool_snapshot(&token.details(), Some(&account))
        .await
        .expect("snapshot");
    let reserves = snapshot.reserves.expect("reserves");
    assert_eq!(reserves.reserve_base, units(100));
    assert_eq!(reserves.reserve_token, units(200));
    assert_eq!(snapshot.total_supply, Some(units(50)));
    assert_eq!(snapshot.base_balance, Some(funding.base));
    assert_eq!(snapshot.pool_token_balance, Some(units(1)));
    assert_eq!(snapshot.allowance, Some(funding.allowance));
    assert_eq!(snapshot.block, Some(100));
}

#[tokio::test]
async fn test_pool_snapshot_without_account_or_exchange() {
    let token = test_token("test");
    let chain = MockChain::new().with_pool(&token, units(1), units(2), units(1));

    let snapshot = chain
        .pool_snapshot(&token.details(), None)
        .await
        .expect("snapshot");
    assert!(snapshot.reserves.is_some());
    assert_eq!(snapshot.base_balance, None);
    assert_eq!(snapshot.allowance, None);

    let mut no_exchange = token.details();
    no_exchange.exchange_address = None;
    let snapshot = chain.pool_snapshot(&no_exchange, None).await.expect("snapshot");
    assert_eq!(snapshot.reserves, None);
    assert_eq!(snapshot.block, Some(100));
}

#[test]
fn test_addresses_parse_in_both_encodings() {
    let token = test_token("test");
    let from_base58: TronAddress = token.address.parse().unwrap();
    let from_hex: TronAddress = "411111111111111111111111111111111111111111".parse().unwrap();
    assert_eq!(from_base58, from_hex);
    assert_eq!(from_hex.to_base58(), token.address);
}
