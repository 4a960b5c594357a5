use cosmwasm_std::Uint256;
use tron_dex_sdk::amount::MAX_AMOUNT;
use tron_dex_sdk::liquidity::{max_output_value, slippage_bounds};
use tron_dex_sdk::validation::{is_broken_token, ContextualInfo, ValidationState};
use tron_dex_sdk::ValidationMessage;

fn u(value: u128) -> Uint256 {
    Uint256::from(value)
}

#[test]
fn test_default_tolerance_bounds() {
    let bounds = slippage_bounds(u(10_000), 200);
    assert_eq!(bounds.minimum, u(9_800));
    assert_eq!(bounds.maximum, u(10_200));
}

#[test]
fn test_bounds_floor_the_offset() {
    // 2% of 149 is 2.98
    let bounds = slippage_bounds(u(149), 200);
    assert_eq!(bounds.minimum, u(147));
    assert_eq!(bounds.maximum, u(151));
}

#[test]
fn test_bounds_are_clamped() {
    let bounds = slippage_bounds(u(100), 20_000);
    assert_eq!(bounds.minimum, Uint256::zero());
    assert_eq!(bounds.maximum, u(300));

    let top = slippage_bounds(MAX_AMOUNT, 200);
    assert_eq!(top.maximum, MAX_AMOUNT);
    assert!(top.minimum < MAX_AMOUNT);
}

#[test]
fn test_zero_tolerance_is_exact() {
    let bounds = slippage_bounds(u(123_456), 0);
    assert_eq!(bounds.minimum, u(123_456));
    assert_eq!(bounds.maximum, u(123_456));
}

#[test]
fn test_max_output_fits_balance_after_slippage() {
    assert_eq!(max_output_value(u(10_200_000), 200), u(10_000_000));

    for balance in [1u128, 99, 10_000, 1_234_567, 999_999_999_999] {
        let max = max_output_value(u(balance), 200);
        let required = slippage_bounds(max, 200).maximum;
        assert!(
            required <= u(balance),
            "max {} needs {} but balance is {}",
            max,
            required,
            balance
        );
    }
}

#[test]
fn test_blocking_errors() {
    let mut state = ValidationState::default();
    assert!(!state.has_blocking_error());

    state.show_unlock = true;
    assert!(state.has_blocking_error());

    state.clear_amount_errors();
    assert!(!state.has_blocking_error());

    state.broken_token = true;
    state.clear_amount_errors();
    assert!(state.has_blocking_error(), "broken token survives amount changes");
}

#[test]
fn test_broken_token_match() {
    let broken = vec!["TKJebW6SdoJhgkKU13BeKCbrMzT6HeQhJ6".to_string()];
    assert!(is_broken_token("tkjebw6sdojhgkku13bekcbrmzt6heqhj6", &broken));
    assert!(!is_broken_token("TBXSw8fM4jpQkGc6zZjsVABFpVN7UvXPdV", &broken));
}

#[test]
fn test_messages_read_as_sentences() {
    let info = ContextualInfo {
        message: ValidationMessage::ZeroDecimals,
        is_error: false,
    };
    assert_eq!(
        info.message.to_string(),
        "Invalid input. For 0 decimal tokens only supply whole number token amounts."
    );
    assert_eq!(
        ValidationMessage::EnterValue.to_string(),
        "Enter a value to continue."
    );
}
