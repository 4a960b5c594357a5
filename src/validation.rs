//! Validation state of the add-liquidity form

use std::fmt;

use serde::{Deserialize, Serialize};

/// User-facing messages raised by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMessage {
    BrokenToken,
    InputNotValid,
    InsufficientBalance,
    UnlockToken,
    ZeroDecimals,
    SelectToken,
    EnterValue,
    NoWallet,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationMessage::BrokenToken => {
                "This token is not compatible with the exchange contracts."
            }
            ValidationMessage::InputNotValid => "Not a valid input value.",
            ValidationMessage::InsufficientBalance => "Insufficient balance.",
            ValidationMessage::UnlockToken => "Please unlock the token to continue.",
            ValidationMessage::ZeroDecimals => {
                "Invalid input. For 0 decimal tokens only supply whole number token amounts."
            }
            ValidationMessage::SelectToken => "Select a token to continue.",
            ValidationMessage::EnterValue => "Enter a value to continue.",
            ValidationMessage::NoWallet => "No wallet connected.",
        };
        f.write_str(text)
    }
}

/// The single message shown under the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualInfo {
    pub message: ValidationMessage,
    pub is_error: bool,
}

/// Independent error flags, each owned by one check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationState {
    pub input_error: Option<ValidationMessage>,
    pub output_error: Option<ValidationMessage>,
    /// Token amount with more decimals than the token has
    pub decimals_error: Option<ValidationMessage>,
    pub broken_token: bool,
    /// Allowance below the amount the exchange may pull
    pub show_unlock: bool,
}

impl ValidationState {
    /// Drop the flags recomputed from amounts; the broken token flag belongs
    /// to the currency and survives.
    pub fn clear_amount_errors(&mut self) {
        self.input_error = None;
        self.output_error = None;
        self.decimals_error = None;
        self.show_unlock = false;
    }

    pub fn has_blocking_error(&self) -> bool {
        self.input_error.is_some()
            || self.output_error.is_some()
            || self.decimals_error.is_some()
            || self.show_unlock
            || self.broken_token
    }
}

/// Case-insensitive membership in the broken token list
pub fn is_broken_token(currency: &str, broken_tokens: &[String]) -> bool {
    !currency.is_empty()
        && broken_tokens
            .iter()
            .any(|broken| broken.eq_ignore_ascii_case(currency))
}

/// A selected currency that is neither the native currency nor in the
/// registry of known tokens
pub fn is_new_token<F>(currency: &str, native_symbol: &str, is_known: F) -> bool
where
    F: Fn(&str) -> bool,
{
    !currency.is_empty() && currency != native_symbol && !is_known(currency)
}
