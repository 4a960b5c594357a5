//! Add-liquidity session
//!
//! [`AddLiquiditySession`] is a deterministic state machine. Every
//! [`SessionEvent`] updates the raw inputs (form strings, chain snapshot,
//! selected token, account) and then all derived state is rebuilt from
//! scratch: parsed amounts, the dependent field, validation flags. Nothing
//! derived survives an event, so a stale estimate can never outlive the
//! input it was computed from.

use std::collections::HashSet;

use cosmwasm_std::Uint256;
use serde::{Deserialize, Serialize};

use crate::address::TronAddress;
use crate::amount::{display_decimals, format_amount, format_amount_ceil, BASE_DECIMALS};
use crate::config::Config;
use crate::error::AmountError;
use crate::form::{Field, FormAction, FormState, LaunchParams};
use crate::liquidity::{
    self, derive_dependent, liquidity_minted, market_rate, max_output_value,
    parse_edited_amount, slippage_bounds, PoolPosition,
};
use crate::pool::{PoolSnapshot, ReserveSnapshot, TokenDetails};
use crate::validation::{
    is_broken_token, is_new_token, ContextualInfo, ValidationMessage, ValidationState,
};

/// The parts of [`Config`] the session consults
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub allowed_slippage_bips: u32,
    pub deadline_from_now_secs: u64,
    pub fee_reserve: Uint256,
    pub native_symbol: String,
    pub broken_tokens: Vec<String>,
    /// Lower-cased addresses of the token registry
    pub known_tokens: HashSet<String>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_slippage_bips: config.liquidity.allowed_slippage_bips,
            deadline_from_now_secs: config.liquidity.deadline_from_now_secs,
            fee_reserve: Uint256::from(config.liquidity.fee_reserve),
            native_symbol: config.network.native_symbol.clone(),
            broken_tokens: config.broken_tokens.clone(),
            known_tokens: config.tokens.keys().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn is_known(&self, currency: &str) -> bool {
        self.known_tokens.contains(&currency.to_lowercase())
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The user typed into one of the amount panels
    FieldEdited { field: Field, value: String },
    CurrencySelected(String),
    /// Metadata for the selected token finished loading (or failed)
    TokenResolved(Option<TokenDetails>),
    /// Fresh reserves, supply, balances and allowance
    ReservesUpdated(PoolSnapshot),
    AccountChanged(Option<TronAddress>),
    TokenWarningDismissed,
    /// Fill the base panel with the whole balance minus the fee reserve
    UseMaxInput,
    /// Fill the token panel with the largest amount the balance covers
    /// after slippage
    UseMaxOutput,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAmounts {
    pub input: Option<Uint256>,
    pub output: Option<Uint256>,
}

/// Figures shown in the expandable transaction details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionDetails {
    /// First deposit: the user sets the price
    NewExchange {
        base_amount: String,
        token_amount: String,
        symbol: String,
        initial_rate: Option<String>,
        minted: String,
    },
    Existing {
        base_amount: String,
        max_token_amount: String,
        symbol: String,
        minted: String,
        total_supply: String,
        base_per_pool_token: String,
        token_per_pool_token: String,
    },
}

/// Pool overview rows under the panels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub exchange_rate: Option<String>,
    pub pool_size: Option<String>,
    pub share_percent: Option<String>,
    pub share_amounts: Option<String>,
}

/// Render-ready snapshot of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub form: FormState,
    pub symbol: Option<String>,
    pub is_new_exchange: bool,
    /// The token panel holds an estimate rather than the user's number
    pub output_estimated: bool,
    pub input_error: Option<ValidationMessage>,
    pub output_error: Option<ValidationMessage>,
    pub show_unlock: bool,
    pub input_balance: Option<String>,
    pub output_balance: Option<String>,
    pub summary: PoolSummary,
    pub contextual_info: Option<ContextualInfo>,
    pub details: Option<TransactionDetails>,
    pub show_token_warning: bool,
    /// The unknown token was supplied by the launch link
    pub token_from_link: bool,
    pub can_submit: bool,
    pub block: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AddLiquiditySession {
    settings: SessionSettings,
    form: FormState,
    launch: LaunchParams,
    token: Option<TokenDetails>,
    pool: PoolSnapshot,
    account: Option<TronAddress>,
    parsed: ParsedAmounts,
    validation: ValidationState,
    token_warning_dismissed: bool,
    /// The non-edited field holds a value written by derivation
    dependent_derived: bool,
}

impl AddLiquiditySession {
    pub fn new(settings: SessionSettings, mut launch: LaunchParams) -> Self {
        let form = launch
            .take()
            .map(|params| FormState::from_launch(&params))
            .unwrap_or_default();
        let mut session = Self {
            settings,
            form,
            launch,
            token: None,
            pool: PoolSnapshot::default(),
            account: None,
            parsed: ParsedAmounts::default(),
            validation: ValidationState::default(),
            token_warning_dismissed: false,
            dependent_derived: false,
        };
        session.recompute();
        session
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn token(&self) -> Option<&TokenDetails> {
        self.token.as_ref()
    }

    pub fn pool(&self) -> &PoolSnapshot {
        &self.pool
    }

    pub fn account(&self) -> Option<&TronAddress> {
        self.account.as_ref()
    }

    pub fn parsed(&self) -> ParsedAmounts {
        self.parsed
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn is_new_exchange(&self) -> bool {
        self.pool.is_new_exchange()
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::FieldEdited { field, value } => {
                self.dispatch(FormAction::UpdateValue { field, value });
            }
            SessionEvent::CurrencySelected(currency) => {
                if currency != self.form.output_currency {
                    self.dispatch(FormAction::SelectCurrency(currency));
                    self.token = None;
                    self.pool = PoolSnapshot::default();
                    self.token_warning_dismissed = false;
                }
            }
            SessionEvent::TokenResolved(details) => {
                self.token = details;
            }
            SessionEvent::ReservesUpdated(snapshot) => {
                self.pool = snapshot;
            }
            SessionEvent::AccountChanged(account) => {
                if self.account != account {
                    self.account = account;
                    self.pool.base_balance = None;
                    self.pool.token_balance = None;
                    self.pool.pool_token_balance = None;
                    self.pool.allowance = None;
                }
            }
            SessionEvent::TokenWarningDismissed => {
                self.token_warning_dismissed = true;
            }
            SessionEvent::UseMaxInput => {
                if let Some(balance) = self.pool.base_balance {
                    let value = balance.saturating_sub(self.settings.fee_reserve);
                    if !value.is_zero() {
                        let value = format_amount(value, BASE_DECIMALS, BASE_DECIMALS, false)
                            .unwrap_or_default();
                        self.dispatch(FormAction::UpdateValue {
                            field: Field::Input,
                            value,
                        });
                    }
                }
            }
            SessionEvent::UseMaxOutput => {
                let decimals = self.token.as_ref().map(|t| t.decimals);
                if let (Some(balance), Some(decimals)) = (self.pool.token_balance, decimals) {
                    let max = max_output_value(balance, self.settings.allowed_slippage_bips);
                    let value = format_amount(max, decimals, decimals, false).unwrap_or_default();
                    self.dispatch(FormAction::UpdateValue {
                        field: Field::Output,
                        value,
                    });
                }
            }
        }
        self.recompute();
    }

    fn dispatch(&mut self, action: FormAction) {
        match &action {
            FormAction::UpdateValue { field, .. } if *field != self.form.last_edited_field => {
                // The old authoritative field is now the dependent one
                self.dependent_derived = false;
            }
            FormAction::UpdateDependentValue { value, .. } => {
                self.dependent_derived = !value.is_empty();
            }
            _ => {}
        }
        self.form = std::mem::take(&mut self.form).reduce(action);
    }

    /// Drop a derived value once there is no rate to keep it current
    fn clear_derived_dependent(&mut self) {
        if self.dependent_derived {
            self.dispatch(FormAction::UpdateDependentValue {
                field: self.form.last_edited_field.other(),
                value: String::new(),
            });
        }
    }

    /// Rebuild every derived value from the current inputs
    fn recompute(&mut self) {
        self.parsed = ParsedAmounts::default();
        self.validation.clear_amount_errors();
        self.validation.broken_token =
            is_broken_token(&self.form.output_currency, &self.settings.broken_tokens);

        let (Some(token), Some(reserves)) = (self.token.clone(), self.pool.reserves) else {
            self.clear_derived_dependent();
            return;
        };

        if reserves.is_new_exchange() {
            self.clear_derived_dependent();
            self.parse_independent(token.decimals);
        } else {
            self.derive_from_edited(&reserves, token.decimals);
        }

        self.check_balances();
        self.check_allowance();
    }

    /// New exchange: both amounts are the user's, nothing is derived
    fn parse_independent(&mut self, decimals: u8) {
        if !self.form.input_value.is_empty() {
            match parse_edited_amount(&self.form.input_value, BASE_DECIMALS) {
                Ok(value) => self.parsed.input = Some(value),
                Err(_) => self.validation.input_error = Some(ValidationMessage::InputNotValid),
            }
        }
        if !self.form.output_value.is_empty() {
            match parse_edited_amount(&self.form.output_value, decimals) {
                Ok(value) => self.parsed.output = Some(value),
                Err(AmountError::TooManyDecimals { .. }) => {
                    self.validation.decimals_error = Some(ValidationMessage::ZeroDecimals)
                }
                Err(_) => self.validation.output_error = Some(ValidationMessage::InputNotValid),
            }
        }
    }

    /// Existing exchange: parse the authoritative field and write the other
    /// one back at the pool's rate
    fn derive_from_edited(&mut self, reserves: &ReserveSnapshot, decimals: u8) {
        let edited = self.form.last_edited_field;
        let dependent = edited.other();
        let value = self.form.value(edited).to_string();

        if value.is_empty() {
            self.dispatch(FormAction::UpdateDependentValue {
                field: dependent,
                value: String::new(),
            });
            return;
        }

        let (from_decimals, to_decimals, invert) = match edited {
            Field::Input => (BASE_DECIMALS, decimals, false),
            Field::Output => (decimals, BASE_DECIMALS, true),
        };

        let derived = parse_edited_amount(&value, from_decimals).and_then(|parsed| {
            let rate = market_rate(reserves, decimals, invert)?;
            let derived = derive_dependent(parsed, rate, from_decimals, to_decimals)?;
            Ok((parsed, derived))
        });

        match derived {
            Ok((parsed, derived)) => {
                let text =
                    format_amount(derived, to_decimals, display_decimals(to_decimals), false)
                        .unwrap_or_default();
                match edited {
                    Field::Input => {
                        self.parsed.input = Some(parsed);
                        self.parsed.output = Some(derived);
                    }
                    Field::Output => {
                        self.parsed.output = Some(parsed);
                        self.parsed.input = Some(derived);
                    }
                }
                self.dispatch(FormAction::UpdateDependentValue {
                    field: dependent,
                    value: text,
                });
            }
            Err(_) => {
                self.set_field_error(edited, ValidationMessage::InputNotValid);
                self.dispatch(FormAction::UpdateDependentValue {
                    field: dependent,
                    value: String::new(),
                });
            }
        }
    }

    fn set_field_error(&mut self, field: Field, message: ValidationMessage) {
        match field {
            Field::Input => self.validation.input_error = Some(message),
            Field::Output => self.validation.output_error = Some(message),
        }
    }

    fn check_balances(&mut self) {
        if let (Some(input), Some(balance)) = (self.parsed.input, self.pool.base_balance) {
            if input > balance {
                self.validation.input_error = Some(ValidationMessage::InsufficientBalance);
            }
        }
        if let (Some(required), Some(balance)) = (self.token_amount_to_send(), self.pool.token_balance)
        {
            if required > balance {
                self.validation.output_error = Some(ValidationMessage::InsufficientBalance);
            }
        }
    }

    fn check_allowance(&mut self) {
        if let (Some(required), Some(allowance)) = (self.token_amount_to_send(), self.pool.allowance) {
            if allowance < required {
                self.validation.output_error = Some(ValidationMessage::UnlockToken);
                self.validation.show_unlock = true;
            }
        }
    }

    /// Upper bound of tokens the exchange may pull: the exact amount for a
    /// new exchange, the slippage maximum otherwise
    pub fn token_amount_to_send(&self) -> Option<Uint256> {
        let output = self.parsed.output?;
        if self.is_new_exchange() {
            Some(output)
        } else {
            Some(slippage_bounds(output, self.settings.allowed_slippage_bips).maximum)
        }
    }

    /// Pool-share tokens the deposit is expected to mint
    pub fn liquidity_minted(&self) -> Option<Uint256> {
        let reserves = self.pool.reserves?;
        liquidity_minted(&reserves, self.pool.total_supply, self.parsed.input?)
    }

    /// Minimum pool-share tokens accepted on submission
    pub fn liquidity_minimum(&self) -> Option<Uint256> {
        self.liquidity_minted()
            .map(|minted| slippage_bounds(minted, self.settings.allowed_slippage_bips).minimum)
    }

    pub fn show_token_warning(&self) -> bool {
        !self.token_warning_dismissed
            && is_new_token(
                &self.form.output_currency,
                &self.settings.native_symbol,
                |c| self.settings.is_known(c),
            )
    }

    /// The one message shown under the form, most important first
    pub fn contextual_info(&self) -> Option<ContextualInfo> {
        let info = |message, is_error| Some(ContextualInfo { message, is_error });

        if self.validation.broken_token {
            info(ValidationMessage::BrokenToken, true)
        } else if let Some(message) = self.validation.decimals_error {
            info(message, false)
        } else if let Some(message) = self.validation.input_error.or(self.validation.output_error) {
            info(message, true)
        } else if self.form.output_currency.is_empty() {
            info(ValidationMessage::SelectToken, false)
        } else if self.form.input_value.is_empty() {
            info(ValidationMessage::EnterValue, false)
        } else if self.account.is_none() {
            info(ValidationMessage::NoWallet, true)
        } else {
            None
        }
    }

    pub fn can_submit(&self) -> bool {
        let Some(token) = &self.token else {
            return false;
        };
        !self.validation.has_blocking_error()
            && !self.form.output_currency.is_empty()
            && token.exchange_address.is_some()
            && self.account.is_some()
            && self.pool.reserves.is_some()
            && self.parsed.input.is_some()
            && self.parsed.output.is_some()
            && self.liquidity_minted().is_some()
    }

    /// The blocking reason, for callers that need an error rather than a flag
    pub fn blocking_message(&self) -> ValidationMessage {
        match self.contextual_info() {
            Some(info) => info.message,
            None if self.form.output_currency.is_empty() || self.token.is_none() => {
                ValidationMessage::SelectToken
            }
            None => ValidationMessage::EnterValue,
        }
    }

    pub fn transaction_details(&self) -> Option<TransactionDetails> {
        let token = self.token.as_ref()?;
        let reserves = self.pool.reserves?;
        let token_display = display_decimals(token.decimals);

        if reserves.is_new_exchange() {
            let initial_rate = match (self.parsed.input, self.parsed.output) {
                (Some(input), Some(output)) => {
                    market_rate(&ReserveSnapshot::new(input, output), token.decimals, false)
                        .ok()
                        .and_then(|rate| format_amount(rate, 6, 4, false).ok())
                }
                _ => None,
            };
            return Some(TransactionDetails::NewExchange {
                base_amount: self.form.input_value.clone(),
                token_amount: self.form.output_value.clone(),
                symbol: token.symbol.clone(),
                initial_rate,
                minted: self.form.input_value.clone(),
            });
        }

        let total_supply = self.pool.total_supply?;
        let fmt_base = |v: Uint256| format_amount(v, BASE_DECIMALS, 4, true).ok();
        let fmt_token = |v: Uint256| format_amount(v, token.decimals, token_display, true).ok();

        Some(TransactionDetails::Existing {
            base_amount: fmt_base(self.parsed.input?)?,
            max_token_amount: format_amount_ceil(
                self.token_amount_to_send()?,
                token.decimals,
                token_display,
                true,
            )
            .ok()?,
            symbol: token.symbol.clone(),
            minted: fmt_base(self.liquidity_minted()?)?,
            total_supply: fmt_base(total_supply)?,
            base_per_pool_token: liquidity::worth_per_pool_token(reserves.reserve_base, total_supply)
                .and_then(fmt_base)
                .unwrap_or_else(|| "-".to_string()),
            token_per_pool_token: liquidity::worth_per_pool_token(
                reserves.reserve_token,
                total_supply,
            )
            .and_then(fmt_token)
            .unwrap_or_else(|| "-".to_string()),
        })
    }

    pub fn pool_summary(&self) -> PoolSummary {
        let (Some(token), Some(reserves)) = (&self.token, self.pool.reserves) else {
            return PoolSummary::default();
        };
        let native = &self.settings.native_symbol;
        let token_display = display_decimals(token.decimals);
        let fmt_base = |v: Uint256| format_amount(v, BASE_DECIMALS, 4, true).unwrap_or_default();
        let fmt_token =
            |v: Uint256| format_amount(v, token.decimals, token_display, true).unwrap_or_default();

        let exchange_rate = market_rate(&reserves, token.decimals, false)
            .ok()
            .and_then(|rate| format_amount(rate, 6, 4, true).ok())
            .map(|rate| format!("1 {} = {} {}", native, rate, token.symbol));

        let pool_size = Some(format!(
            "{} {} + {} {}",
            fmt_base(reserves.reserve_base),
            native,
            fmt_token(reserves.reserve_token),
            token.symbol
        ));

        let position = match (self.pool.pool_token_balance, self.pool.total_supply) {
            (Some(pool_tokens), Some(total)) => PoolPosition::compute(&reserves, pool_tokens, total),
            _ => None,
        };

        PoolSummary {
            exchange_rate,
            pool_size,
            share_percent: position
                .and_then(|p| format_amount(p.share, 4, 2, false).ok()),
            share_amounts: position.map(|p| {
                format!(
                    "{} {} + {} {}",
                    fmt_base(p.base_amount),
                    native,
                    fmt_token(p.token_amount),
                    token.symbol
                )
            }),
        }
    }

    pub fn view(&self) -> SessionView {
        let token_display = self.token.as_ref().map(|t| (t.decimals, display_decimals(t.decimals)));
        SessionView {
            form: self.form.clone(),
            symbol: self.token.as_ref().map(|t| t.symbol.clone()),
            is_new_exchange: self.is_new_exchange(),
            output_estimated: !self.is_new_exchange()
                && self.pool.reserves.is_some()
                && !self.form.output_value.is_empty(),
            input_error: self.validation.input_error,
            output_error: self.validation.output_error,
            show_unlock: self.validation.show_unlock,
            input_balance: self
                .pool
                .base_balance
                .and_then(|b| format_amount(b, BASE_DECIMALS, 4, true).ok()),
            output_balance: match (self.pool.token_balance, token_display) {
                (Some(balance), Some((decimals, display))) => {
                    format_amount(balance, decimals, display, true).ok()
                }
                _ => None,
            },
            summary: self.pool_summary(),
            contextual_info: self.contextual_info(),
            details: self.transaction_details(),
            show_token_warning: self.show_token_warning(),
            token_from_link: self.launch.added_token(&self.form.output_currency),
            can_submit: self.can_submit(),
            block: self.pool.block,
        }
    }
}
