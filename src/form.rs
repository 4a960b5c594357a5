//! Add-liquidity form state and its reducer

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which of the two amount panels a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Base currency (TRX) panel
    Input,
    /// Token panel
    Output,
}

impl Field {
    pub fn other(self) -> Self {
        match self {
            Field::Input => Field::Output,
            Field::Output => Field::Input,
        }
    }
}

/// Pre-fill values handed to the form when it opens, usually from a link
/// such as `?trxAmount=10&token=T...`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub base_amount: Option<String>,
    pub token_amount: Option<String>,
    pub token: Option<String>,
    /// Set once the form has read the parameters, so a reload does not
    /// apply them again
    #[serde(skip)]
    pub consumed: bool,
}

impl LaunchParams {
    /// Parse a query string. `ethAmount` is accepted as an alias of
    /// `trxAmount` for links written against the Ethereum front end.
    pub fn from_query(query: &str) -> Result<Self, Error> {
        let query = query.trim().trim_start_matches('?');
        let url = Url::parse(&format!("tron-dex://add-liquidity/?{}", query))
            .map_err(|e| Error::Other(format!("Invalid launch parameters: {}", e)))?;

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "trxAmount" | "ethAmount" => params.base_amount = Some(value),
                "tokenAmount" => params.token_amount = Some(value),
                "token" => params.token = Some(value),
                _ => {}
            }
        }
        Ok(params)
    }

    /// Hand the parameters over exactly once
    pub fn take(&mut self) -> Option<LaunchParams> {
        if self.consumed {
            return None;
        }
        self.consumed = true;
        Some(Self {
            consumed: true,
            ..self.clone()
        })
    }

    /// Whether the token came from the launch link (shown on the unknown
    /// token warning)
    pub fn added_token(&self, currency: &str) -> bool {
        self.token
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(currency))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub input_value: String,
    pub output_value: String,
    /// The authoritative field; the other one is derived from it
    pub last_edited_field: Field,
    /// Token address, empty while none is selected
    pub output_currency: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self::from_launch(&LaunchParams::default())
    }
}

/// Reducer actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    SelectCurrency(String),
    /// The user typed into a field; it becomes authoritative
    UpdateValue { field: Field, value: String },
    /// A derived value is written back without changing authority
    UpdateDependentValue { field: Field, value: String },
}

impl FormState {
    pub fn from_launch(params: &LaunchParams) -> Self {
        let base_amount = params.base_amount.clone().unwrap_or_default();
        let token_amount = params.token_amount.clone().unwrap_or_default();

        let token_led = !token_amount.is_empty() && base_amount.is_empty();
        Self {
            input_value: base_amount,
            output_value: if token_led { token_amount } else { String::new() },
            last_edited_field: if token_led { Field::Output } else { Field::Input },
            output_currency: params.token.clone().unwrap_or_default(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Input => &self.input_value,
            Field::Output => &self.output_value,
        }
    }

    fn set_value(&mut self, field: Field, value: String) {
        match field {
            Field::Input => self.input_value = value,
            Field::Output => self.output_value = value,
        }
    }

    pub fn reduce(mut self, action: FormAction) -> Self {
        match action {
            FormAction::SelectCurrency(currency) => {
                self.output_currency = currency;
            }
            FormAction::UpdateValue { field, value } => {
                self.set_value(field, value);
                self.last_edited_field = field;
            }
            FormAction::UpdateDependentValue { field, value } => {
                self.set_value(field, value);
            }
        }
        self
    }
}
