pub mod abi;
pub mod address;
pub mod amount;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod liquidity;
pub mod logging;
pub mod pool;
pub mod session;
pub mod submit;
pub mod subscription;
pub mod validation;

// TUI module - optional via "tui" feature
#[cfg(feature = "tui")]
pub mod tui;

pub use address::TronAddress;
pub use client::{ChainReader, LiquiditySubmitter, TransactionSigner, TronClient};
pub use config::{Config, LiquiditySettings, NetworkConstants, TokenInfo};
pub use controller::{AddLiquidityController, Command, ControllerDeps, ControllerHandle};
pub use error::{AmountError, Error};
pub use form::{Field, FormState, LaunchParams};
pub use pool::{PoolSnapshot, ReserveSnapshot, TokenDetails};
pub use session::{AddLiquiditySession, SessionEvent, SessionSettings, SessionView};
pub use submit::{AddLiquidityCall, InMemoryPendingTransactions, PendingTransactions, TxHandle};
pub use validation::{ContextualInfo, ValidationMessage};

// Re-export TUI entry point when feature is enabled
#[cfg(feature = "tui")]
pub use tui::run_tui;

// Amounts are carried as cosmwasm-std big integers
pub use cosmwasm_std::{Uint256, Uint512};
