//! Add-liquidity controller
//!
//! One task owns the [`AddLiquiditySession`] and is the only thing that
//! mutates it. User commands arrive over an mpsc channel, new blocks over
//! the [`BlockSubscription`]; after each one the controller publishes a
//! fresh [`SessionView`] on a watch channel for the UI to render.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::address::TronAddress;
use crate::amount::{display_decimals, format_amount, BASE_DECIMALS};
use crate::client::{resolve_token_details, ChainReader, LiquiditySubmitter};
use crate::config::Config;
use crate::error::Error;
use crate::form::{Field, LaunchParams};
use crate::session::{AddLiquiditySession, SessionEvent, SessionSettings, SessionView};
use crate::submit::{AddLiquidityCall, PendingTransactions};
use crate::subscription::{BlockEvent, BlockSubscription};

/// Requests from the UI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    EditField { field: Field, value: String },
    SelectCurrency(String),
    UseMaxInput,
    UseMaxOutput,
    DismissTokenWarning,
    SetAccount(Option<TronAddress>),
    /// Re-read the chain without waiting for the next block
    Refresh,
    Submit,
    Shutdown,
}

/// External collaborators of the controller
#[derive(Clone)]
pub struct ControllerDeps {
    pub reader: Arc<dyn ChainReader>,
    pub submitter: Arc<dyn LiquiditySubmitter>,
    pub pending: Arc<dyn PendingTransactions>,
}

/// Handle to a running controller
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<SessionView>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub fn send(&self, command: Command) -> Result<(), Error> {
        self.commands
            .send(command)
            .map_err(|e| Error::Channel(format!("controller stopped: {:?}", e.0)))
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Stop the controller, its block subscription and wait for in-flight
    /// submissions to settle
    pub async fn shutdown(self) -> Result<(), Error> {
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| Error::Other(format!("controller task failed: {}", e)))
    }
}

pub struct AddLiquidityController {
    deps: ControllerDeps,
    config: Arc<Config>,
    session: AddLiquiditySession,
    account: Option<TronAddress>,
    view: watch::Sender<SessionView>,
    submissions: JoinSet<()>,
}

impl AddLiquidityController {
    /// Start the controller task
    pub fn spawn(
        deps: ControllerDeps,
        config: Arc<Config>,
        launch: LaunchParams,
        account: Option<TronAddress>,
    ) -> ControllerHandle {
        let mut session = AddLiquiditySession::new(SessionSettings::from_config(&config), launch);
        session.apply(SessionEvent::AccountChanged(account));

        let (view_tx, view_rx) = watch::channel(session.view());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let controller = Self {
            deps,
            config,
            session,
            account,
            view: view_tx,
            submissions: JoinSet::new(),
        };
        let task = tokio::spawn(controller.run(command_rx));

        ControllerHandle {
            commands: command_tx,
            view: view_rx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let (block_tx, mut blocks) = mpsc::unbounded_channel::<BlockEvent>();
        let subscription = BlockSubscription::spawn(
            Arc::clone(&self.deps.reader),
            self.config.liquidity.block_poll_interval(),
            block_tx,
        );

        self.resolve_token().await;
        self.refresh().await;
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(block) = blocks.recv() => {
                    debug!(block = block.number, "refreshing pool on new block");
                    self.refresh().await;
                }
            }
            self.publish();
        }

        subscription.unsubscribe().await;
        while self.submissions.join_next().await.is_some() {}
        info!("add-liquidity controller stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::EditField { field, value } => {
                self.session.apply(SessionEvent::FieldEdited { field, value });
            }
            Command::SelectCurrency(currency) => {
                self.session.apply(SessionEvent::CurrencySelected(currency));
                self.resolve_token().await;
                self.refresh().await;
            }
            Command::UseMaxInput => self.session.apply(SessionEvent::UseMaxInput),
            Command::UseMaxOutput => self.session.apply(SessionEvent::UseMaxOutput),
            Command::DismissTokenWarning => {
                self.session.apply(SessionEvent::TokenWarningDismissed)
            }
            Command::SetAccount(account) => {
                self.account = account;
                self.session.apply(SessionEvent::AccountChanged(account));
                self.refresh().await;
            }
            Command::Refresh => self.refresh().await,
            Command::Submit => self.submit(),
            Command::Shutdown => {}
        }
    }

    async fn resolve_token(&mut self) {
        let currency = self.session.form().output_currency.clone();
        if currency.is_empty() {
            return;
        }
        let details = match resolve_token_details(self.deps.reader.as_ref(), &self.config, &currency)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                warn!(error = %e, currency = %currency, "could not resolve token");
                None
            }
        };
        self.session.apply(SessionEvent::TokenResolved(details));
    }

    async fn refresh(&mut self) {
        let Some(token) = self.session.token().cloned() else {
            return;
        };
        match self
            .deps
            .reader
            .pool_snapshot(&token, self.account.as_ref())
            .await
        {
            Ok(snapshot) => self.session.apply(SessionEvent::ReservesUpdated(snapshot)),
            Err(e) => warn!(error = %e, token = %token.address, "pool refresh failed"),
        }
    }

    /// Fire the deposit without blocking the loop; the outcome lands in the
    /// pending store
    fn submit(&mut self) {
        let call = match AddLiquidityCall::from_session(&self.session, Utc::now()) {
            Ok(call) => call,
            Err(e) => {
                warn!(error = %e, "submit ignored");
                return;
            }
        };
        let Some(token) = self.session.token().cloned() else {
            return;
        };
        let Some(exchange) = token.exchange_address else {
            return;
        };

        let summary = format!(
            "Add {} {} and {} {}",
            format_amount(call.call_value, BASE_DECIMALS, 4, true).unwrap_or_default(),
            self.config.network.native_symbol,
            format_amount(call.max_tokens, token.decimals, display_decimals(token.decimals), true)
                .unwrap_or_default(),
            token.symbol
        );
        info!(%summary, deadline = call.deadline, "submitting addLiquidity");

        let submitter = Arc::clone(&self.deps.submitter);
        let pending = Arc::clone(&self.deps.pending);
        self.submissions.spawn(async move {
            match submitter.add_liquidity(&exchange, &call).await {
                Ok(handle) => pending.add(&handle, summary).await,
                Err(e) => warn!(error = %e, "addLiquidity submission failed"),
            }
        });
    }

    fn publish(&mut self) {
        // Reap finished submissions so the set does not grow unbounded
        while self.submissions.try_join_next().is_some() {}
        self.view.send_replace(self.session.view());
    }
}
