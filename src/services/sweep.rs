//! Client-side sweep orchestration.
//!
//! The orchestrator owns one [`SweepState`] value and replaces it on every
//! transition: idle until a wallet connects, loaded once balances arrive,
//! submitting while the batched call is with the wallet, and loaded again
//! afterwards. A successful submission schedules a balance refresh after
//! [`REFRESH_DELAY`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::Address;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::balance_service::BalanceSource;
use super::calldata_service::CallPlanner;
use crate::errors::{TransitionError, WalletError};
use crate::models::call::Call;
use crate::models::selection::{SelectedToken, Selection};
use crate::models::token::TokenHolding;

pub const REFRESH_DELAY: Duration = Duration::from_secs(5);

/// The wallet's batched-call capability. Calls execute in array order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletSubmitter: Send + Sync {
    /// Returns the wallet's identifier for the submitted batch.
    async fn send_calls(&self, account: Address, calls: Vec<Call>) -> Result<String, WalletError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loaded,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    Submitted {
        sweep_id: Uuid,
        batch_id: String,
        calls: usize,
    },
    /// None of the selected tokens had a usable route.
    NothingToSweep { sweep_id: Uuid },
    Failed { sweep_id: Uuid, reason: String },
}

impl SweepOutcome {
    pub fn sweep_id(&self) -> Uuid {
        match self {
            SweepOutcome::Submitted { sweep_id, .. }
            | SweepOutcome::NothingToSweep { sweep_id }
            | SweepOutcome::Failed { sweep_id, .. } => *sweep_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepState {
    pub account: Option<Address>,
    pub phase: Phase,
    pub loading: bool,
    /// Set between a successful submission and the delayed refetch.
    pub refreshing: bool,
    pub tokens: Vec<TokenHolding>,
    pub selection: Selection,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<SweepOutcome>,
}

impl SweepState {
    /// A wallet connected or switched account.
    pub fn connecting(&self, account: Address) -> Self {
        if self.account == Some(account) {
            return Self {
                loading: true,
                ..self.clone()
            };
        }
        Self {
            account: Some(account),
            loading: true,
            ..Self::default()
        }
    }

    /// Replaces the token list; selections for tokens no longer held are
    /// pruned.
    pub fn with_tokens(&self, tokens: Vec<TokenHolding>, loaded_at: DateTime<Utc>) -> Self {
        let selection = self
            .selection
            .iter()
            .filter(|(token, _)| tokens.iter().any(|held| held.token_address == **token))
            .map(|(token, selected)| (*token, selected.clone()))
            .collect();

        Self {
            phase: match self.phase {
                Phase::Submitting => Phase::Submitting,
                _ => Phase::Loaded,
            },
            loading: false,
            refreshing: false,
            tokens,
            selection,
            loaded_at: Some(loaded_at),
            ..self.clone()
        }
    }

    fn editable(&self) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Idle => Err(TransitionError::NotConnected),
            Phase::Submitting => Err(TransitionError::SubmissionPending),
            Phase::Loaded => Ok(()),
        }
    }

    /// Checkbox toggled. A new entry defaults to the full balance.
    pub fn toggled(&self, token: Address, checked: bool) -> Result<Self, TransitionError> {
        self.editable()?;
        let mut selection = self.selection.clone();

        if checked {
            let holding = self
                .tokens
                .iter()
                .find(|held| held.token_address == token)
                .ok_or(TransitionError::UnknownToken(token))?;
            if !holding.is_priced() {
                return Err(TransitionError::Unpriced(token));
            }
            selection.insert(
                token,
                SelectedToken {
                    amount: holding.display_balance(),
                    decimals: holding.decimals,
                },
            );
        } else {
            selection.remove(&token);
        }

        Ok(Self {
            selection,
            ..self.clone()
        })
    }

    /// Amount field edited. Not checked against the balance.
    pub fn amount_edited(&self, token: Address, amount: &str) -> Result<Self, TransitionError> {
        self.editable()?;
        let mut selection = self.selection.clone();
        let entry = selection
            .get_mut(&token)
            .ok_or(TransitionError::NotSelected(token))?;
        entry.amount = amount.to_string();

        Ok(Self {
            selection,
            ..self.clone()
        })
    }

    pub fn can_sweep(&self) -> bool {
        self.phase == Phase::Loaded && !self.selection.is_empty()
    }

    pub fn submitting(&self) -> Result<Self, TransitionError> {
        self.editable()?;
        if self.selection.is_empty() {
            return Err(TransitionError::NothingSelected);
        }
        Ok(Self {
            phase: Phase::Submitting,
            ..self.clone()
        })
    }

    /// Back to loaded. Only a submitted batch clears the selection and
    /// starts a refresh; every other outcome leaves tokens and selection
    /// untouched.
    pub fn settled(&self, outcome: SweepOutcome) -> Self {
        let submitted = matches!(outcome, SweepOutcome::Submitted { .. });
        Self {
            phase: Phase::Loaded,
            refreshing: submitted,
            selection: if submitted {
                Selection::new()
            } else {
                self.selection.clone()
            },
            last_outcome: Some(outcome),
            ..self.clone()
        }
    }

    /// USD worth of everything currently selected, at the entered amounts.
    pub fn selected_value(&self) -> f64 {
        self.selection
            .iter()
            .filter_map(|(token, selected)| {
                let holding = self.tokens.iter().find(|held| held.token_address == *token)?;
                Some(selected.amount.parse::<f64>().ok()? * holding.usd_price)
            })
            .sum()
    }
}

pub struct SweepOrchestrator {
    state: Arc<Mutex<SweepState>>,
    balances: Arc<dyn BalanceSource>,
    planner: Arc<dyn CallPlanner>,
    wallet: Arc<dyn WalletSubmitter>,
    refresh_delay: Duration,
}

fn lock(state: &Mutex<SweepState>) -> MutexGuard<'_, SweepState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stores freshly loaded tokens unless the wallet moved on meanwhile.
fn apply_tokens(state: &Mutex<SweepState>, account: Address, tokens: Vec<TokenHolding>) {
    let mut current = lock(state);
    if current.account != Some(account) {
        log::debug!("dropping stale balances for {:?}", account);
        return;
    }
    *current = current.with_tokens(tokens, Utc::now());
}

impl SweepOrchestrator {
    pub fn new(
        balances: Arc<dyn BalanceSource>,
        planner: Arc<dyn CallPlanner>,
        wallet: Arc<dyn WalletSubmitter>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SweepState::default())),
            balances,
            planner,
            wallet,
            refresh_delay: REFRESH_DELAY,
        }
    }

    pub fn state(&self) -> SweepState {
        lock(&self.state).clone()
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&SweepState) -> SweepState,
    {
        let mut current = lock(&self.state);
        *current = f(&current);
    }

    /// Settles a finished sweep unless the wallet disconnected or switched
    /// account while it was pending. Returns whether the outcome was kept.
    fn settle(&self, account: Address, outcome: &SweepOutcome) -> bool {
        let mut current = lock(&self.state);
        if current.account != Some(account) || current.phase != Phase::Submitting {
            return false;
        }
        *current = current.settled(outcome.clone());
        true
    }

    fn transition<F>(&self, f: F) -> Result<SweepState, TransitionError>
    where
        F: FnOnce(&SweepState) -> Result<SweepState, TransitionError>,
    {
        let mut current = lock(&self.state);
        let next = f(&current)?;
        *current = next.clone();
        Ok(next)
    }

    /// Wallet connected or switched account: reload balances.
    pub async fn connect(&self, account: Address) {
        self.update(|state| state.connecting(account));

        let tokens = match self.balances.balances(account).await {
            Ok(tokens) => tokens,
            Err(err) => {
                log::error!("failed to load balances for {:?}: {}", account, err);
                Vec::new()
            }
        };
        apply_tokens(&self.state, account, tokens);
    }

    pub fn disconnect(&self) {
        *lock(&self.state) = SweepState::default();
    }

    pub fn toggle(&self, token: Address, checked: bool) -> Result<(), TransitionError> {
        self.transition(|state| state.toggled(token, checked))
            .map(|_| ())
    }

    pub fn set_amount(&self, token: Address, amount: &str) -> Result<(), TransitionError> {
        self.transition(|state| state.amount_edited(token, amount))
            .map(|_| ())
    }

    /// Builds the call list for the current selection and hands it to the
    /// wallet as one batch. Refused while nothing is selected or a previous
    /// sweep is pending; every other failure becomes a visible outcome.
    pub async fn sweep(&self) -> Result<SweepOutcome, TransitionError> {
        let submitting = self.transition(|state| state.submitting())?;
        let account = submitting.account.ok_or(TransitionError::NotConnected)?;
        let sweep_id = Uuid::new_v4();
        log::info!(
            "sweep {} started for {} tokens of {:?}",
            sweep_id,
            submitting.selection.len(),
            account
        );

        let outcome = match self.planner.plan(account, submitting.selection).await {
            Err(err) => SweepOutcome::Failed {
                sweep_id,
                reason: err.to_string(),
            },
            Ok(calls) if calls.is_empty() => SweepOutcome::NothingToSweep { sweep_id },
            Ok(calls) => {
                let count = calls.len();
                match self.wallet.send_calls(account, calls).await {
                    Ok(batch_id) => SweepOutcome::Submitted {
                        sweep_id,
                        batch_id,
                        calls: count,
                    },
                    Err(err) => SweepOutcome::Failed {
                        sweep_id,
                        reason: err.to_string(),
                    },
                }
            }
        };

        match &outcome {
            SweepOutcome::Failed { reason, .. } => {
                log::warn!("sweep {} failed: {}", sweep_id, reason)
            }
            other => log::info!("sweep {} finished: {:?}", sweep_id, other),
        }

        if !self.settle(account, &outcome) {
            log::warn!(
                "sweep {} settled after {:?} disconnected, outcome dropped",
                sweep_id,
                account
            );
        } else if matches!(outcome, SweepOutcome::Submitted { .. }) {
            self.schedule_refresh(account);
        }
        Ok(outcome)
    }

    fn schedule_refresh(&self, account: Address) -> JoinHandle<()> {
        let state = self.state.clone();
        let balances = self.balances.clone();
        let delay = self.refresh_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match balances.balances(account).await {
                Ok(tokens) => apply_tokens(&state, account, tokens),
                Err(err) => {
                    log::error!("failed to refresh balances for {:?}: {}", account, err);
                    let mut current = lock(&state);
                    if current.account == Some(account) {
                        current.refreshing = false;
                    }
                }
            }
        })
    }
}
