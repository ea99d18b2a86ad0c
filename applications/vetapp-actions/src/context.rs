use std::{fmt, sync::Arc};

use tracing::{info, instrument, warn};
use vetapp_core::{
    AccountAddress, DelegatedSigner, PoolKind, ProtocolAddresses, SignerIdentity, TxHash,
};
use vetapp_submitter::SubmitsTransactions;

use crate::{commands, ActionError, Command, HelperAction, InFlightGuard, QueryCache};

/// Everything a control needs to turn user input into a confirmed
/// transaction: the connected wallet, the configured contracts, the submitter
/// and the query cache to refresh afterwards.
pub struct ActionContext {
    submitter: Arc<dyn SubmitsTransactions>,
    signer: SignerIdentity,
    contracts: ProtocolAddresses,
    cache: QueryCache,
    guard: InFlightGuard,
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("signer", &self.signer.address())
            .field("contracts", &self.contracts)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl ActionContext {
    pub fn new(
        submitter: Arc<dyn SubmitsTransactions>,
        wallet: DelegatedSigner,
        contracts: ProtocolAddresses,
        cache: QueryCache,
    ) -> Self {
        Self {
            submitter,
            signer: wallet.into(),
            contracts,
            cache,
            guard: InFlightGuard::default(),
        }
    }

    pub fn contracts(&self) -> &ProtocolAddresses {
        &self.contracts
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    /// Submit a built command and, once confirmed, drop the reads it made
    /// stale. Fails fast with [`ActionError::InFlight`] while the same
    /// control is still submitting.
    #[instrument(skip_all, fields(control = %command.control(), function = %command.payload().function()))]
    pub async fn execute(&self, command: Command) -> Result<TxHash, ActionError> {
        let _ticket = self.guard.enter(command.control())?;
        let result = self
            .submitter
            .submit(command.payload().clone(), &self.signer)
            .await;
        match result {
            Ok(hash) => {
                for key in command.invalidates() {
                    self.cache.invalidate_prefix(key).await;
                }
                info!(?hash, "action confirmed");
                Ok(hash)
            }
            Err(failure) => {
                let err = ActionError::from(failure);
                if err.is_user_rejection() {
                    info!("action cancelled in wallet");
                } else {
                    warn!(error = %err, "action failed");
                }
                Err(err)
            }
        }
    }

    pub async fn gauge_commit(&self, pool: &str, position: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::gauge_commit(&self.contracts, pool, position)?)
            .await
    }

    pub async fn gauge_uncommit(&self, pool: &str, position: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::gauge_uncommit(&self.contracts, pool, position)?)
            .await
    }

    pub async fn claim_fees(&self, pool: &str, position: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::claim_fees(&self.contracts, pool, position)?)
            .await
    }

    pub async fn claim_rewards(&self, pool: &str, position: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::claim_rewards(&self.contracts, pool, position)?)
            .await
    }

    pub async fn vote<P: AsRef<str>, W: AsRef<str>>(
        &self,
        token: &str,
        pools: &[P],
        weights: &[W],
    ) -> Result<TxHash, ActionError> {
        self.execute(commands::vote(&self.contracts, token, pools, weights)?)
            .await
    }

    pub async fn create_lock(&self, value: &str, lock_duration: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::create_lock(&self.contracts, value, lock_duration)?)
            .await
    }

    pub async fn increase_unlock_time(
        &self,
        token: &str,
        lock_duration: &str,
    ) -> Result<TxHash, ActionError> {
        self.execute(commands::increase_unlock_time(
            &self.contracts,
            token,
            lock_duration,
        )?)
        .await
    }

    pub async fn distribute_bribes(
        &self,
        pool: &str,
        token: &str,
        amount: &str,
    ) -> Result<TxHash, ActionError> {
        self.execute(commands::distribute_bribes(
            &self.contracts,
            pool,
            token,
            amount,
        )?)
        .await
    }

    pub async fn migrate_pools(&self, pools: &[AccountAddress]) -> Result<TxHash, ActionError> {
        self.execute(commands::migrate_pools(&self.contracts, pools)?)
            .await
    }

    pub async fn swap(&self, pool: &str, kind: PoolKind) -> Result<TxHash, ActionError> {
        self.execute(commands::swap(&self.contracts, pool, kind)?).await
    }

    pub async fn add_liquidity(&self, pool: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::add_liquidity(&self.contracts, pool)?)
            .await
    }

    pub async fn swaps_pool(&self, pool: &str) -> Result<TxHash, ActionError> {
        self.execute(commands::swaps_pool(&self.contracts, pool)?)
            .await
    }

    pub async fn mint_tapp(&self) -> Result<TxHash, ActionError> {
        self.execute(commands::mint_tapp(&self.contracts)?).await
    }

    pub async fn update_period(&self) -> Result<TxHash, ActionError> {
        self.execute(commands::update_period(&self.contracts)?).await
    }

    pub async fn faucet_quick_mint(&self) -> Result<TxHash, ActionError> {
        self.execute(commands::faucet_quick_mint()?).await
    }

    pub async fn helper_action(&self, action: HelperAction) -> Result<TxHash, ActionError> {
        self.execute(commands::helper_action(&self.contracts, action)?)
            .await
    }
}
