use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument, warn};
use vetapp_core::{
    AccountAddress, CallPayload, ChainCommunicationError, ChainGateway, ChainResult,
    EntryFunction, FunctionId, GasDefaults, GasEstimate, InclusionResult, Network,
    RawTransaction, SignedTransaction, SignerIdentity, TransactionAuthenticator,
    TransactionPayload, TxHash, TypeTag,
};

use crate::{
    client::{AptosClient, ClientError},
    parse_abort_code,
    types::{
        parse_u64, AccountData, LedgerInfo, PendingTransaction, TransactionView, ViewRequest,
    },
};

const SIMULATE_PATH: &str =
    "transactions/simulate?estimate_gas_unit_price=true&estimate_max_gas_amount=true";
const MIN_MAX_GAS_UNITS: u64 = 2_000;

/// Connection settings for an [`AptosGateway`].
#[derive(Debug, Clone)]
pub struct AptosGatewayConf {
    pub network: Network,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub gas: GasDefaults,
}

impl Default for AptosGatewayConf {
    fn default() -> Self {
        Self {
            network: Network::default(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            gas: GasDefaults::default(),
        }
    }
}

/// `ChainGateway` over the Aptos fullnode REST API.
#[derive(Debug, Clone)]
pub struct AptosGateway {
    client: AptosClient,
    network: Network,
    gas: GasDefaults,
    poll_interval: Duration,
}

impl AptosGateway {
    pub fn new(conf: &AptosGatewayConf) -> ChainResult<Self> {
        let client = AptosClient::new(
            conf.network.rest_url(),
            conf.api_key.clone(),
            conf.request_timeout,
        )
        .map_err(ChainCommunicationError::from_other)?;
        Ok(Self {
            client,
            network: conf.network.clone(),
            gas: conf.gas,
            poll_interval: conf.poll_interval,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    async fn fetch_transaction(&self, hash: &TxHash) -> Result<Option<TransactionView>, ClientError> {
        match self
            .client
            .get_json::<TransactionView>(&format!("transactions/by_hash/{hash}"))
            .await
        {
            Ok(txn) if txn.is_pending() => Ok(None),
            Ok(txn) => Ok(Some(txn)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn build_error(err: impl std::fmt::Display) -> ChainCommunicationError {
    ChainCommunicationError::BuildError(err.to_string())
}

fn inclusion_result(hash: TxHash, txn: TransactionView) -> ChainResult<InclusionResult> {
    let vm_status = txn.vm_status.unwrap_or_default();
    let gas_used = parse_u64("gas_used", txn.gas_used.as_deref())
        .map_err(ChainCommunicationError::from_other_str)?;
    Ok(InclusionResult {
        hash,
        success: txn.success.unwrap_or(false),
        abort_code: parse_abort_code(&vm_status),
        vm_status,
        gas_used,
    })
}

#[async_trait]
impl ChainGateway for AptosGateway {
    #[instrument(err, skip(self, payload), fields(function = %payload.function()))]
    async fn build(
        &self,
        sender: AccountAddress,
        payload: &CallPayload,
    ) -> ChainResult<RawTransaction> {
        let ledger: LedgerInfo = self.client.get_json("").await.map_err(build_error)?;
        let account: AccountData = self
            .client
            .get_json(&format!("accounts/{sender}"))
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    build_error(format!("account {sender} does not exist"))
                } else {
                    build_error(err)
                }
            })?;
        let sequence_number =
            parse_u64("sequence_number", Some(&account.sequence_number)).map_err(build_error)?;

        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        Ok(RawTransaction {
            sender,
            sequence_number,
            payload: TransactionPayload(EntryFunction::from(payload)),
            max_gas_amount: self.gas.max_gas_amount,
            gas_unit_price: self.gas.gas_unit_price,
            expiration_timestamp_secs: now.saturating_add(self.gas.expiration.as_secs()),
            chain_id: ledger.chain_id,
        })
    }

    #[instrument(err, skip_all, fields(sender = %txn.sender))]
    async fn simulate(
        &self,
        txn: &RawTransaction,
        signer: &SignerIdentity,
    ) -> ChainResult<GasEstimate> {
        let simulation = SignedTransaction {
            raw_txn: txn.clone(),
            authenticator: TransactionAuthenticator::Ed25519 {
                public_key: signer.public_key(),
                signature: [0u8; 64],
            },
        };
        let sim_error = |e: String| ChainCommunicationError::SimulationFailed(e);

        let results: Vec<TransactionView> = self
            .client
            .post_bcs(SIMULATE_PATH, simulation.to_bcs_bytes()?)
            .await
            .map_err(|e| sim_error(e.to_string()))?;
        let result = results
            .into_iter()
            .next()
            .ok_or_else(|| sim_error("empty simulation response".into()))?;
        if result.success != Some(true) {
            return Err(sim_error(result.vm_status.unwrap_or_default()));
        }

        let gas_used = parse_u64("gas_used", result.gas_used.as_deref()).map_err(sim_error)?;
        let gas_unit_price =
            parse_u64("gas_unit_price", result.gas_unit_price.as_deref()).map_err(sim_error)?;
        let mut max_gas_units = gas_used.saturating_add(gas_used / 2).max(MIN_MAX_GAS_UNITS);
        if let Ok(node_max) = parse_u64("max_gas_amount", result.max_gas_amount.as_deref()) {
            if node_max > 0 {
                max_gas_units = max_gas_units.min(node_max);
            }
        }
        debug!(gas_used, gas_unit_price, max_gas_units, "simulation succeeded");
        Ok(GasEstimate {
            gas_unit_price,
            max_gas_units,
        })
    }

    async fn sign(
        &self,
        signer: &SignerIdentity,
        txn: RawTransaction,
    ) -> ChainResult<SignedTransaction> {
        signer.sign_transaction(txn).await
    }

    #[instrument(err, skip_all, fields(sender = %txn.raw_txn.sender, sequence_number = txn.raw_txn.sequence_number))]
    async fn submit(&self, txn: &SignedTransaction) -> ChainResult<TxHash> {
        let pending: PendingTransaction = self
            .client
            .post_bcs("transactions", txn.to_bcs_bytes()?)
            .await
            .map_err(|err| match err {
                ClientError::Api { .. } => ChainCommunicationError::SubmitRejected(err.to_string()),
                other => ChainCommunicationError::from_other(other),
            })?;
        Ok(pending.hash.parse::<TxHash>()?)
    }

    #[instrument(err, skip(self))]
    async fn wait_for_inclusion(
        &self,
        hash: &TxHash,
        timeout: Duration,
    ) -> ChainResult<InclusionResult> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.fetch_transaction(hash).await {
                Ok(Some(txn)) => return inclusion_result(*hash, txn),
                Ok(None) => {}
                Err(err) => warn!(%hash, error = %err, "failed to poll transaction, retrying"),
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(ChainCommunicationError::InclusionTimeout {
                    hash: *hash,
                    timeout,
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    #[instrument(err, skip(self, args), fields(function = %function))]
    async fn view(
        &self,
        function: &FunctionId,
        type_args: &[TypeTag],
        args: Vec<serde_json::Value>,
    ) -> ChainResult<Vec<serde_json::Value>> {
        let request = ViewRequest {
            function: function.to_string(),
            type_arguments: type_args.iter().map(ToString::to_string).collect(),
            arguments: args,
        };
        self.client
            .post_json("view", &request)
            .await
            .map_err(|err| ChainCommunicationError::ViewCallFailed {
                function: function.to_string(),
                reason: err.to_string(),
            })
    }

    fn explorer_url(&self, hash: &TxHash) -> Option<String> {
        Some(self.network.explorer_url(hash))
    }
}
