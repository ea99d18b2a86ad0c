use std::{fmt, sync::Arc};

use derive_new::new;
use futures_util::future::try_join_all;
use serde_json::{json, Value};
use vetapp_core::{
    derive_object_address, derive_resource_address, encode_address, AccountAddress,
    ChainGateway, ContractAccount, FunctionId, PoolKind, ProtocolAddresses, TypeTag,
};

use crate::{commands::entry, ActionError, QueryCache, QueryKey};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 200;

const FA_BALANCE: &str = "0x1::primary_fungible_store::balance";
const FA_METADATA: &str = "0x1::fungible_asset::Metadata";

const POSITION_VAULT_SEED: &[u8] = b"VAULT";
const POSITION_COLLECTION: &[u8] = b"TAPP";
const LOCK_COLLECTION: &[u8] = b"veTAPP";

/// Resource accounts `vetapp` holds its token balances in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetappVault {
    Voter,
    /// Also the creator of the lock NFT collection.
    VeTapp,
    Team,
}

impl VetappVault {
    pub fn seed(self) -> &'static [u8] {
        match self {
            VetappVault::Voter => b"VOTER",
            VetappVault::VeTapp => b"VE_TAPP",
            VetappVault::Team => b"TEAM",
        }
    }
}

/// Page sizes outside `1..=200` are pulled to the nearest bound.
pub fn clamp_page_size(count: u64) -> u64 {
    count.clamp(1, MAX_PAGE_SIZE)
}

/// Position index from a position token name such as `Position_12`.
pub fn position_index(token_name: &str) -> Option<u64> {
    token_name.split('_').nth(1)?.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochData {
    pub epoch_start: u64,
    pub epoch_next: u64,
    pub vote_start: u64,
    pub vote_end: u64,
    pub active_period: u64,
    pub epoch_count: u64,
    pub weekly_emission: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedBalance {
    pub amount: u128,
    /// Unlock time, unix seconds.
    pub end: u64,
    pub is_permanent: bool,
}

impl LockedBalance {
    pub fn is_expired(&self, now_secs: u64) -> bool {
        !self.is_permanent && self.end < now_secs
    }
}

/// A lock's vote on one pool and the fee rewards it has earned there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolVote {
    pub weight: u128,
    /// Empty when the gauge account is not configured.
    pub fee_rewards: Vec<u128>,
}

/// Read-only view calls behind a [`QueryCache`].
#[derive(new)]
pub struct ViewQueries {
    gateway: Arc<dyn ChainGateway>,
    contracts: ProtocolAddresses,
    cache: QueryCache,
}

impl fmt::Debug for ViewQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewQueries")
            .field("contracts", &self.contracts)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ViewQueries {
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn owner(&self, account: ContractAccount) -> Result<AccountAddress, ActionError> {
        self.contracts
            .get(account)
            .ok_or(ActionError::ConfigMissing(account))
    }

    pub fn vetapp_vault(&self, vault: VetappVault) -> Result<AccountAddress, ActionError> {
        let vetapp = self.owner(ContractAccount::Vetapp)?;
        Ok(derive_resource_address(&vetapp, vault.seed()))
    }

    /// Collection holding the lock NFTs, for listing a user's locks through
    /// an indexer.
    pub fn lock_collection(&self) -> Result<AccountAddress, ActionError> {
        let vault = self.vetapp_vault(VetappVault::VeTapp)?;
        Ok(derive_object_address(&vault, LOCK_COLLECTION))
    }

    /// Collection holding liquidity position NFTs.
    pub fn position_collection(&self) -> Result<AccountAddress, ActionError> {
        let tapp = self.owner(ContractAccount::Tapp)?;
        let vault = derive_resource_address(&tapp, POSITION_VAULT_SEED);
        Ok(derive_object_address(&vault, POSITION_COLLECTION))
    }

    async fn view(
        &self,
        key: QueryKey,
        function: &FunctionId,
        type_args: &[TypeTag],
        args: Vec<Value>,
    ) -> Result<Arc<Vec<Value>>, ActionError> {
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }
        let values = Arc::new(self.gateway.view(function, type_args, args).await?);
        self.cache.insert(key, values.clone()).await;
        Ok(values)
    }

    async fn view_first(
        &self,
        key: QueryKey,
        function: &FunctionId,
        args: Vec<Value>,
    ) -> Result<Value, ActionError> {
        let values = self.view(key, function, &[], args).await?;
        first(function, &values).cloned()
    }

    pub async fn epoch(&self) -> Result<EpochData, ActionError> {
        let calls = [
            ("voter", "epoch_start"),
            ("voter", "epoch_next"),
            ("voter", "epoch_vote_start"),
            ("voter", "epoch_vote_end"),
            ("minter", "active_period"),
            ("minter", "epoch_count"),
            ("minter", "weekly"),
        ]
        .into_iter()
        .map(|(module, name)| entry(&self.contracts, ContractAccount::Vetapp, module, name))
        .collect::<Result<Vec<_>, _>>()?;

        let values = try_join_all(calls.iter().map(|function| async move {
            let key = QueryKey::new("epoch").with(function.function().as_str());
            let value = self.view_first(key, function, vec![]).await?;
            as_u128(function, &value)
        }))
        .await?;

        let as_secs = |i: usize| -> Result<u64, ActionError> {
            u64::try_from(values[i]).map_err(|_| unexpected(&calls[i], "value exceeds u64"))
        };
        Ok(EpochData {
            epoch_start: as_secs(0)?,
            epoch_next: as_secs(1)?,
            vote_start: as_secs(2)?,
            vote_end: as_secs(3)?,
            active_period: as_secs(4)?,
            epoch_count: as_secs(5)?,
            weekly_emission: values[6],
        })
    }

    pub async fn lock_info(&self, token: &AccountAddress) -> Result<LockedBalance, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Vetapp, "vetapp", "locked")?;
        let value = self
            .view_first(
                QueryKey::new("lock-info").with(token),
                &function,
                vec![address_arg(token)],
            )
            .await?;
        let field = |name: &str| {
            value
                .get(name)
                .ok_or_else(|| unexpected(&function, format!("missing field {name}")))
        };
        Ok(LockedBalance {
            amount: as_u128(&function, field("amount")?)?,
            end: as_u64(&function, field("end")?)?,
            is_permanent: as_bool(&function, field("is_permanent")?)?,
        })
    }

    pub async fn voting_power(&self, token: &AccountAddress) -> Result<u128, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Vetapp, "vetapp", "balance_of_nft")?;
        let value = self
            .view_first(
                QueryKey::new("voting-power").with(token),
                &function,
                vec![address_arg(token)],
            )
            .await?;
        as_u128(&function, &value)
    }

    /// Whether the lock voted in the current epoch.
    pub async fn has_voted(&self, token: &AccountAddress) -> Result<bool, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Vetapp, "vetapp", "voted")?;
        let value = self
            .view_first(
                QueryKey::new("lock-vote-status").with(token),
                &function,
                vec![address_arg(token)],
            )
            .await?;
        as_bool(&function, &value)
    }

    pub async fn voted_pools(
        &self,
        token: &AccountAddress,
    ) -> Result<Vec<AccountAddress>, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Vetapp, "voter", "voted_pools")?;
        let value = self
            .view_first(
                QueryKey::new("pool-votes").with(token),
                &function,
                vec![address_arg(token)],
            )
            .await?;
        as_vec(&function, &value, as_address)
    }

    pub async fn pool_vote(
        &self,
        token: &AccountAddress,
        pool: &AccountAddress,
    ) -> Result<PoolVote, ActionError> {
        let vote_of = entry(&self.contracts, ContractAccount::Vetapp, "voter", "vote_of")?;
        let key = QueryKey::new("pool-votes").with(token).with(pool);
        let weight = self
            .view_first(
                key.clone().with("weight"),
                &vote_of,
                vec![address_arg(token), address_arg(pool)],
            )
            .await?;
        let weight = as_u128(&vote_of, &weight)?;

        let fee_rewards = match self.contracts.function(
            ContractAccount::Gauge,
            "fees_voting_reward",
            "earned_many",
        ) {
            None => Vec::new(),
            Some(earned_many) => {
                let earned_many = earned_many?;
                let value = self
                    .view_first(
                        key.with("fee-rewards"),
                        &earned_many,
                        vec![address_arg(pool), address_arg(token)],
                    )
                    .await?;
                as_vec(&earned_many, &value, as_u128)?
            }
        };
        Ok(PoolVote {
            weight,
            fee_rewards,
        })
    }

    /// Total vote weight on `pool`.
    pub async fn pool_weight(&self, pool: &AccountAddress) -> Result<u128, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Vetapp, "voter", "weights")?;
        let value = self
            .view_first(
                QueryKey::new("voter-weight").with(pool),
                &function,
                vec![address_arg(pool)],
            )
            .await?;
        as_u128(&function, &value)
    }

    pub async fn gauge_earned(
        &self,
        pool: &AccountAddress,
        position_index: u64,
    ) -> Result<u128, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Gauge, "gauge", "earned")?;
        let value = self
            .view_first(
                QueryKey::new("gauge-earned").with(pool).with(position_index),
                &function,
                vec![address_arg(pool), u64_arg(position_index)],
            )
            .await?;
        as_u128(&function, &value)
    }

    /// Emissions still to be paid out by the gauge this epoch.
    pub async fn gauge_left(&self, pool: &AccountAddress) -> Result<u128, ActionError> {
        self.gauge_number("left", "gauge-left", pool).await
    }

    pub async fn reward_per_token(&self, pool: &AccountAddress) -> Result<u128, ActionError> {
        self.gauge_number("reward_per_token", "gauge-reward-per-token", pool)
            .await
    }

    async fn gauge_number(
        &self,
        name: &str,
        key: &str,
        pool: &AccountAddress,
    ) -> Result<u128, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Gauge, "gauge", name)?;
        let value = self
            .view_first(
                QueryKey::new(key).with(pool),
                &function,
                vec![address_arg(pool)],
            )
            .await?;
        as_u128(&function, &value)
    }

    /// Uncollected trading fees of a position, one entry per pool token.
    pub async fn claimable_fees(
        &self,
        kind: PoolKind,
        pool: &AccountAddress,
        position_index: u64,
    ) -> Result<Vec<u128>, ActionError> {
        let key = QueryKey::new("claimable")
            .with(pool)
            .with(position_index)
            .with(kind);
        let args = vec![address_arg(pool), u64_arg(position_index)];
        match kind {
            PoolKind::Clmm => {
                let function = entry(
                    &self.contracts,
                    ContractAccount::Clmm,
                    "clmm",
                    "get_position_fee_owed",
                )?;
                let values = self.view(key, &function, &[], args).await?;
                values.iter().map(|v| as_u128(&function, v)).collect()
            }
            PoolKind::Amm | PoolKind::Stable => {
                let account = match kind {
                    PoolKind::Amm => ContractAccount::Amm,
                    _ => ContractAccount::Stable,
                };
                let function = entry(&self.contracts, account, kind.module_name(), "claimable")?;
                let value = self.view_first(key, &function, args).await?;
                as_vec(&function, &value, as_u128)
            }
        }
    }

    /// Pools known to the helper, optionally filtered by kind.
    pub async fn tapp_pools(
        &self,
        kind: Option<PoolKind>,
        offset: u64,
        count: u64,
    ) -> Result<Vec<AccountAddress>, ActionError> {
        let count = clamp_page_size(count);
        let function = entry(
            &self.contracts,
            ContractAccount::VeTappHelper,
            "helper_ve",
            "tapp_pools",
        )?;
        let hook = kind.map(PoolKind::hook_type);
        let key = QueryKey::new("helper-ve-tapp-pools")
            .with(kind.map_or_else(|| "all".to_owned(), |k| k.to_string()))
            .with(offset)
            .with(count);
        let value = self
            .view_first(
                key,
                &function,
                vec![
                    json!({ "vec": hook.into_iter().collect::<Vec<u8>>() }),
                    u64_arg(offset),
                    u64_arg(count),
                ],
            )
            .await?;
        as_vec(&function, &value, as_address)
    }

    /// Metadata address of the protocol token.
    pub async fn tapp_token_address(&self) -> Result<AccountAddress, ActionError> {
        let function = entry(&self.contracts, ContractAccount::Vetapp, "tapp", "token_address")?;
        let value = self
            .view_first(QueryKey::new("tapp-token-address"), &function, vec![])
            .await?;
        as_address(&function, &value)
    }

    /// Primary fungible store balance of `owner` for the asset at `metadata`.
    pub async fn fungible_balance(
        &self,
        owner: &AccountAddress,
        metadata: &AccountAddress,
    ) -> Result<u128, ActionError> {
        let function: FunctionId = FA_BALANCE.parse()?;
        let type_args = [FA_METADATA.parse::<TypeTag>()?];
        let values = self
            .view(
                QueryKey::new("fa-balance").with(owner).with(metadata),
                &function,
                &type_args,
                vec![address_arg(owner), address_arg(metadata)],
            )
            .await?;
        as_u128(&function, first(&function, &values)?)
    }
}

fn address_arg(address: &AccountAddress) -> Value {
    Value::String(address.to_string())
}

/// u64 and wider travel as decimal strings.
fn u64_arg(value: u64) -> Value {
    Value::String(value.to_string())
}

fn unexpected(function: &FunctionId, reason: impl Into<String>) -> ActionError {
    ActionError::UnexpectedViewResult {
        function: function.to_string(),
        reason: reason.into(),
    }
}

fn first<'a>(function: &FunctionId, values: &'a [Value]) -> Result<&'a Value, ActionError> {
    values
        .first()
        .ok_or_else(|| unexpected(function, "empty result"))
}

fn as_u128(function: &FunctionId, value: &Value) -> Result<u128, ActionError> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| unexpected(function, format!("{value} is not an unsigned integer")))
}

fn as_u64(function: &FunctionId, value: &Value) -> Result<u64, ActionError> {
    u64::try_from(as_u128(function, value)?)
        .map_err(|_| unexpected(function, format!("{value} exceeds u64")))
}

fn as_bool(function: &FunctionId, value: &Value) -> Result<bool, ActionError> {
    value
        .as_bool()
        .ok_or_else(|| unexpected(function, format!("{value} is not a bool")))
}

fn as_address(function: &FunctionId, value: &Value) -> Result<AccountAddress, ActionError> {
    value
        .as_str()
        .and_then(|s| encode_address(s).ok())
        .ok_or_else(|| unexpected(function, format!("{value} is not an address")))
}

fn as_vec<T>(
    function: &FunctionId,
    value: &Value,
    item: fn(&FunctionId, &Value) -> Result<T, ActionError>,
) -> Result<Vec<T>, ActionError> {
    value
        .as_array()
        .ok_or_else(|| unexpected(function, format!("{value} is not a vector")))?
        .iter()
        .map(|v| item(function, v))
        .collect()
}
