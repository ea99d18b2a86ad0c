//! One builder per on-chain action.
//!
//! Builders validate their input and resolve the target module before
//! anything touches the network. Each returns the payload together with the
//! cached reads the transaction makes stale.

use std::fmt;

use vetapp_core::{
    AccountAddress, CallPayload, ContractAccount, FunctionId, MoveValue, PoolKind,
    ProtocolAddresses,
};

use crate::{validate, ActionError, QueryKey};

pub use blobs::{CLMM_MIN_SQRT_PRICE_LIMIT, OP_MIGRATE_POOLS, TEST_SWAP_AMOUNT};

mod blobs;

/// Test-token faucet on testnet.
pub const FAUCET_QUICK_MINT: &str =
    "0x55f1d474cf8027c72dd3aaab5f47870a2a11990e17f728c69c8546d5e99645b3::faucet::quick_mint";

/// 100 test tokens at 8 decimals.
pub const FAUCET_QUICK_MINT_AMOUNT: u64 = 100_00_000_000;

const YEAR_SECS: u64 = 365 * 24 * 60 * 60;

/// Lock lengths offered for new locks and extensions.
pub const LOCK_DURATIONS: [(&str, u64); 3] =
    [("1Y", YEAR_SECS), ("2Y", 2 * YEAR_SECS), ("4Y", 4 * YEAR_SECS)];

/// A validated transaction ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    control: String,
    payload: CallPayload,
    invalidates: Vec<QueryKey>,
}

impl Command {
    fn new(control: impl fmt::Display, payload: CallPayload) -> Self {
        Self {
            control: control.to_string(),
            payload,
            invalidates: Vec::new(),
        }
    }

    fn invalidating(mut self, key: QueryKey) -> Self {
        self.invalidates.push(key);
        self
    }

    /// The control this command came from; at most one submission per control
    /// runs at a time.
    pub fn control(&self) -> &str {
        &self.control
    }

    pub fn payload(&self) -> &CallPayload {
        &self.payload
    }

    /// Query prefixes to drop once the transaction is confirmed.
    pub fn invalidates(&self) -> &[QueryKey] {
        &self.invalidates
    }
}

/// Admin entry points on `helper_ve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperAction {
    /// `initialize(is_test)`
    Initialize { test: bool },
    DistributeGauges,
}

impl HelperAction {
    fn function_name(self) -> &'static str {
        match self {
            HelperAction::Initialize { .. } => "initialize",
            HelperAction::DistributeGauges => "distribute_gauges",
        }
    }
}

pub(crate) fn entry(
    contracts: &ProtocolAddresses,
    account: ContractAccount,
    module: &str,
    function: &str,
) -> Result<FunctionId, ActionError> {
    contracts
        .function(account, module, function)
        .ok_or(ActionError::ConfigMissing(account))?
        .map_err(ActionError::from)
}

fn payload(function: FunctionId, values: &[MoveValue]) -> Result<CallPayload, ActionError> {
    Ok(CallPayload::from_values(function, values)?)
}

pub fn gauge_commit(
    contracts: &ProtocolAddresses,
    pool: &str,
    position: &str,
) -> Result<Command, ActionError> {
    gauge_position("gauge_commit", contracts, pool, position)
}

pub fn gauge_uncommit(
    contracts: &ProtocolAddresses,
    pool: &str,
    position: &str,
) -> Result<Command, ActionError> {
    gauge_position("gauge_uncommit", contracts, pool, position)
}

fn gauge_position(
    function: &'static str,
    contracts: &ProtocolAddresses,
    pool: &str,
    position: &str,
) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let position = validate::address("position", position)?;
    let function = entry(contracts, ContractAccount::Tapp, "ve", function)?;
    let payload = payload(
        function,
        &[MoveValue::Address(pool), MoveValue::Address(position)],
    )?;
    Ok(Command::new(format_args!("gauge:{position}"), payload)
        .invalidating(QueryKey::new("gauge-earned").with(pool))
        .invalidating(QueryKey::new("claimable").with(pool)))
}

/// Collect trading fees of a position through the router.
pub fn claim_fees(
    contracts: &ProtocolAddresses,
    pool: &str,
    position: &str,
) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let position = validate::address("position", position)?;
    let function = entry(contracts, ContractAccount::Tapp, "router", "claim_fees")?;
    let payload = payload(
        function,
        &[MoveValue::Bytes(blobs::claim_fees(&pool, &position))],
    )?;
    Ok(Command::new(format_args!("claim-fees:{position}"), payload)
        .invalidating(QueryKey::new("claimable").with(pool)))
}

/// Claim gauge emissions of one committed position.
pub fn claim_rewards(
    contracts: &ProtocolAddresses,
    pool: &str,
    position: &str,
) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let position = validate::address("position", position)?;
    let function = entry(contracts, ContractAccount::Vetapp, "voter", "claim_rewards")?;
    let payload = payload(
        function,
        &[
            MoveValue::AddressVector(vec![pool]),
            MoveValue::AddressVector(vec![position]),
        ],
    )?;
    Ok(Command::new(format_args!("claim-rewards:{position}"), payload)
        .invalidating(QueryKey::new("gauge-earned").with(pool))
        .invalidating(QueryKey::new("fa-balance")))
}

/// Split a lock's voting power across pools. Pools and weights pair up by
/// position.
pub fn vote<P: AsRef<str>, W: AsRef<str>>(
    contracts: &ProtocolAddresses,
    token: &str,
    pools: &[P],
    weights: &[W],
) -> Result<Command, ActionError> {
    let token = validate::address("token", token)?;
    if pools.is_empty() {
        return Err(ActionError::Missing { field: "pools" });
    }
    if pools.len() != weights.len() {
        return Err(ActionError::InvalidInput {
            field: "weights",
            reason: format!("{} weights for {} pools", weights.len(), pools.len()),
        });
    }
    let pools = validate::addresses("pools", pools)?;
    let weights = validate::amounts("weights", weights)?;
    let function = entry(contracts, ContractAccount::Vetapp, "voter", "vote")?;

    let mut command = Command::new(
        format_args!("vote:{token}"),
        payload(
            function,
            &[
                MoveValue::Address(token),
                MoveValue::AddressVector(pools.clone()),
                MoveValue::U64Vector(weights),
            ],
        )?,
    )
    .invalidating(QueryKey::new("pool-votes").with(token))
    .invalidating(QueryKey::new("lock-vote-status").with(token));
    for pool in pools {
        command = command.invalidating(QueryKey::new("voter-weight").with(pool));
    }
    Ok(command)
}

/// Lock `value` base units for `lock_duration` seconds.
pub fn create_lock(
    contracts: &ProtocolAddresses,
    value: &str,
    lock_duration: &str,
) -> Result<Command, ActionError> {
    let value = validate::amount("value", value)?;
    let lock_duration = validate::amount("lock_duration", lock_duration)?;
    let function = entry(
        contracts,
        ContractAccount::VeTappHelper,
        "helper_ve",
        "create_lock",
    )?;
    let payload = payload(
        function,
        &[MoveValue::U64(value), MoveValue::U64(lock_duration)],
    )?;
    Ok(Command::new("create-lock", payload)
        .invalidating(QueryKey::new("lock-info"))
        .invalidating(QueryKey::new("voting-power"))
        .invalidating(QueryKey::new("fa-balance")))
}

pub fn increase_unlock_time(
    contracts: &ProtocolAddresses,
    token: &str,
    lock_duration: &str,
) -> Result<Command, ActionError> {
    let token = validate::address("token", token)?;
    let lock_duration = validate::amount("lock_duration", lock_duration)?;
    let function = entry(
        contracts,
        ContractAccount::Vetapp,
        "vetapp",
        "increase_unlock_time",
    )?;
    let payload = payload(
        function,
        &[MoveValue::Address(token), MoveValue::U64(lock_duration)],
    )?;
    Ok(Command::new(format_args!("increase-unlock:{token}"), payload)
        .invalidating(QueryKey::new("lock-info").with(token))
        .invalidating(QueryKey::new("voting-power").with(token)))
}

/// Add `amount` of `token` as a bribe on `pool`.
pub fn distribute_bribes(
    contracts: &ProtocolAddresses,
    pool: &str,
    token: &str,
    amount: &str,
) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let token = validate::address("token", token)?;
    let amount = validate::amount("amount", amount)?;
    let function = entry(
        contracts,
        ContractAccount::Vetapp,
        "voter",
        "distribute_bribes",
    )?;
    let payload = payload(
        function,
        &[
            MoveValue::AddressVector(vec![pool]),
            MoveValue::AddressVector(vec![token]),
            MoveValue::U64Vector(vec![amount]),
        ],
    )?;
    Ok(Command::new(format_args!("bribe:{pool}"), payload)
        .invalidating(QueryKey::new("fa-balance")))
}

/// Migrate the listed pools with `helper_ve::run_op`.
pub fn migrate_pools(
    contracts: &ProtocolAddresses,
    pools: &[AccountAddress],
) -> Result<Command, ActionError> {
    if pools.is_empty() {
        return Err(ActionError::Missing { field: "pools" });
    }
    let function = entry(contracts, ContractAccount::VeTappHelper, "helper_ve", "run_op")?;
    let payload = payload(function, &[MoveValue::Bytes(blobs::migrate_pools(pools))])?;
    Ok(Command::new("run-op", payload).invalidating(QueryKey::new("helper-ve-tapp-pools")))
}

/// Fixed-size test swap through the router.
pub fn swap(
    contracts: &ProtocolAddresses,
    pool: &str,
    kind: PoolKind,
) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let function = entry(contracts, ContractAccount::Tapp, "router", "swap")?;
    let payload = payload(function, &[MoveValue::Bytes(blobs::swap(&pool, kind))])?;
    Ok(Command::new(format_args!("swap:{pool}"), payload)
        .invalidating(QueryKey::new("fa-balance"))
        .invalidating(QueryKey::new("claimable").with(pool)))
}

pub fn add_liquidity(contracts: &ProtocolAddresses, pool: &str) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let function = entry(contracts, ContractAccount::Vetapp, "helper_ve", "add_liq")?;
    let payload = payload(function, &[MoveValue::Address(pool)])?;
    Ok(Command::new(format_args!("add-liquidity:{pool}"), payload)
        .invalidating(QueryKey::new("claimable").with(pool))
        .invalidating(QueryKey::new("fa-balance")))
}

/// Run the helper's canned swaps against `pool`.
pub fn swaps_pool(contracts: &ProtocolAddresses, pool: &str) -> Result<Command, ActionError> {
    let pool = validate::address("pool", pool)?;
    let function = entry(contracts, ContractAccount::Vetapp, "helper_ve", "swaps_pool")?;
    let payload = payload(function, &[MoveValue::Address(pool)])?;
    Ok(Command::new(format_args!("swaps-pool:{pool}"), payload)
        .invalidating(QueryKey::new("claimable").with(pool))
        .invalidating(QueryKey::new("fa-balance")))
}

pub fn mint_tapp(contracts: &ProtocolAddresses) -> Result<Command, ActionError> {
    let function = entry(contracts, ContractAccount::Vetapp, "helper_ve", "mint_tapp")?;
    Ok(Command::new("mint-tapp", CallPayload::new(function, Vec::new()))
        .invalidating(QueryKey::new("fa-balance")))
}

/// Roll the minter into the next epoch.
pub fn update_period(contracts: &ProtocolAddresses) -> Result<Command, ActionError> {
    let function = entry(contracts, ContractAccount::Vetapp, "minter", "update_period")?;
    Ok(Command::new("update-period", CallPayload::new(function, Vec::new()))
        .invalidating(QueryKey::new("epoch")))
}

pub fn faucet_quick_mint() -> Result<Command, ActionError> {
    let function: FunctionId = FAUCET_QUICK_MINT.parse()?;
    let payload = payload(function, &[MoveValue::U64(FAUCET_QUICK_MINT_AMOUNT)])?;
    Ok(Command::new("faucet", payload).invalidating(QueryKey::new("fa-balance")))
}

pub fn helper_action(
    contracts: &ProtocolAddresses,
    action: HelperAction,
) -> Result<Command, ActionError> {
    let function = entry(
        contracts,
        ContractAccount::VeTappHelper,
        "helper_ve",
        action.function_name(),
    )?;
    let args = match action {
        HelperAction::Initialize { test } => vec![MoveValue::Bool(test)],
        HelperAction::DistributeGauges => Vec::new(),
    };
    let command = Command::new(
        format_args!("helper:{}", action.function_name()),
        payload(function, &args)?,
    )
    .invalidating(QueryKey::new("epoch"));
    Ok(match action {
        HelperAction::DistributeGauges => command
            .invalidating(QueryKey::new("gauge-left"))
            .invalidating(QueryKey::new("gauge-reward-per-token")),
        HelperAction::Initialize { .. } => command,
    })
}

#[cfg(test)]
mod tests {
    use vetapp_core::{encode_address, encode_arguments};

    use super::*;

    fn contracts() -> ProtocolAddresses {
        let mut contracts = ProtocolAddresses::default();
        for (account, address) in [
            (ContractAccount::Tapp, "0xa"),
            (ContractAccount::Vetapp, "0xb"),
            (ContractAccount::VeTappHelper, "0xc"),
        ] {
            contracts.set(account, Some(encode_address(address).unwrap()));
        }
        contracts
    }

    fn addr(text: &str) -> AccountAddress {
        encode_address(text).unwrap()
    }

    #[test]
    fn vote_encodes_pools_and_weights_in_order() {
        let command = vote(&contracts(), "0x77", &["0x1", "0x2"], &["10", "20"]).unwrap();
        let payload = command.payload();

        assert_eq!(payload.function().to_string(), format!("{}::voter::vote", addr("0xb")));
        assert_eq!(
            payload.args(),
            encode_arguments(&[
                MoveValue::Address(addr("0x77")),
                MoveValue::AddressVector(vec![addr("0x1"), addr("0x2")]),
                MoveValue::U64Vector(vec![10, 20]),
            ])
            .unwrap()
            .as_slice()
        );
        assert!(command
            .invalidates()
            .contains(&QueryKey::new("voter-weight").with(addr("0x2"))));
    }

    #[test]
    fn vote_rejects_bad_weights() {
        let err = vote(&contracts(), "0x77", &["0x1", "0x2"], &["10", "2x"]).unwrap_err();
        assert!(matches!(err, ActionError::InvalidAmount { field: "weights", .. }));

        let err = vote(&contracts(), "0x77", &["0x1", "0x2"], &["10"]).unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput { field: "weights", .. }));
    }

    #[test]
    fn unconfigured_owner_is_config_missing() {
        let err = claim_rewards(&ProtocolAddresses::default(), "0x1", "0x2").unwrap_err();
        assert!(matches!(err, ActionError::ConfigMissing(ContractAccount::Vetapp)));
    }

    #[test]
    fn validation_runs_before_config_lookup() {
        let err = gauge_commit(&ProtocolAddresses::default(), "pool?", "0x2").unwrap_err();
        assert!(matches!(err, ActionError::InvalidAddress { field: "pool", .. }));
    }

    #[test]
    fn distribute_bribes_wraps_each_argument_in_a_vector() {
        let command = distribute_bribes(&contracts(), "0x1", "0xfa", "500").unwrap();
        assert_eq!(
            command.payload().args(),
            encode_arguments(&[
                MoveValue::AddressVector(vec![addr("0x1")]),
                MoveValue::AddressVector(vec![addr("0xfa")]),
                MoveValue::U64Vector(vec![500]),
            ])
            .unwrap()
            .as_slice()
        );
    }

    #[test]
    fn claim_fees_sends_one_byte_vector() {
        let command = claim_fees(&contracts(), "0x1", "0x2").unwrap();
        let args = command.payload().args();
        assert_eq!(args.len(), 1);
        // uleb128(64) then both addresses
        assert_eq!(args[0][0], 64);
        assert_eq!(args[0].len(), 65);
        assert_eq!(
            command.payload().function().to_string(),
            format!("{}::router::claim_fees", addr("0xa"))
        );
    }

    #[test]
    fn faucet_and_helper_targets() {
        let faucet = faucet_quick_mint().unwrap();
        assert_eq!(faucet.payload().function().to_string(), FAUCET_QUICK_MINT);
        assert_eq!(
            faucet.payload().args()[0],
            FAUCET_QUICK_MINT_AMOUNT.to_le_bytes().to_vec()
        );

        let init = helper_action(&contracts(), HelperAction::Initialize { test: true }).unwrap();
        assert_eq!(
            init.payload().function().to_string(),
            format!("{}::helper_ve::initialize", addr("0xc"))
        );
        assert_eq!(init.payload().args(), &[vec![1u8]]);
        assert_eq!(init.control(), "helper:initialize");
    }

    #[test]
    fn migrate_needs_pools() {
        let err = migrate_pools(&contracts(), &[]).unwrap_err();
        assert!(matches!(err, ActionError::Missing { field: "pools" }));
    }
}
