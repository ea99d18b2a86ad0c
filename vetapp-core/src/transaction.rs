use std::time::Duration;

use serde::{ser::SerializeStructVariant, Serialize, Serializer};
use sha3::{Digest, Sha3_256};

use crate::{AccountAddress, CallPayload, CodecError, Identifier, ModuleId, TxHash, TypeTag};

const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";

/// Gas defaults applied when simulation is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasDefaults {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    /// Expiration offset from the build time.
    pub expiration: Duration,
}

impl Default for GasDefaults {
    fn default() -> Self {
        Self {
            max_gas_amount: 200_000,
            gas_unit_price: 100,
            expiration: Duration::from_secs(30),
        }
    }
}

/// Gas parameters reported by simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_unit_price: u64,
    pub max_gas_units: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFunction {
    pub module: ModuleId,
    pub function: Identifier,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<Vec<u8>>,
}

impl From<&CallPayload> for EntryFunction {
    fn from(payload: &CallPayload) -> Self {
        Self {
            module: payload.function().module().clone(),
            function: payload.function().function().clone(),
            ty_args: payload.type_args().to_vec(),
            args: payload.args().to_vec(),
        }
    }
}

/// The only payload shape this system sends: an entry-function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPayload(pub EntryFunction);

impl Serialize for TransactionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // variant 2 of the chain's payload enum
        serializer.serialize_newtype_variant("TransactionPayload", 2, "EntryFunction", &self.0)
    }
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

impl RawTransaction {
    pub fn apply_estimate(&mut self, estimate: &GasEstimate) {
        self.gas_unit_price = estimate.gas_unit_price;
        self.max_gas_amount = estimate.max_gas_units;
    }

    /// The bytes an Ed25519 signer signs.
    pub fn signing_message(&self) -> Result<Vec<u8>, CodecError> {
        let mut message = Sha3_256::digest(RAW_TRANSACTION_SALT).to_vec();
        message.extend(bcs::to_bytes(self)?);
        Ok(message)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum TransactionAuthenticator {
    Ed25519 {
        public_key: [u8; 32],
        signature: [u8; 64],
    },
}

impl std::fmt::Debug for TransactionAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionAuthenticator::Ed25519 {
                public_key,
                signature,
            } => f
                .debug_struct("Ed25519")
                .field("public_key", &hex::encode(public_key))
                .field("signature", &hex::encode(signature))
                .finish(),
        }
    }
}

impl Serialize for TransactionAuthenticator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TransactionAuthenticator::Ed25519 {
                public_key,
                signature,
            } => {
                let mut state =
                    serializer.serialize_struct_variant("TransactionAuthenticator", 0, "Ed25519", 2)?;
                state.serialize_field("public_key", &public_key[..])?;
                state.serialize_field("signature", &signature[..])?;
                state.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    pub fn to_bcs_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bcs::to_bytes(self)?)
    }
}

/// Outcome of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionResult {
    pub hash: TxHash,
    pub success: bool,
    pub vm_status: String,
    pub gas_used: u64,
    /// Move abort code, when the VM status reports one.
    pub abort_code: Option<u64>,
}
