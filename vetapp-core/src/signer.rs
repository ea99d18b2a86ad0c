use std::{fmt, sync::Arc};

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use sha3::{Digest, Sha3_256};
use tracing::debug;

use crate::{
    AccountAddress, ChainCommunicationError, ChainResult, RawTransaction, SignedTransaction,
    TransactionAuthenticator,
};

/// Single-key Ed25519 authentication scheme byte used in address derivation.
const ED25519_SCHEME: u8 = 0x00;

/// Failure reported by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("user rejected the request")]
    Rejected,
    #[error("wallet error: {0}")]
    Failed(String),
}

/// A browser wallet or any other out-of-process signer.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Ask the wallet to sign `txn`. Returns the Ed25519 signature over the
    /// transaction's signing message.
    async fn sign_transaction(&self, txn: &RawTransaction) -> Result<[u8; 64], WalletError>;
}

/// An account whose signatures come from a wallet.
#[derive(Clone)]
pub struct DelegatedSigner {
    pub address: AccountAddress,
    pub public_key: [u8; 32],
    pub wallet: Arc<dyn WalletAdapter>,
}

impl fmt::Debug for DelegatedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    #[error("private key must be 32 bytes of hex")]
    InvalidPrivateKey,
}

/// An account whose Ed25519 key is held by this process.
///
/// The key never leaves this type: `Debug` shows only the derived address and
/// there is no `Serialize` impl.
#[derive(Clone)]
pub struct HeldKeySigner {
    key: SigningKey,
    address: AccountAddress,
}

impl HeldKeySigner {
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(secret);
        let address = account_address_for(&key.verifying_key().to_bytes());
        Self { key, address }
    }

    /// Parse a hex private key. Accepts an optional `ed25519-priv-` prefix
    /// and an optional `0x`.
    pub fn from_hex(text: &str) -> Result<Self, SignerError> {
        let text = text.trim();
        let text = text.strip_prefix("ed25519-priv-").unwrap_or(text);
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let mut secret = [0u8; 32];
        hex::decode_to_slice(digits, &mut secret).map_err(|_| SignerError::InvalidPrivateKey)?;
        Ok(Self::from_bytes(&secret))
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    pub fn sign_message(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

impl fmt::Debug for HeldKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeldKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Account address of a single-key Ed25519 account.
pub fn account_address_for(public_key: &[u8; 32]) -> AccountAddress {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key);
    hasher.update([ED25519_SCHEME]);
    AccountAddress::new(hasher.finalize().into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    Delegated,
    HeldKey,
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignerKind::Delegated => "delegated",
            SignerKind::HeldKey => "held_key",
        })
    }
}

/// Who signs a transaction.
#[derive(Debug, Clone)]
pub enum SignerIdentity {
    Delegated(DelegatedSigner),
    HeldKey(HeldKeySigner),
}

impl SignerIdentity {
    pub fn address(&self) -> AccountAddress {
        match self {
            SignerIdentity::Delegated(signer) => signer.address,
            SignerIdentity::HeldKey(signer) => signer.address(),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        match self {
            SignerIdentity::Delegated(signer) => signer.public_key,
            SignerIdentity::HeldKey(signer) => signer.public_key(),
        }
    }

    pub fn kind(&self) -> SignerKind {
        match self {
            SignerIdentity::Delegated(_) => SignerKind::Delegated,
            SignerIdentity::HeldKey(_) => SignerKind::HeldKey,
        }
    }

    /// Sign locally or hand the transaction to the wallet.
    pub async fn sign_transaction(&self, txn: RawTransaction) -> ChainResult<SignedTransaction> {
        let signature = match self {
            SignerIdentity::HeldKey(signer) => {
                let message = txn
                    .signing_message()
                    .map_err(|e| ChainCommunicationError::SignError(e.to_string()))?;
                signer.sign_message(&message)
            }
            SignerIdentity::Delegated(signer) => {
                debug!(address = %signer.address, "requesting wallet signature");
                signer
                    .wallet
                    .sign_transaction(&txn)
                    .await
                    .map_err(|e| match e {
                        WalletError::Rejected => ChainCommunicationError::UserRejected,
                        WalletError::Failed(reason) => ChainCommunicationError::SignError(reason),
                    })?
            }
        };
        Ok(SignedTransaction {
            raw_txn: txn,
            authenticator: TransactionAuthenticator::Ed25519 {
                public_key: self.public_key(),
                signature,
            },
        })
    }
}

impl From<HeldKeySigner> for SignerIdentity {
    fn from(signer: HeldKeySigner) -> Self {
        SignerIdentity::HeldKey(signer)
    }
}

impl From<DelegatedSigner> for SignerIdentity {
    fn from(signer: DelegatedSigner) -> Self {
        SignerIdentity::Delegated(signer)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use mockall::mock;

    use super::*;
    use crate::{CallPayload, EntryFunction, FunctionId, TransactionPayload};

    mock! {
        pub Wallet {}

        #[async_trait]
        impl WalletAdapter for Wallet {
            async fn sign_transaction(&self, txn: &RawTransaction) -> Result<[u8; 64], WalletError>;
        }
    }

    fn raw(sender: AccountAddress) -> RawTransaction {
        let function: FunctionId = "0x1::helper_ve::mint_tapp".parse().unwrap();
        RawTransaction {
            sender,
            sequence_number: 0,
            payload: TransactionPayload(EntryFunction::from(&CallPayload::new(function, vec![]))),
            max_gas_amount: 10,
            gas_unit_price: 100,
            expiration_timestamp_secs: 1,
            chain_id: 4,
        }
    }

    #[test]
    fn debug_never_shows_key_material() {
        let secret = [7u8; 32];
        let signer = HeldKeySigner::from_bytes(&secret);
        let rendered = format!("{:?}", SignerIdentity::from(signer.clone()));
        assert!(rendered.contains(&signer.address().to_string()));
        assert!(!rendered.contains(&hex::encode(secret)));
    }

    #[test]
    fn parses_prefixed_private_keys() {
        let hex_key = hex::encode([9u8; 32]);
        let plain = HeldKeySigner::from_hex(&hex_key).unwrap();
        let prefixed = HeldKeySigner::from_hex(&format!("ed25519-priv-0x{hex_key}")).unwrap();
        assert_eq!(plain.address(), prefixed.address());
        assert_eq!(
            HeldKeySigner::from_hex("0x1234").unwrap_err(),
            SignerError::InvalidPrivateKey
        );
    }

    #[tokio::test]
    async fn held_key_signature_verifies() {
        let signer = HeldKeySigner::from_bytes(&rand::random::<[u8; 32]>());
        let identity = SignerIdentity::from(signer.clone());
        let txn = raw(signer.address());
        let signed = identity.sign_transaction(txn.clone()).await.unwrap();

        let TransactionAuthenticator::Ed25519 {
            public_key,
            signature,
        } = signed.authenticator;
        let key = VerifyingKey::from_bytes(&public_key).unwrap();
        key.verify(
            &txn.signing_message().unwrap(),
            &Signature::from_bytes(&signature),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn wallet_cancellation_is_user_rejected() {
        let mut wallet = MockWallet::new();
        wallet
            .expect_sign_transaction()
            .times(1)
            .returning(|_| Err(WalletError::Rejected));
        let identity = SignerIdentity::Delegated(DelegatedSigner {
            address: AccountAddress::new([1; 32]),
            public_key: [2; 32],
            wallet: Arc::new(wallet),
        });
        let err = identity
            .sign_transaction(raw(identity.address()))
            .await
            .unwrap_err();
        assert!(err.is_user_rejection());
    }
}
