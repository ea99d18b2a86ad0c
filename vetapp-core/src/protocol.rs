use serde::{Deserialize, Serialize};

use crate::{AccountAddress, CodecError, FunctionId, Identifier};

/// Deployed contract accounts. Any of them may be unconfigured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAddresses {
    pub tapp: Option<AccountAddress>,
    pub vetapp: Option<AccountAddress>,
    pub ve_tapp_helper: Option<AccountAddress>,
    pub gauge: Option<AccountAddress>,
    pub amm: Option<AccountAddress>,
    pub clmm: Option<AccountAddress>,
    pub stable: Option<AccountAddress>,
}

/// Names one of the [`ProtocolAddresses`] slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAccount {
    Tapp,
    Vetapp,
    VeTappHelper,
    Gauge,
    Amm,
    Clmm,
    Stable,
}

impl ContractAccount {
    pub fn name(self) -> &'static str {
        match self {
            ContractAccount::Tapp => "tapp",
            ContractAccount::Vetapp => "vetapp",
            ContractAccount::VeTappHelper => "ve_tapp_helper",
            ContractAccount::Gauge => "gauge",
            ContractAccount::Amm => "amm",
            ContractAccount::Clmm => "clmm",
            ContractAccount::Stable => "stable",
        }
    }
}

impl std::fmt::Display for ContractAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ProtocolAddresses {
    pub fn get(&self, account: ContractAccount) -> Option<AccountAddress> {
        match account {
            ContractAccount::Tapp => self.tapp,
            ContractAccount::Vetapp => self.vetapp,
            ContractAccount::VeTappHelper => self.ve_tapp_helper,
            ContractAccount::Gauge => self.gauge,
            ContractAccount::Amm => self.amm,
            ContractAccount::Clmm => self.clmm,
            ContractAccount::Stable => self.stable,
        }
    }

    pub fn set(&mut self, account: ContractAccount, address: Option<AccountAddress>) {
        let slot = match account {
            ContractAccount::Tapp => &mut self.tapp,
            ContractAccount::Vetapp => &mut self.vetapp,
            ContractAccount::VeTappHelper => &mut self.ve_tapp_helper,
            ContractAccount::Gauge => &mut self.gauge,
            ContractAccount::Amm => &mut self.amm,
            ContractAccount::Clmm => &mut self.clmm,
            ContractAccount::Stable => &mut self.stable,
        };
        *slot = address;
    }

    /// `<account>::module::function`, or `None` when the account is not
    /// configured.
    pub fn function(
        &self,
        account: ContractAccount,
        module: &str,
        function: &str,
    ) -> Option<Result<FunctionId, CodecError>> {
        let address = self.get(account)?;
        Some(
            Identifier::new(module)
                .and_then(|m| Identifier::new(function).map(|f| FunctionId::new(address, m, f))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_address;

    #[test]
    fn unconfigured_accounts_yield_none() {
        let mut addresses = ProtocolAddresses::default();
        assert!(addresses
            .function(ContractAccount::Vetapp, "voter", "vote")
            .is_none());

        addresses.set(ContractAccount::Vetapp, Some(encode_address("0xbeef").unwrap()));
        let id = addresses
            .function(ContractAccount::Vetapp, "voter", "vote")
            .unwrap()
            .unwrap();
        assert_eq!(id.address(), encode_address("0xbeef").unwrap());
    }
}
