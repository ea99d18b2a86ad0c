use std::fmt;

use serde::{Deserialize, Serialize};

/// Pool family, decoded from the on-chain hook type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolKind {
    Amm,
    Clmm,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown pool hook type {0}")]
pub struct UnknownPoolKind(pub u8);

impl PoolKind {
    pub const fn hook_type(self) -> u8 {
        match self {
            PoolKind::Amm => 2,
            PoolKind::Clmm => 3,
            PoolKind::Stable => 4,
        }
    }

    /// Move module implementing this pool family.
    pub const fn module_name(self) -> &'static str {
        match self {
            PoolKind::Amm => "amm",
            PoolKind::Clmm => "clmm",
            PoolKind::Stable => "stable",
        }
    }
}

impl TryFrom<u8> for PoolKind {
    type Error = UnknownPoolKind;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            2 => Ok(PoolKind::Amm),
            3 => Ok(PoolKind::Clmm),
            4 => Ok(PoolKind::Stable),
            other => Err(UnknownPoolKind(other)),
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolKind::Amm => "AMM",
            PoolKind::Clmm => "CLMM",
            PoolKind::Stable => "Stable",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_codes() {
        for kind in [PoolKind::Amm, PoolKind::Clmm, PoolKind::Stable] {
            assert_eq!(PoolKind::try_from(kind.hook_type()), Ok(kind));
        }
        assert_eq!(PoolKind::try_from(1), Err(UnknownPoolKind(1)));
        assert_eq!(PoolKind::try_from(5), Err(UnknownPoolKind(5)));
    }
}
