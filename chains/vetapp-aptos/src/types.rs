//! JSON shapes returned by the fullnode REST API. 64-bit integers arrive as
//! decimal strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
}

#[derive(Debug, Deserialize)]
pub struct AccountData {
    pub sequence_number: String,
}

#[derive(Debug, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// A transaction as returned by `by_hash` and `simulate`.
#[derive(Debug, Deserialize)]
pub struct TransactionView {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub gas_unit_price: Option<String>,
    #[serde(default)]
    pub max_gas_amount: Option<String>,
}

impl TransactionView {
    pub fn is_pending(&self) -> bool {
        self.kind == "pending_transaction"
    }
}

#[derive(Debug, Serialize)]
pub struct ViewRequest {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
}

pub fn parse_u64(field: &str, value: Option<&str>) -> Result<u64, String> {
    let value = value.ok_or_else(|| format!("missing {field}"))?;
    value
        .parse()
        .map_err(|_| format!("{field} is not a u64: {value:?}"))
}
