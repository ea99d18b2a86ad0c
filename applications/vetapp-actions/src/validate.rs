//! Free-text form fields to typed values.
//!
//! Fields are trimmed first. Empty fields are [`ActionError::Missing`].

use vetapp_core::{encode_address, parse_digits, AccountAddress};

use crate::ActionError;

fn required<'a>(field: &'static str, text: &'a str) -> Result<&'a str, ActionError> {
    match text.trim() {
        "" => Err(ActionError::Missing { field }),
        text => Ok(text),
    }
}

/// A hex account address, `0x` optional.
pub fn address(field: &'static str, text: &str) -> Result<AccountAddress, ActionError> {
    encode_address(required(field, text)?)
        .map_err(|source| ActionError::InvalidAddress { field, source })
}

/// Decimal digits only, no sign, no separators, at most `u64::MAX`.
pub fn amount(field: &'static str, text: &str) -> Result<u64, ActionError> {
    let text = required(field, text)?;
    parse_digits(text).ok_or_else(|| ActionError::InvalidAmount {
        field,
        value: text.to_owned(),
    })
}

pub fn addresses<S: AsRef<str>>(
    field: &'static str,
    values: &[S],
) -> Result<Vec<AccountAddress>, ActionError> {
    values.iter().map(|v| address(field, v.as_ref())).collect()
}

pub fn amounts<S: AsRef<str>>(field: &'static str, values: &[S]) -> Result<Vec<u64>, ActionError> {
    values.iter().map(|v| amount(field, v.as_ref())).collect()
}
