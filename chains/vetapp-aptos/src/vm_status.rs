/// Extract the Move abort code from a VM status string.
///
/// Handles `Move abort in 0x1::coin: EINSUFFICIENT_BALANCE(0x10006): ...`,
/// `Move abort in 0x1::coin: 0x10006` and `Move abort ... code 65542`.
pub fn parse_abort_code(vm_status: &str) -> Option<u64> {
    if !vm_status.starts_with("Move abort") {
        return None;
    }
    if let Some(start) = vm_status.find("(0x") {
        let rest = &vm_status[start + 3..];
        let end = rest.find(')')?;
        return u64::from_str_radix(&rest[..end], 16).ok();
    }
    if let Some(start) = vm_status.find("code ") {
        let digits: String = vm_status[start + 5..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        return digits.parse().ok();
    }
    let last = vm_status.rsplit(": ").next()?.trim();
    u64::from_str_radix(last.strip_prefix("0x")?, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_abort() {
        assert_eq!(
            parse_abort_code(
                "Move abort in 0x1::coin: EINSUFFICIENT_BALANCE(0x10006): Not enough coins"
            ),
            Some(0x10006)
        );
    }

    #[test]
    fn bare_hex_and_decimal_aborts() {
        assert_eq!(
            parse_abort_code("Move abort in 0xabc::voter: 0x65"),
            Some(0x65)
        );
        assert_eq!(parse_abort_code("Move abort: code 12"), Some(12));
    }

    #[test]
    fn non_abort_statuses() {
        assert_eq!(parse_abort_code("Executed successfully"), None);
        assert_eq!(parse_abort_code("Out of gas"), None);
    }
}
