const DECIMALS_8: u128 = 100_000_000;

/// Render an 8-decimal on-chain integer with at most eight fraction digits
/// and no trailing zeros: `123456789` becomes `1.23456789`, `150000000`
/// becomes `1.5` and whole amounts carry no fraction at all.
pub fn format_units_8(raw: u128) -> String {
    let whole = raw / DECIMALS_8;
    let fraction = raw % DECIMALS_8;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:08}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
