use std::fmt;

use alloy_primitives::U256;

/// Decimals of the native currency: 1 ether = 10^18 wei.
pub const ETHER_DECIMALS: u8 = 18;

/// An integer amount of base units together with its decimal scaling.
///
/// `Display` renders the exact decimal value (no floating point), with
/// trailing fractional zeros removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Amount { raw, decimals }
    }

    /// A wei amount scaled to ether.
    pub fn from_wei(wei: U256) -> Self {
        Amount::new(wei, ETHER_DECIMALS)
    }

    pub fn to_decimal_string(&self) -> String {
        format_units(self.raw, self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Divides `value` by 10^`decimals` and renders the exact result.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);

    if decimals == 0 {
        return digits;
    }

    // Left-pad so there is at least one integer digit.
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');

    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}
