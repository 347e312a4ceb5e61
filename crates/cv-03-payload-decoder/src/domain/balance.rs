//! # Balance Formatting
//!
//! Renders raw integer amounts in network units with an SI prefix, keeping
//! every digit of the input (no rounding, trailing zeros kept).
//!
//! | raw | decimals | unit | shown |
//! |-----|----------|------|-------|
//! | 1 | 12 | WND | 1 pWND |
//! | 1000 | 12 | WND | 1.000 nWND |
//! | 123456000123 | 12 | WND | 123.456000123 mWND |
//! | 15000000000 | 10 | DOT | 1.5000000000 DOT |

use serde::{Deserialize, Serialize};

/// Prefixes from tera (10^12) down to atto (10^-18).
const PREFIXES: [(i32, &str); 11] = [
    (12, "T"),
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (0, ""),
    (-3, "m"),
    (-6, "u"),
    (-9, "n"),
    (-12, "p"),
    (-15, "f"),
    (-18, "a"),
];

const MAX_EXPONENT: i32 = 12;
const MIN_EXPONENT: i32 = -18;

/// A formatted amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Digits with the decimal point placed for `units`.
    pub amount: String,
    /// Unit with SI prefix, e.g. `mDOT`.
    pub units: String,
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.units)
    }
}

/// Format `value` given the network's decimals and unit.
pub fn format_balance(value: u128, decimals: u8, unit: &str) -> Balance {
    if value == 0 {
        return Balance {
            amount: "0".to_string(),
            units: unit.to_string(),
        };
    }

    let digits = value.to_string();
    let len = digits.len() as i32;
    let decimals = i32::from(decimals);

    // Value lies in [10^order, 10^(order+1)) whole units.
    let order = len - 1 - decimals;
    let exponent = (order.div_euclid(3) * 3).clamp(MIN_EXPONENT, MAX_EXPONENT);
    let prefix = PREFIXES
        .iter()
        .find(|(e, _)| *e == exponent)
        .map(|(_, p)| *p)
        .unwrap_or("");

    // Digits after the point once scaled by the prefix.
    let shift = decimals + exponent;
    let amount = if shift <= 0 {
        format!("{digits}{}", "0".repeat(shift.unsigned_abs() as usize))
    } else if shift >= len {
        format!("0.{}{digits}", "0".repeat((shift - len) as usize))
    } else {
        let split = (len - shift) as usize;
        format!("{}.{}", &digits[..split], &digits[split..])
    };

    Balance {
        amount,
        units: format!("{prefix}{unit}"),
    }
}
