//! Net claim amount derived from the damage assessment figures.
//!
//! | Input                  | Meaning |
//! |------------------------|---------|
//! | estimated repair cost  | cost to repair the damaged property |
//! | replacement cost       | cost to replace it outright |
//! | depreciation           | deduction for age and wear |
//!
//! The claim base is the cheaper of repair and replacement when both are
//! known (positive), otherwise whichever one is positive, otherwise zero.
//! Depreciation is subtracted from the base and the result floors at zero.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use survey_core::calculations::net_claim;
//!
//! let claim = net_claim(dec!(1000), dec!(1200), dec!(200));
//!
//! assert_eq!(claim.amount, dec!(800.00));
//! assert_eq!(claim.display(), "800.00");
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, min, parse_amount, round_half_up};

/// Result of the net claim calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetClaim {
    /// The cheaper of repair and replacement, per the positivity rules.
    pub base: Decimal,
    /// `max(0, base - depreciation)`, rounded to two places.
    pub amount: Decimal,
}

impl NetClaim {
    /// Two-fraction-digit rendering written into the output field.
    pub fn display(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Whether the output field should carry the "calculated" flag.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl fmt::Display for NetClaim {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:.2}", self.amount)
    }
}

/// Chooses the claim base from repair and replacement cost.
pub fn claim_base(
    repair: Decimal,
    replacement: Decimal,
) -> Decimal {
    match (repair > Decimal::ZERO, replacement > Decimal::ZERO) {
        (true, true) => min(repair, replacement),
        (true, false) => repair,
        (false, true) => replacement,
        (false, false) => Decimal::ZERO,
    }
}

/// Computes the net claim amount.
pub fn net_claim(
    repair: Decimal,
    replacement: Decimal,
    depreciation: Decimal,
) -> NetClaim {
    let base = claim_base(repair, replacement);
    let amount = round_half_up(max(Decimal::ZERO, base - depreciation));

    NetClaim { base, amount }
}

/// Computes the net claim amount from raw field text.
///
/// Absent or non-numeric inputs count as zero.
pub fn net_claim_from_inputs(
    repair: &str,
    replacement: &str,
    depreciation: &str,
) -> NetClaim {
    net_claim(
        parse_amount(repair),
        parse_amount(replacement),
        parse_amount(depreciation),
    )
}
