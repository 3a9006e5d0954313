use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The move of a price relative to a reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    /// `current - previous`, at full precision.
    pub absolute: Decimal,
    /// `absolute / previous * 100`, at full precision.
    pub percentage: Decimal,
    pub is_positive: bool,
    pub is_neutral: bool,
}

impl PriceChange {
    /// The result reported when either price is missing or zero.
    pub const NEUTRAL: PriceChange = PriceChange {
        absolute: Decimal::ZERO,
        percentage: Decimal::ZERO,
        is_positive: true,
        is_neutral: true,
    };

    pub fn is_negative(&self) -> bool {
        !self.is_positive
    }
}

impl Default for PriceChange {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Rounds a change figure to two decimals, halves away from zero.
pub fn round_change(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the change from `previous` to `current`.
///
/// A missing or zero price on either side yields [`PriceChange::NEUTRAL`]. A zero
/// previous close is therefore reported exactly like "no data"; callers that need
/// to tell the two apart must look at the raw inputs.
pub fn price_change(current: Option<Decimal>, previous: Option<Decimal>) -> PriceChange {
    let (current, previous) = match (current, previous) {
        (Some(c), Some(p)) if !c.is_zero() && !p.is_zero() => (c, p),
        _ => return PriceChange::NEUTRAL,
    };

    let Some(absolute) = current.checked_sub(previous) else {
        return PriceChange::NEUTRAL;
    };
    let Some(percentage) = absolute
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    else {
        return PriceChange::NEUTRAL;
    };

    PriceChange {
        absolute,
        percentage,
        is_positive: absolute >= Decimal::ZERO,
        is_neutral: absolute.is_zero(),
    }
}
