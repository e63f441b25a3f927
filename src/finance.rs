//! Installment pricing.
//!
//! Two independent figures are shown to the user:
//!
//! | Figure | Model |
//! |--------|-------|
//! | Monthly payment | Amortizing annuity at `rate / 12` per month, rounded to a whole unit |
//! | Service fee | Simple interest `amount * rate * term / 12`, not rounded |
//!
//! The fee is not derived from the payment schedule and the two are never
//! reconciled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nominal annual rate of the product.
pub const DEFAULT_RATE: f64 = 0.20;

/// Repayment duration, restricted to the product's fixed schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Term {
    Three,
    Six,
    Nine,
    Twelve,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported term of {0} months, expected one of 3, 6, 9 or 12")]
pub struct UnsupportedTerm(pub u32);

impl Term {
    pub const ALL: [Term; 4] = [Term::Three, Term::Six, Term::Nine, Term::Twelve];

    pub fn months(self) -> u32 {
        match self {
            Term::Three => 3,
            Term::Six => 6,
            Term::Nine => 9,
            Term::Twelve => 12,
        }
    }

    /// Next term in the schedule, wrapping around.
    pub fn next(self) -> Term {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Previous term in the schedule, wrapping around.
    pub fn previous(self) -> Term {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl TryFrom<u32> for Term {
    type Error = UnsupportedTerm;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        match months {
            3 => Ok(Term::Three),
            6 => Ok(Term::Six),
            9 => Ok(Term::Nine),
            12 => Ok(Term::Twelve),
            other => Err(UnsupportedTerm(other)),
        }
    }
}

impl From<Term> for u32 {
    fn from(term: Term) -> Self {
        term.months()
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.months())
    }
}

/// Monthly annuity payment, rounded to the nearest whole currency unit.
///
/// `f64::round` breaks ties away from zero, which is the rounding the
/// product quotes with.
pub fn compute_monthly_payment(amount: f64, term: Term, annual_rate: f64) -> f64 {
    let monthly_rate = annual_rate / 12.0;
    let n = term.months() as i32;
    let growth = (1.0 + monthly_rate).powi(n);
    if growth == 1.0 {
        // Rate too small to register: the loan is simply split evenly.
        return (amount / n as f64).round();
    }
    let payment = amount * (monthly_rate * growth) / (growth - 1.0);
    payment.round()
}

/// Total interest over the one-year reference period, pro-rated by term.
pub fn compute_annual_service_fee(amount: f64, term: Term, annual_rate: f64) -> f64 {
    amount * annual_rate * (term.months() as f64 / 12.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // compute_monthly_payment tests
    // =========================================================================

    #[test]
    fn monthly_payment_for_full_year_ceiling() {
        let result = compute_monthly_payment(100_000.0, Term::Twelve, DEFAULT_RATE);

        assert_eq!(result, 9263.0);
    }

    #[test]
    fn monthly_payment_for_short_term() {
        // 40000 * r(1+r)^3 / ((1+r)^3 - 1) with r = 1/60 is 13780.2...
        let result = compute_monthly_payment(40_000.0, Term::Three, DEFAULT_RATE);

        assert_eq!(result, 13780.0);
    }

    #[test]
    fn monthly_payment_is_whole_number() {
        let result = compute_monthly_payment(12_345.0, Term::Nine, DEFAULT_RATE);

        assert_eq!(result, result.trunc());
    }

    #[test]
    fn monthly_payment_is_positive_across_valid_range() {
        for term in Term::ALL {
            for amount in (1_000..=100_000).step_by(1_000) {
                let result = compute_monthly_payment(amount as f64, term, DEFAULT_RATE);

                assert!(result > 0.0, "payment for {amount} over {term} was {result}");
            }
        }
    }

    #[test]
    fn monthly_payment_is_non_decreasing_in_amount() {
        for term in Term::ALL {
            let mut previous = 0.0;
            for amount in (1_000..=100_000).step_by(250) {
                let result = compute_monthly_payment(amount as f64, term, DEFAULT_RATE);

                assert!(result >= previous, "payment dropped at {amount} over {term}");
                previous = result;
            }
        }
    }

    #[test]
    fn monthly_payment_with_negligible_rate_splits_evenly() {
        let result = compute_monthly_payment(100_000.0, Term::Twelve, 1e-17);

        assert!(result.is_finite());
        assert_eq!(result, 8_333.0);
    }

    #[test]
    fn monthly_payment_tolerates_fractional_amounts() {
        let result = compute_monthly_payment(0.5, Term::Twelve, DEFAULT_RATE);

        assert!(result.is_finite());
    }

    // =========================================================================
    // compute_annual_service_fee tests
    // =========================================================================

    #[test]
    fn service_fee_for_full_year_is_rate_times_amount() {
        let result = compute_annual_service_fee(100_000.0, Term::Twelve, DEFAULT_RATE);

        assert_eq!(result, 100_000.0 * 0.20);
    }

    #[test]
    fn service_fee_is_pro_rated_by_term() {
        let result = compute_annual_service_fee(40_000.0, Term::Three, DEFAULT_RATE);

        assert!((result - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn service_fee_is_not_rounded() {
        let result = compute_annual_service_fee(1_001.0, Term::Nine, DEFAULT_RATE);

        assert!((result - 150.15).abs() < 1e-9);
    }

    // =========================================================================
    // Term tests
    // =========================================================================

    #[test]
    fn term_rejects_months_outside_schedule() {
        assert_eq!(Term::try_from(0), Err(UnsupportedTerm(0)));
        assert_eq!(Term::try_from(24), Err(UnsupportedTerm(24)));
    }

    #[test]
    fn term_cycles_through_schedule() {
        assert_eq!(Term::Twelve.next(), Term::Three);
        assert_eq!(Term::Three.previous(), Term::Twelve);
        assert_eq!(Term::Six.next(), Term::Nine);
    }
}
