//! Routing rule types
//!
//! This module defines the typed, always-valid form of a routing rule. Every
//! value here is built through a constructor that enforces its invariant, so
//! code holding a [`RoutingRule`] never has to re-check percentage sums or
//! amount ordering. Untrusted input arrives as a
//! [`RuleDraft`](crate::io::RuleDraft) and is turned into a rule by
//! [`validate_rule`](crate::core::validate_rule).

use super::channel::{AccountType, PaymentChannel, PaymentMethod, TransactionType};
use super::error::RoutingError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Routing rule identifier
pub type RuleId = String;

/// Required sum of the weights in every tier
pub const FULL_PERCENTAGE: u64 = 100;

/// Channel weight distribution of one tier
///
/// An ordered map from channel to integer weight. Construction rejects empty
/// maps and maps whose weights do not add up to exactly 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percentage {
    weights: BTreeMap<PaymentChannel, u32>,
}

impl Percentage {
    /// Build a percentage map
    ///
    /// # Errors
    ///
    /// - `EmptyPercentage` if `weights` has no entries
    /// - `PercentageSum` if the weights do not sum to exactly 100
    pub fn new(weights: BTreeMap<PaymentChannel, u32>) -> Result<Self, RoutingError> {
        if weights.is_empty() {
            return Err(RoutingError::EmptyPercentage);
        }

        let sum: u64 = weights.values().map(|w| u64::from(*w)).sum();
        if sum != FULL_PERCENTAGE {
            return Err(RoutingError::PercentageSum { sum });
        }

        Ok(Percentage { weights })
    }

    /// Send everything in this tier to a single channel
    pub fn single(channel: PaymentChannel) -> Self {
        Percentage {
            weights: BTreeMap::from([(channel, 100)]),
        }
    }

    pub fn weight(&self, channel: PaymentChannel) -> Option<u32> {
        self.weights.get(&channel).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaymentChannel, u32)> + '_ {
        self.weights.iter().map(|(c, w)| (*c, *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false for a constructed map; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl TryFrom<BTreeMap<PaymentChannel, u32>> for Percentage {
    type Error = RoutingError;

    fn try_from(weights: BTreeMap<PaymentChannel, u32>) -> Result<Self, Self::Error> {
        Percentage::new(weights)
    }
}

/// One priority level within a rule
///
/// The external runtime tries tiers in ascending priority (lower first) until
/// one succeeds. This crate never executes that fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTier {
    priority: Option<u32>,
    percentage: Percentage,
}

impl RoutingTier {
    /// Build a tier
    ///
    /// # Errors
    ///
    /// `InvalidPriority` if `priority` is `Some(0)`
    pub fn new(priority: Option<u32>, percentage: Percentage) -> Result<Self, RoutingError> {
        if priority == Some(0) {
            return Err(RoutingError::InvalidPriority { priority: 0 });
        }
        Ok(RoutingTier {
            priority,
            percentage,
        })
    }

    pub fn priority(&self) -> Option<u32> {
        self.priority
    }

    pub fn percentage(&self) -> &Percentage {
        &self.percentage
    }
}

/// Inclusive amount bounds of a rule
///
/// Both bounds are non-negative and `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: Decimal,
    max: Decimal,
}

impl AmountRange {
    /// Build an amount range
    ///
    /// # Errors
    ///
    /// `InvalidAmountRange` if either bound is negative or `min >= max`
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, RoutingError> {
        if min < Decimal::ZERO || max < Decimal::ZERO || min >= max {
            return Err(RoutingError::InvalidAmountRange { min, max });
        }
        Ok(AmountRange { min, max })
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }
}

/// Inclusive overlap of two optional ranges, `None` meaning unbounded
pub fn ranges_overlap(a: Option<&AmountRange>, b: Option<&AmountRange>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.min <= b.max && b.min <= a.max,
        _ => true,
    }
}

/// A validated routing rule
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRule {
    pub id: RuleId,
    pub title: String,
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
    pub transaction_type: TransactionType,
    /// `None` applies to all account types
    pub account_type: Option<AccountType>,
    /// `None` applies to any amount
    pub amount_range: Option<AmountRange>,
    /// Never empty
    pub tiers: Vec<RoutingTier>,
    pub enable: bool,
    pub created_at: DateTime<Utc>,
}

impl RoutingRule {
    /// Effective priority of each tier: the explicit priority, or the 1-based
    /// position of the tier when none was given
    pub fn effective_priorities(&self) -> impl Iterator<Item = u32> + '_ {
        self.tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| tier.priority.unwrap_or(index as u32 + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn weights(entries: &[(PaymentChannel, u32)]) -> BTreeMap<PaymentChannel, u32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_percentage_accepts_exact_hundred() {
        let p = Percentage::new(weights(&[
            (PaymentChannel::Napas, 60),
            (PaymentChannel::Payoo, 40),
        ]))
        .unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.weight(PaymentChannel::Napas), Some(60));
        assert_eq!(p.weight(PaymentChannel::Baokim), None);
    }

    #[rstest]
    #[case::ninety_nine(&[(PaymentChannel::Napas, 59), (PaymentChannel::Payoo, 40)], 99)]
    #[case::one_hundred_one(&[(PaymentChannel::Napas, 61), (PaymentChannel::Payoo, 40)], 101)]
    #[case::ninety(&[(PaymentChannel::Napas, 60), (PaymentChannel::Payoo, 30)], 90)]
    fn test_percentage_rejects_wrong_sum(
        #[case] entries: &[(PaymentChannel, u32)],
        #[case] expected_sum: u64,
    ) {
        let err = Percentage::new(weights(entries)).unwrap_err();
        assert_eq!(err, RoutingError::PercentageSum { sum: expected_sum });
    }

    #[test]
    fn test_percentage_rejects_empty() {
        assert_eq!(
            Percentage::new(BTreeMap::new()).unwrap_err(),
            RoutingError::EmptyPercentage
        );
    }

    #[test]
    fn test_percentage_sum_does_not_overflow() {
        let err = Percentage::new(weights(&[
            (PaymentChannel::Napas, u32::MAX),
            (PaymentChannel::Payoo, u32::MAX),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            RoutingError::PercentageSum {
                sum: 2 * u64::from(u32::MAX)
            }
        );
    }

    #[test]
    fn test_tier_rejects_zero_priority() {
        let err = RoutingTier::new(Some(0), Percentage::single(PaymentChannel::Napas)).unwrap_err();
        assert_eq!(err, RoutingError::InvalidPriority { priority: 0 });
        assert!(RoutingTier::new(None, Percentage::single(PaymentChannel::Napas)).is_ok());
    }

    #[rstest]
    #[case::zero_min(0, 100, true)]
    #[case::equal(100, 100, false)]
    #[case::reversed(200, 100, false)]
    #[case::negative_min(-1, 100, false)]
    fn test_amount_range_new(#[case] min: i64, #[case] max: i64, #[case] ok: bool) {
        let result = AmountRange::new(Decimal::from(min), Decimal::from(max));
        assert_eq!(result.is_ok(), ok);
    }

    #[rstest]
    #[case::overlapping((0, 1000), (500, 1500), true)]
    #[case::touching((0, 100), (100, 200), true)]
    #[case::disjoint((0, 100), (101, 200), false)]
    #[case::nested((0, 1000), (10, 20), true)]
    fn test_ranges_overlap(
        #[case] a: (i64, i64),
        #[case] b: (i64, i64),
        #[case] expected: bool,
    ) {
        let a = AmountRange::new(Decimal::from(a.0), Decimal::from(a.1)).unwrap();
        let b = AmountRange::new(Decimal::from(b.0), Decimal::from(b.1)).unwrap();
        assert_eq!(ranges_overlap(Some(&a), Some(&b)), expected);
        assert_eq!(ranges_overlap(Some(&b), Some(&a)), expected);
    }

    #[test]
    fn test_unbounded_range_overlaps_everything() {
        let r = AmountRange::new(Decimal::from(5_000), Decimal::from(9_000)).unwrap();
        assert!(ranges_overlap(None, Some(&r)));
        assert!(ranges_overlap(Some(&r), None));
        assert!(ranges_overlap(None, None));
    }

    #[test]
    fn test_effective_priorities_fall_back_to_position() {
        let rule = RoutingRule {
            id: "r-1".to_string(),
            title: "fallback".to_string(),
            description: None,
            payment_method: PaymentMethod::BankTransfer,
            transaction_type: TransactionType::Deposit,
            account_type: None,
            amount_range: None,
            tiers: vec![
                RoutingTier::new(None, Percentage::single(PaymentChannel::Napas)).unwrap(),
                RoutingTier::new(Some(5), Percentage::single(PaymentChannel::Payoo)).unwrap(),
                RoutingTier::new(None, Percentage::single(PaymentChannel::Napas)).unwrap(),
            ],
            enable: true,
            created_at: Utc::now(),
        };
        assert_eq!(rule.effective_priorities().collect::<Vec<_>>(), vec![1, 5, 3]);
    }
}
