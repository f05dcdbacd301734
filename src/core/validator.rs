//! Rule validation
//!
//! Turns an untrusted [`RuleDraft`] into a typed [`RoutingRule`], or reports
//! every violation found on it. Validation never stops at the first problem:
//! operators see everything wrong with a rule in one pass, keyed by field
//! path (`title`, `minValue`, `routingRule[1].percentage`, ...).
//!
//! Checks performed:
//! - `title` non-empty after trimming
//! - `paymentMethod` and `transactionType` present and known
//! - `accountType`, when given, known and offered for the method/type pair
//! - `minValue` / `maxValue` both present or both absent, `0 <= min < max`
//! - at least one tier
//! - per tier: integer priority >= 1 when given, non-empty percentage map,
//!   non-negative integer weights summing to exactly 100, every channel known
//!   and offered for the method/type pair
//!
//! Two tiers may share a priority.

use crate::io::json_format::{RuleDraft, TierDraft};
use crate::types::{
    AccountType, AmountRange, PaymentChannel, PaymentMethod, Percentage, RoutingRule, RoutingTier,
    TransactionType, ValidationErrors,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Validate a rule draft
///
/// # Returns
///
/// * `Ok(RoutingRule)` - the typed rule; a missing `id` is filled with a new
///   UUIDv7, a missing `createdAt` with the current time and a missing
///   `enable` with `true`
/// * `Err(ValidationErrors)` - every violation found, in field order
pub fn validate_rule(draft: &RuleDraft) -> Result<RoutingRule, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = draft
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if title.is_none() {
        errors.push("title", "title must not be empty");
    }

    let payment_method = required_enum::<PaymentMethod>(
        &mut errors,
        "paymentMethod",
        draft.payment_method.as_deref(),
        "payment method",
    );
    let transaction_type = required_enum::<TransactionType>(
        &mut errors,
        "transactionType",
        draft.transaction_type.as_deref(),
        "transaction type",
    );
    let scope = payment_method.zip(transaction_type);

    let account_type = check_account_type(&mut errors, draft.account_type.as_deref(), scope);
    let amount_range = check_amount_range(&mut errors, draft.min_value, draft.max_value);
    let tiers = check_tiers(&mut errors, &draft.tiers, scope);

    if !errors.is_empty() {
        tracing::debug!(
            rule = %draft.label(),
            violations = errors.len(),
            "routing rule draft rejected"
        );
        return Err(errors);
    }

    let (Some(title), Some((payment_method, transaction_type))) = (title, scope) else {
        return Err(errors);
    };

    Ok(RoutingRule {
        id: draft
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string()),
        title: title.to_string(),
        description: draft.description.clone(),
        payment_method,
        transaction_type,
        account_type,
        amount_range,
        tiers,
        enable: draft.enable.unwrap_or(true),
        created_at: draft.created_at.unwrap_or_else(Utc::now),
    })
}

/// Parse a required enum field, recording a violation when absent or unknown
fn required_enum<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    what: &str,
) -> Option<T> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            errors.push(field, format!("{} is required", what));
            None
        }
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(field, format!("unknown {} '{}'", what, value));
                None
            }
        },
    }
}

fn check_account_type(
    errors: &mut ValidationErrors,
    raw: Option<&str>,
    scope: Option<(PaymentMethod, TransactionType)>,
) -> Option<AccountType> {
    let value = raw.map(str::trim).filter(|s| !s.is_empty())?;

    let account_type = match value.parse::<AccountType>() {
        Ok(account_type) => account_type,
        Err(_) => {
            errors.push("accountType", format!("unknown account type '{}'", value));
            return None;
        }
    };

    if let Some((method, tx_type)) = scope {
        if !method.supports_account_type(tx_type, account_type) {
            errors.push(
                "accountType",
                format!(
                    "account type {} is not available for {} {} rules",
                    account_type, method, tx_type
                ),
            );
        }
    }

    Some(account_type)
}

fn check_amount_range(
    errors: &mut ValidationErrors,
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Option<AmountRange> {
    let (min, max) = match (min, max) {
        (None, None) => return None,
        (Some(_), None) => {
            errors.push("maxValue", "maxValue is required when minValue is set");
            return None;
        }
        (None, Some(_)) => {
            errors.push("minValue", "minValue is required when maxValue is set");
            return None;
        }
        (Some(min), Some(max)) => (min, max),
    };

    let before = errors.len();
    if min < Decimal::ZERO {
        errors.push("minValue", format!("minValue must be >= 0, got {}", min));
    }
    if max < Decimal::ZERO {
        errors.push("maxValue", format!("maxValue must be >= 0, got {}", max));
    }
    if min >= max {
        errors.push(
            "minValue",
            format!("minValue {} must be less than maxValue {}", min, max),
        );
    }
    if errors.len() > before {
        return None;
    }

    match AmountRange::new(min, max) {
        Ok(range) => Some(range),
        Err(e) => {
            errors.push("minValue", e.to_string());
            None
        }
    }
}

fn check_tiers(
    errors: &mut ValidationErrors,
    drafts: &[TierDraft],
    scope: Option<(PaymentMethod, TransactionType)>,
) -> Vec<RoutingTier> {
    if drafts.is_empty() {
        errors.push("routingRule", "at least one tier is required");
        return Vec::new();
    }

    let mut tiers = Vec::with_capacity(drafts.len());

    for (index, draft) in drafts.iter().enumerate() {
        let priority = check_priority(errors, index, draft.priority.as_ref());
        let percentage = check_percentage(errors, index, &draft.percentage, scope);

        if let (Ok(priority), Some(percentage)) = (priority, percentage) {
            match RoutingTier::new(priority, percentage) {
                Ok(tier) => tiers.push(tier),
                Err(e) => errors.push(format!("routingRule[{}].priority", index), e.to_string()),
            }
        }
    }

    tiers
}

/// `Err(())` means a violation was recorded for this priority
fn check_priority(
    errors: &mut ValidationErrors,
    index: usize,
    priority: Option<&Value>,
) -> Result<Option<u32>, ()> {
    let Some(raw) = priority else {
        return Ok(None);
    };
    let field = format!("routingRule[{}].priority", index);

    let Some(priority) = raw.as_i64() else {
        errors.push(
            field,
            format!("tier {} priority must be an integer, got {}", index, raw),
        );
        return Err(());
    };

    if priority < 1 {
        errors.push(
            field,
            format!("tier {} priority must be at least 1, got {}", index, priority),
        );
        return Err(());
    }
    let Ok(value) = u32::try_from(priority) else {
        errors.push(field, format!("tier {} priority {} is too large", index, priority));
        return Err(());
    };

    Ok(Some(value))
}

fn check_percentage(
    errors: &mut ValidationErrors,
    index: usize,
    raw: &BTreeMap<String, Value>,
    scope: Option<(PaymentMethod, TransactionType)>,
) -> Option<Percentage> {
    let field = format!("routingRule[{}].percentage", index);

    if raw.is_empty() {
        errors.push(
            field,
            format!("tier {} percentage must contain at least one channel", index),
        );
        return None;
    }

    let before = errors.len();
    let mut weights: BTreeMap<PaymentChannel, u32> = BTreeMap::new();
    let mut sum: i128 = 0;
    let mut all_integers = true;

    for (key, raw_weight) in raw {
        let weight = match raw_weight.as_i64() {
            Some(weight) => {
                sum += i128::from(weight);
                Some(weight)
            }
            None => {
                all_integers = false;
                errors.push(
                    &field,
                    format!(
                        "tier {} weight for {} must be an integer, got {}",
                        index, key, raw_weight
                    ),
                );
                None
            }
        };

        let channel = match key.parse::<PaymentChannel>() {
            Ok(channel) => channel,
            Err(_) => {
                errors.push(
                    &field,
                    format!("tier {} references unknown channel '{}'", index, key),
                );
                continue;
            }
        };

        if let Some((method, tx_type)) = scope {
            if !method.supports_channel(tx_type, channel) {
                errors.push(
                    &field,
                    format!(
                        "tier {} channel {} is not available for {} {} rules",
                        index, channel, method, tx_type
                    ),
                );
            }
        }

        let Some(weight) = weight else {
            continue;
        };
        let Ok(weight) = u32::try_from(weight) else {
            errors.push(
                &field,
                format!(
                    "tier {} weight for {} must be a non-negative integer, got {}",
                    index, channel, weight
                ),
            );
            continue;
        };

        if weights.insert(channel, weight).is_some() {
            errors.push(
                &field,
                format!("tier {} lists channel {} more than once", index, channel),
            );
        }
    }

    if all_integers && sum != 100 {
        errors.push(
            &field,
            format!("tier {} percentage sums to {}, expected 100", index, sum),
        );
    }

    if errors.len() > before {
        return None;
    }

    match Percentage::new(weights) {
        Ok(percentage) => Some(percentage),
        Err(e) => {
            errors.push(field, e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::json_format::parse_rule_draft;
    use rstest::rstest;

    fn tier(priority: Option<i64>, entries: &[(&str, i64)]) -> TierDraft {
        TierDraft {
            priority: priority.map(Value::from),
            percentage: entries
                .iter()
                .map(|(channel, weight)| (channel.to_string(), Value::from(*weight)))
                .collect(),
        }
    }

    fn draft(tiers: Vec<TierDraft>) -> RuleDraft {
        RuleDraft {
            id: Some("rule-1".to_string()),
            title: Some("Bank deposits".to_string()),
            payment_method: Some("BANK_TRANSFER".to_string()),
            transaction_type: Some("DEPOSIT".to_string()),
            tiers,
            ..RuleDraft::default()
        }
    }

    #[test]
    fn test_valid_rule_is_accepted() {
        let rule =
            validate_rule(&draft(vec![tier(Some(1), &[("NAPAS", 60), ("PAYOO", 40)])])).unwrap();
        assert_eq!(rule.id, "rule-1");
        assert_eq!(rule.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(rule.transaction_type, TransactionType::Deposit);
        assert_eq!(rule.tiers.len(), 1);
        assert_eq!(rule.tiers[0].priority(), Some(1));
        assert_eq!(
            rule.tiers[0].percentage().weight(PaymentChannel::Napas),
            Some(60)
        );
        assert!(rule.enable);
        assert!(rule.amount_range.is_none());
    }

    #[test]
    fn test_tier_sum_ninety_reports_tier_index() {
        let errors =
            validate_rule(&draft(vec![tier(Some(1), &[("NAPAS", 60), ("PAYOO", 30)])])).unwrap_err();
        assert_eq!(errors.len(), 1);
        let violation = &errors.violations()[0];
        assert_eq!(violation.field, "routingRule[0].percentage");
        assert_eq!(violation.message, "tier 0 percentage sums to 90, expected 100");
    }

    #[rstest]
    #[case::ninety_nine(99)]
    #[case::one_hundred_one(101)]
    fn test_off_by_one_sum_rejected_on_second_tier(#[case] total: i64) {
        let errors = validate_rule(&draft(vec![
            tier(Some(1), &[("NAPAS", 100)]),
            tier(Some(2), &[("PAYOO", total - 50), ("BAOKIM", 50)]),
        ]))
        .unwrap_err();
        assert!(errors.has_field("routingRule[1].percentage"));
        assert!(!errors.has_field("routingRule[0].percentage"));
        assert!(errors.violations()[0]
            .message
            .contains(&format!("sums to {}", total)));
    }

    #[test]
    fn test_min_without_max_rejected() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.min_value = Some(Decimal::from(100));
        let errors = validate_rule(&d).unwrap_err();
        assert!(errors.has_field("maxValue"));
    }

    #[test]
    fn test_max_without_min_rejected() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.max_value = Some(Decimal::from(100));
        let errors = validate_rule(&d).unwrap_err();
        assert!(errors.has_field("minValue"));
    }

    #[rstest]
    #[case::equal(500, 500, &["minValue"])]
    #[case::reversed(900, 100, &["minValue"])]
    #[case::negative_min(-1, 100, &["minValue"])]
    #[case::both_negative(-10, -5, &["minValue", "maxValue"])]
    fn test_bad_amount_ranges(#[case] min: i64, #[case] max: i64, #[case] fields: &[&str]) {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.min_value = Some(Decimal::from(min));
        d.max_value = Some(Decimal::from(max));
        let errors = validate_rule(&d).unwrap_err();
        for field in fields {
            assert!(errors.has_field(field), "missing {} in {}", field, errors);
        }
    }

    #[test]
    fn test_valid_amount_range() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.min_value = Some(Decimal::ZERO);
        d.max_value = Some(Decimal::from(1000));
        let rule = validate_rule(&d).unwrap();
        let range = rule.amount_range.unwrap();
        assert_eq!(range.min(), Decimal::ZERO);
        assert_eq!(range.max(), Decimal::from(1000));
    }

    #[test]
    fn test_all_violations_collected() {
        let d = RuleDraft {
            title: Some("   ".to_string()),
            min_value: Some(Decimal::from(10)),
            ..RuleDraft::default()
        };
        let errors = validate_rule(&d).unwrap_err();
        let fields = errors.by_field();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("paymentMethod"));
        assert!(fields.contains_key("transactionType"));
        assert!(fields.contains_key("maxValue"));
        assert!(fields.contains_key("routingRule"));
        assert_eq!(errors.len(), 5);
    }

    #[rstest]
    #[case::zero(0)]
    #[case::negative(-3)]
    fn test_priority_below_one_rejected(#[case] priority: i64) {
        let errors = validate_rule(&draft(vec![tier(Some(priority), &[("NAPAS", 100)])])).unwrap_err();
        assert!(errors.has_field("routingRule[0].priority"));
    }

    #[test]
    fn test_shared_priority_is_accepted() {
        let rule = validate_rule(&draft(vec![
            tier(Some(1), &[("NAPAS", 100)]),
            tier(Some(1), &[("PAYOO", 100)]),
        ]))
        .unwrap();
        assert_eq!(rule.tiers.len(), 2);
        assert_eq!(rule.tiers[1].priority(), Some(1));
    }

    #[test]
    fn test_fractional_weights_reported_per_channel() {
        let d = parse_rule_draft(
            r#"{
                "title": "MoMo deposits",
                "paymentMethod": "MOMO",
                "transactionType": "DEPOSIT",
                "routingRule": [{ "percentage": { "MOMO_DIRECT": 99.5, "PAYOO": 0.5 } }]
            }"#,
        )
        .unwrap();
        let errors = validate_rule(&d).unwrap_err();
        let messages: Vec<&str> = errors
            .violations()
            .iter()
            .map(|v| v.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "tier 0 weight for MOMO_DIRECT must be an integer, got 99.5",
                "tier 0 weight for PAYOO must be an integer, got 0.5",
            ]
        );
        assert!(errors
            .violations()
            .iter()
            .all(|v| v.field == "routingRule[0].percentage"));
    }

    #[rstest]
    #[case::fractional(r#"1.5"#, "1.5")]
    #[case::string(r#""first""#, r#""first""#)]
    fn test_non_integer_priority_rejected(#[case] raw: &str, #[case] shown: &str) {
        let d = parse_rule_draft(&format!(
            r#"{{
                "title": "Bank deposits",
                "paymentMethod": "BANK_TRANSFER",
                "transactionType": "DEPOSIT",
                "routingRule": [{{ "priority": {}, "percentage": {{ "NAPAS": 100 }} }}]
            }}"#,
            raw
        ))
        .unwrap();
        let errors = validate_rule(&d).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.violations()[0].field, "routingRule[0].priority");
        assert_eq!(
            errors.violations()[0].message,
            format!("tier 0 priority must be an integer, got {}", shown)
        );
    }

    #[test]
    fn test_empty_percentage_rejected() {
        let errors = validate_rule(&draft(vec![tier(Some(1), &[])])).unwrap_err();
        assert_eq!(
            errors.violations()[0].message,
            "tier 0 percentage must contain at least one channel"
        );
    }

    #[test]
    fn test_negative_weight_rejected_even_when_sum_is_hundred() {
        let errors =
            validate_rule(&draft(vec![tier(None, &[("NAPAS", 150), ("PAYOO", -50)])])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.violations()[0].message.contains("non-negative"));
    }

    #[test]
    fn test_withdrawal_only_channel_rejected_for_deposit() {
        // ONEPAY handles bank transfer withdrawals only
        let errors = validate_rule(&draft(vec![tier(None, &[("ONEPAY", 100)])])).unwrap_err();
        assert_eq!(
            errors.violations()[0].message,
            "tier 0 channel ONEPAY is not available for BANK_TRANSFER DEPOSIT rules"
        );
    }

    #[test]
    fn test_deposit_channel_rejected_for_withdrawal() {
        let mut d = draft(vec![tier(None, &[("MOMO_DIRECT", 50), ("PAYOO", 50)])]);
        d.payment_method = Some("MOMO".to_string());
        d.transaction_type = Some("WITHDRAWAL".to_string());
        let errors = validate_rule(&d).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.violations()[0].message.contains("PAYOO"));
    }

    #[test]
    fn test_unknown_channel_and_method_reported() {
        let mut d = draft(vec![tier(None, &[("CARRIER_PIGEON", 100)])]);
        d.payment_method = Some("CASH".to_string());
        let errors = validate_rule(&d).unwrap_err();
        assert!(errors.has_field("paymentMethod"));
        assert!(errors.has_field("routingRule[0].percentage"));
        assert!(errors.violations()[1].message.contains("CARRIER_PIGEON"));
    }

    #[test]
    fn test_channels_still_summed_when_method_unknown() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 10)])]);
        d.payment_method = None;
        let errors = validate_rule(&d).unwrap_err();
        assert!(errors.has_field("paymentMethod"));
        assert!(errors.has_field("routingRule[0].percentage"));
    }

    #[test]
    fn test_case_variants_of_one_channel_are_duplicates() {
        let errors =
            validate_rule(&draft(vec![tier(None, &[("NAPAS", 50), ("napas", 50)])])).unwrap_err();
        assert!(errors.violations()[0].message.contains("more than once"));
    }

    #[rstest]
    #[case::deposit_type_on_withdrawal("WITHDRAWAL", "VIRTUAL_ACCOUNT", false)]
    #[case::deposit_type_on_deposit("DEPOSIT", "VIRTUAL_ACCOUNT", true)]
    #[case::unknown("DEPOSIT", "SAFE_DEPOSIT_BOX", false)]
    fn test_account_type_checked_against_scope(
        #[case] tx_type: &str,
        #[case] account_type: &str,
        #[case] ok: bool,
    ) {
        let channel = if tx_type == "DEPOSIT" { "NAPAS" } else { "ONEPAY" };
        let mut d = draft(vec![tier(None, &[(channel, 100)])]);
        d.transaction_type = Some(tx_type.to_string());
        d.account_type = Some(account_type.to_string());
        let result = validate_rule(&d);
        assert_eq!(result.is_ok(), ok, "{:?}", result);
        if let Err(errors) = result {
            assert!(errors.has_field("accountType"));
        }
    }

    #[test]
    fn test_blank_account_type_means_all() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.account_type = Some(String::new());
        assert_eq!(validate_rule(&d).unwrap().account_type, None);
    }

    #[test]
    fn test_missing_id_gets_generated() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.id = None;
        let rule = validate_rule(&d).unwrap();
        assert!(!rule.id.is_empty());
    }

    #[test]
    fn test_title_is_trimmed() {
        let mut d = draft(vec![tier(None, &[("NAPAS", 100)])]);
        d.title = Some("  Spaced  ".to_string());
        assert_eq!(validate_rule(&d).unwrap().title, "Spaced");
    }

    #[test]
    fn test_validate_from_json_body() {
        let d = parse_rule_draft(
            r#"{
                "title": "Zalo payouts",
                "paymentMethod": "ZALOPAY",
                "transactionType": "WITHDRAWAL",
                "accountType": "E_WALLET",
                "routingRule": [
                    { "priority": 1, "percentage": { "ZALOPAY_DIRECT": 100 } },
                    { "priority": 2, "percentage": { "BAOKIM": 100 } }
                ],
                "enable": false
            }"#,
        )
        .unwrap();
        let rule = validate_rule(&d).unwrap();
        assert_eq!(rule.account_type, Some(AccountType::EWallet));
        assert_eq!(rule.tiers.len(), 2);
        assert!(!rule.enable);
    }
}
