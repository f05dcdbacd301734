//! Benchmark suite for validation and conflict auditing
//!
//! Rule sets are generated in memory so the numbers reflect the algorithms,
//! not file I/O.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Rule counts cover the operator-sized range: tens to a few hundred rules
//! bound to a single organization, half of them with overlapping amount
//! ranges.

use chrono::{Duration, TimeZone, Utc};
use routing_rules_engine::core::{
    validate_rule, ConflictDetector, PriorityPolicy, RoutingStore, RuleRegistry,
};
use routing_rules_engine::io::{RuleDraft, TierDraft};
use routing_rules_engine::types::{BoundRule, OrgRoutingBinding};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn main() {
    divan::main();
}

const RULE_COUNTS: &[usize] = &[10, 100, 300];

fn draft(index: usize) -> RuleDraft {
    // Even rules share a wide range, odd rules get disjoint narrow ones
    let (min, max) = if index % 2 == 0 {
        (0, 1_000_000)
    } else {
        let start = 1_000_001 + index as i64 * 100;
        (start, start + 99)
    };

    RuleDraft {
        id: Some(format!("rule-{}", index)),
        title: Some(format!("Rule {}", index)),
        payment_method: Some("BANK_TRANSFER".to_string()),
        transaction_type: Some("WITHDRAWAL".to_string()),
        min_value: Some(Decimal::from(min)),
        max_value: Some(Decimal::from(max)),
        tiers: vec![
            TierDraft {
                priority: Some(1.into()),
                percentage: BTreeMap::from([
                    ("NAPAS".to_string(), 70.into()),
                    ("BAOKIM".to_string(), 30.into()),
                ]),
            },
            TierDraft {
                priority: Some(2.into()),
                percentage: BTreeMap::from([("ONEPAY".to_string(), 100.into())]),
            },
        ],
        created_at: Some(
            Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(index as i64),
        ),
        ..RuleDraft::default()
    }
}

fn bound_rules(count: usize) -> Vec<BoundRule> {
    (0..count)
        .map(|index| {
            let rule = validate_rule(&draft(index)).expect("generated draft is valid");
            BoundRule {
                binding: OrgRoutingBinding::new("org-bench", &rule.id),
                rule,
            }
        })
        .collect()
}

#[divan::bench(args = RULE_COUNTS)]
fn validate_drafts(bencher: divan::Bencher, count: usize) {
    let drafts: Vec<RuleDraft> = (0..count).map(draft).collect();

    bencher.bench(|| {
        for draft in &drafts {
            divan::black_box(validate_rule(draft).is_ok());
        }
    });
}

#[divan::bench(args = RULE_COUNTS)]
fn audit_organization_whole_rule(bencher: divan::Bencher, count: usize) {
    let bound = bound_rules(count);
    let detector = ConflictDetector::new(PriorityPolicy::WholeRule);

    bencher.bench(|| detector.audit_organization("org-bench", divan::black_box(&bound)));
}

#[divan::bench(args = RULE_COUNTS)]
fn audit_organization_shared_tier_priority(bencher: divan::Bencher, count: usize) {
    let bound = bound_rules(count);
    let detector = ConflictDetector::new(PriorityPolicy::SharedTierPriority);

    bencher.bench(|| detector.audit_organization("org-bench", divan::black_box(&bound)));
}

#[divan::bench(args = RULE_COUNTS)]
fn find_conflicts_for_new_rule(bencher: divan::Bencher, count: usize) {
    let bound = bound_rules(count);
    let candidate = validate_rule(&draft(count)).expect("generated draft is valid");
    let detector = ConflictDetector::default();

    bencher.bench(|| detector.find_conflicts("org-bench", &candidate, divan::black_box(&bound)));
}

#[divan::bench(args = RULE_COUNTS)]
fn registry_bound_rules(bencher: divan::Bencher, count: usize) {
    let mut registry = RuleRegistry::new();
    for entry in bound_rules(count) {
        registry.insert_rule(entry.rule).expect("unique rule id");
        registry
            .insert_bindings(vec![entry.binding])
            .expect("unique binding");
    }

    bencher.bench(|| registry.bound_rules("org-bench"));
}
