//! Property-based tests for the axis strategies.
//!
//! Every axis must keep its declared point budget and stay within it,
//! whatever the quote looks like.

mod common;

use proptest::prelude::*;
use quote_scorer::model::{LegalMentions, LineItem, Profile, Quote, ScoringContext};
use quote_scorer::scoring::{axis_config, default_strategies, AxisId, AXIS_CONFIGS};
use quote_scorer::{EnrichmentBundle, GLOBAL_MAX_POINTS};

const DESCRIPTIONS: &[&str] = &[
    "Pose carrelage sol",
    "Fourniture parquet chêne",
    "Main d'oeuvre plomberie",
    "Forfait déplacement",
    "Isolation combles laine de verre",
    "Pompe à chaleur air-eau",
    "Divers",
    "",
];

fn line_item() -> impl Strategy<Value = LineItem> {
    (
        prop::sample::select(DESCRIPTIONS),
        prop::option::of(0.0f64..5_000.0),
        prop::option::of(0.0f64..200.0),
        prop::option::of(0.0f64..50_000.0),
    )
        .prop_map(|(description, unit_price, quantity, total)| LineItem {
            description: description.to_string(),
            unit_price,
            quantity,
            unit: None,
            total,
        })
}

fn quote() -> impl Strategy<Value = Quote> {
    (
        0.0f64..250_000.0,
        prop::collection::vec(line_item(), 0..10),
        any::<[bool; 4]>(),
        prop::option::of(1u32..400),
        prop::option::of("\\PC{0,80}"),
    )
        .prop_map(|(total, items, flags, duration, free_text)| {
            let mut quote = common::bathroom_quote();
            quote.total_amount = total;
            quote.extracted_data.line_items = items;
            quote.extracted_data.legal_mentions = LegalMentions {
                has_insurance: flags[0],
                has_decennial_insurance: flags[1],
                has_guarantee: flags[2],
                has_withdrawal_right: flags[3],
                ..Default::default()
            };
            quote.extracted_data.dates.duration_days = duration;
            quote.extracted_data.free_text = free_text;
            quote
        })
}

fn enrichment() -> impl Strategy<Value = EnrichmentBundle> {
    prop_oneof![
        Just(EnrichmentBundle::default()),
        Just(common::registry_only_enrichment()),
        Just(common::rich_enrichment()),
    ]
}

fn context() -> impl Strategy<Value = ScoringContext> {
    (any::<bool>(), any::<bool>(), 0.0f64..250_000.0).prop_map(|(b2b, need, amount)| {
        let profile = if b2b { Profile::B2B } else { Profile::B2C };
        let context = ScoringContext::new(profile, "renovation", amount)
            .with_evaluation_date(common::date(2025, 3, 5));
        if need {
            context.with_stated_need(common::stated_need())
        } else {
            context
        }
    })
}

#[test]
fn test_budgets_sum_to_global_scale() {
    let total: f64 = AXIS_CONFIGS.iter().map(|c| c.max_points).sum();
    assert!((total - GLOBAL_MAX_POINTS).abs() < f64::EPSILON);
}

#[test]
fn test_weights_in_unit_interval() {
    for config in &AXIS_CONFIGS {
        for weight in [config.weight, config.weight_b2c, config.weight_b2b] {
            assert!((0.0..=1.0).contains(&weight), "{} weight {weight}", config.name);
        }
    }
}

#[test]
fn test_strategies_cover_every_axis_once() {
    let ids: Vec<AxisId> = default_strategies().iter().map(|s| s.axis_id()).collect();
    assert_eq!(ids, AxisId::ALL.to_vec());
}

#[test]
fn test_declared_budgets_on_fixture() {
    let quote = common::bathroom_quote();
    let enrichment = common::rich_enrichment();
    let context = common::b2c_context();

    for strategy in default_strategies() {
        let axis = strategy.evaluate(&quote, &enrichment, &context);
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!(
            (declared - axis_config(axis.axis_id).max_points).abs() < 1e-9,
            "{} declares {declared}",
            axis.axis_id
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn axes_keep_their_budget(quote in quote(), enrichment in enrichment(), context in context()) {
        for strategy in default_strategies() {
            let axis = strategy.evaluate(&quote, &enrichment, &context);
            let budget = strategy.config().max_points;

            prop_assert!((axis.max_points - budget).abs() < 1e-9);
            let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
            prop_assert!((declared - budget).abs() < 1e-9, "{} declares {}", axis.axis_id, declared);

            prop_assert!(axis.score >= 0.0);
            prop_assert!(axis.score <= budget + 1e-9);
            prop_assert!((0.0..=100.0 + 1e-9).contains(&axis.percentage));

            for sub in &axis.sub_criteria {
                prop_assert!(sub.score >= 0.0 && sub.score <= sub.max_points + 1e-9);
                let points: f64 = sub.control_points.iter().map(|cp| cp.max_points).sum();
                prop_assert!((points - sub.max_points).abs() < 1e-9);
                for cp in &sub.control_points {
                    prop_assert!(cp.score >= 0.0 && cp.score <= cp.max_points + 1e-9);
                    prop_assert!(cp.confidence <= 100);
                }
            }
        }
    }

    #[test]
    fn axes_are_pure(quote in quote(), enrichment in enrichment(), context in context()) {
        for strategy in default_strategies() {
            let first = strategy.evaluate(&quote, &enrichment, &context);
            let second = strategy.evaluate(&quote, &enrichment, &context);
            prop_assert_eq!(first, second);
        }
    }
}
