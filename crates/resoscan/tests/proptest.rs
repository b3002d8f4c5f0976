//! Property-based tests for command-line parsing.

use clap::Parser;
use proptest::prelude::*;

use resoscan_lib::config::AppConfig;
use resoscan_orchestration::stage::Stage;

const FLAGS: [(&str, Stage); 5] = [
    ("--generate", Stage::Generate),
    ("--simulate", Stage::Simulate),
    ("--extract", Stage::Extract),
    ("--summarize", Stage::Summarize),
    ("--compare", Stage::Compare),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any subset of stage flags, in any order, selects exactly those
    /// stages in pipeline order.
    #[test]
    fn stage_flags_select_stages(
        picks in prop::collection::vec(any::<bool>(), 5),
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let mut args = vec!["resoscan".to_string()];
        for &i in &order {
            if picks[i] {
                args.push(FLAGS[i].0.to_string());
            }
        }
        let config = AppConfig::try_parse_from(&args).unwrap();
        let expected: Vec<Stage> = FLAGS
            .iter()
            .zip(&picks)
            .filter(|(_, on)| **on)
            .map(|((_, stage), _)| *stage)
            .collect();
        prop_assert_eq!(config.stages(), expected);
    }

    /// Worker counts are accepted exactly when positive.
    #[test]
    fn worker_count(n in 0usize..512) {
        let parsed = AppConfig::try_parse_from(["resoscan", "-j", &n.to_string()]);
        if n == 0 {
            prop_assert!(parsed.is_err());
        } else {
            prop_assert_eq!(parsed.unwrap().run_settings().workers, n);
        }
    }

    /// Configuration labels pass through to the run settings unchanged.
    #[test]
    fn card_labels(card in "[A-Za-z][A-Za-z0-9_]{0,20}", other in "[A-Za-z][A-Za-z0-9_]{0,20}") {
        let config = AppConfig::try_parse_from([
            "resoscan", "--card", &card, "--compare-with", &other,
        ])
        .unwrap();
        let settings = config.run_settings();
        prop_assert_eq!(&settings.card, &card);
        prop_assert_eq!(settings.compare_with.as_deref(), Some(other.as_str()));
        let expected_card = format!("{card}.tcl");
        prop_assert!(settings.card_path().ends_with(expected_card));
    }
}
