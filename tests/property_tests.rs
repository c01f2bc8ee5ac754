//! Property-based tests over randomly generated corpora.

use ilpsumm::{
    extract_units, ConceptWeights, CoverageModel, CoverageModelBuilder, Document, ExhaustiveSolver,
    MassMode, MutualReinforcementWeighting, Problem, QueryExpansionWeighting, ReinforcementLevel,
    Sentence, SentenceSelector, SolverPort, StrategyKind, SummConfig, UnitMode, WeightingStrategy,
};
use proptest::prelude::*;

const VOCAB: &[&str] = &[
    "cat", "dog", "bird", "sat", "ran", "play", "tree", "house", "river", "sky",
];

fn word() -> impl Strategy<Value = String> {
    (0..VOCAB.len()).prop_map(|i| VOCAB[i].to_string())
}

fn sentence_tokens() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word(), 2..8)
}

/// A problem with 1..=3 documents of 1..=4 sentences each
fn problem() -> impl Strategy<Value = Problem> {
    prop::collection::vec(
        prop::collection::vec(sentence_tokens(), 1..=4),
        1..=3,
    )
    .prop_map(|docs| {
        let documents = docs
            .into_iter()
            .enumerate()
            .map(|(doc_index, sentences)| {
                let sentences = sentences
                    .into_iter()
                    .enumerate()
                    .map(|(order, stemmed)| {
                        Sentence::new(
                            stemmed.join(" "),
                            stemmed,
                            order,
                            format!("doc{doc_index}"),
                            doc_index,
                        )
                    })
                    .collect();
                Document::new(format!("doc{doc_index}"), sentences)
            })
            .collect();
        Problem::new("prop", documents)
    })
}

fn raw_counts(problem: &Problem, mode: UnitMode) -> ConceptWeights {
    let mut weights = ConceptWeights::default();
    for sentence in problem.sentences() {
        for unit in extract_units(&sentence.stemmed, mode) {
            *weights.entry(unit).or_insert(0.0) += 1.0;
        }
    }
    weights
}

fn test_config() -> SummConfig {
    SummConfig::default().with_min_sentence_length(1)
}

proptest! {
    #[test]
    fn selection_invariants_hold(problem in problem()) {
        let weights = raw_counts(&problem, UnitMode::Bigram);
        let selector = SentenceSelector::new(UnitMode::Bigram, test_config());
        let selection = selector.select(&problem.documents, &weights);

        // Coverage and density: every id in 0..K has >= 1 covering
        // sentence and the parallel vectors agree.
        prop_assert!(selection.verify().is_ok());
        prop_assert_eq!(selection.weights.len(), selection.concept_count());
        for ids in &selection.sentence_concepts {
            for &id in ids {
                prop_assert!((id as usize) < selection.concept_count());
            }
        }
    }

    #[test]
    fn budget_never_exceeded(problem in problem(), budget in 0usize..20) {
        let weights = raw_counts(&problem, UnitMode::Bigram);
        let selector = SentenceSelector::new(
            UnitMode::Bigram,
            test_config().with_max_sentences(10),
        );
        let selection = selector.select(&problem.documents, &weights);
        let model = CoverageModelBuilder::new(budget).build(&selection).unwrap();
        let assignment = ExhaustiveSolver::new(10).solve(&model).unwrap();

        let total: usize = selection
            .sentences
            .iter()
            .enumerate()
            .filter(|(i, _)| assignment[&CoverageModel::sentence_var(*i)] == 1)
            .map(|(_, s)| s.length())
            .sum();
        prop_assert!(total <= budget);
    }

    #[test]
    fn linking_is_exact(problem in problem(), budget in 0usize..20) {
        let weights = raw_counts(&problem, UnitMode::Bigram);
        let selector = SentenceSelector::new(
            UnitMode::Bigram,
            test_config().with_max_sentences(10),
        );
        let selection = selector.select(&problem.documents, &weights);
        let model = CoverageModelBuilder::new(budget).build(&selection).unwrap();
        let assignment = ExhaustiveSolver::new(10).solve(&model).unwrap();

        for (j, covering) in selection.covering.iter().enumerate() {
            let any_selected = covering
                .iter()
                .any(|&i| assignment[&CoverageModel::sentence_var(i)] == 1);
            prop_assert_eq!(
                assignment[&CoverageModel::concept_var(j as u32)] == 1,
                any_selected
            );
        }
    }

    #[test]
    fn frequency_weighting_is_deterministic(problem in problem()) {
        let strategy = ilpsumm::weighting::strategy_for(
            StrategyKind::Frequency,
            UnitMode::Bigram,
            &test_config(),
        );
        let first = strategy.compute_weights(&problem).unwrap();
        let second = strategy.compute_weights(&problem).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reinforcement_terminates_and_normalizes(problem in problem()) {
        let strategy = MutualReinforcementWeighting::new(
            UnitMode::Unigram,
            test_config(),
        );
        // Iteration is capped at max_iterations, so this returns for any
        // finite input. Weights form a distribution.
        let weights = strategy.compute_weights(&problem).unwrap();
        if !weights.is_empty() {
            let total: f64 = weights.values().sum();
            prop_assert!((total - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn document_level_reinforcement_terminates(problem in problem()) {
        let strategy = MutualReinforcementWeighting::new(
            UnitMode::Unigram,
            test_config(),
        )
        .with_level(ReinforcementLevel::Document)
        .with_mass_mode(MassMode::Conserving);
        let weights = strategy.compute_weights(&problem).unwrap();
        for &w in weights.values() {
            prop_assert!(w >= 0.0 && w.is_finite());
        }
    }

    #[test]
    fn query_expansion_respects_concept_cap(problem in problem()) {
        let config = test_config();
        let cap = config.max_query_expansion_concepts;
        let strategy = QueryExpansionWeighting::new(UnitMode::Unigram, config);
        let weights = strategy.compute_weights(&problem).unwrap();
        prop_assert!(weights.len() <= cap);
    }

    #[test]
    fn extracted_summary_is_in_source_order(problem in problem()) {
        let weights = raw_counts(&problem, UnitMode::Bigram);
        let selector = SentenceSelector::new(
            UnitMode::Bigram,
            test_config().with_max_sentences(10),
        );
        let selection = selector.select(&problem.documents, &weights);
        let model = CoverageModelBuilder::new(12).build(&selection).unwrap();
        let assignment = ExhaustiveSolver::new(10).solve(&model).unwrap();
        let summary = ilpsumm::SolutionExtractor::new().extract(&assignment, &selection);

        for pair in summary.windows(2) {
            prop_assert!((pair[0].doc_index, pair[0].order) < (pair[1].doc_index, pair[1].order));
        }
    }
}
