//! Solution extraction

use super::CoverageModel;
use crate::selection::SentenceSelection;
use crate::solver::Assignment;
use crate::types::Sentence;

/// Maps a solver assignment back onto sentences.
///
/// The returned extract follows original source order (document order,
/// then in-document order), never the solver's internal variable order.
#[derive(Debug, Clone, Default)]
pub struct SolutionExtractor;

impl SolutionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Collect the sentences whose selection variable is 1.
    ///
    /// Variables absent from the assignment count as unselected.
    pub fn extract(&self, assignment: &Assignment, selection: &SentenceSelection) -> Vec<Sentence> {
        let mut selected: Vec<&Sentence> = selection
            .sentences
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                assignment
                    .get(&CoverageModel::sentence_var(*i))
                    .copied()
                    .unwrap_or(0)
                    == 1
            })
            .map(|(_, s)| s)
            .collect();
        selected.sort_by_key(|s| (s.doc_index, s.order));
        selected.into_iter().cloned().collect()
    }

    /// The dense ids of concepts the assignment marks as covered
    pub fn covered_concepts(
        &self,
        assignment: &Assignment,
        selection: &SentenceSelection,
    ) -> Vec<u32> {
        (0..selection.concept_count() as u32)
            .filter(|&j| {
                assignment
                    .get(&CoverageModel::concept_var(j))
                    .copied()
                    .unwrap_or(0)
                    == 1
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::UnitMode;
    use crate::selection::SentenceSelector;
    use crate::types::{Concept, Document, SummConfig};
    use crate::weighting::ConceptWeights;

    fn sent(text: &str, order: usize, doc_index: usize) -> Sentence {
        let stemmed: Vec<String> = text.split_whitespace().map(String::from).collect();
        Sentence::new(text, stemmed, order, format!("doc{doc_index}"), doc_index)
    }

    fn selection() -> SentenceSelection {
        let documents = vec![
            Document::new("doc0", vec![sent("the cat sat", 0, 0)]),
            Document::new("doc1", vec![sent("the dog sat", 0, 1)]),
        ];
        let mut weights = ConceptWeights::default();
        weights.insert(Concept::new(["the", "cat"]), 1.0);
        weights.insert(Concept::new(["the", "dog"]), 1.0);
        let selector = SentenceSelector::new(
            UnitMode::Bigram,
            SummConfig::default().with_min_sentence_length(1),
        );
        selector.select(&documents, &weights)
    }

    #[test]
    fn test_extract_preserves_source_order() {
        let selection = selection();
        let mut assignment = Assignment::default();
        // Deliberately mark the later sentence first.
        assignment.insert("s1".to_string(), 1);
        assignment.insert("s0".to_string(), 1);

        let summary = SolutionExtractor::new().extract(&assignment, &selection);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].original, "the cat sat");
        assert_eq!(summary[1].original, "the dog sat");
    }

    #[test]
    fn test_missing_variables_count_as_unselected() {
        let selection = selection();
        let assignment = Assignment::default();

        let summary = SolutionExtractor::new().extract(&assignment, &selection);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_covered_concepts() {
        let selection = selection();
        let mut assignment = Assignment::default();
        assignment.insert("c0".to_string(), 1);

        let covered = SolutionExtractor::new().covered_concepts(&assignment, &selection);
        assert_eq!(covered, vec![0]);
    }
}
