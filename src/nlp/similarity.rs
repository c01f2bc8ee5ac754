//! Text similarity port
//!
//! The summarizer needs a lexical-overlap similarity in [0, 1] for two
//! things: query-relevance filtering and seeding the query-expansion
//! iteration. The algorithm itself is a collaborator concern; swap in a
//! different backend by implementing [`Similarity`].

use rustc_hash::FxHashSet;

/// Computes a similarity score in [0, 1] between two token sequences
pub trait Similarity: Send + Sync {
    /// Similarity between two stemmed token sequences
    fn similarity(&self, a: &[String], b: &[String]) -> f64;
}

/// Basic lexical overlap: |A ∩ B| / min(|A|, |B|) over distinct tokens.
///
/// Symmetric, 0 for disjoint sequences, 1 when the smaller token set is
/// contained in the larger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlap;

impl Similarity for LexicalOverlap {
    fn similarity(&self, a: &[String], b: &[String]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let set_a: FxHashSet<&str> = a.iter().map(String::as_str).collect();
        let set_b: FxHashSet<&str> = b.iter().map(String::as_str).collect();

        let overlap = set_a.intersection(&set_b).count();
        let denom = set_a.len().min(set_b.len());

        overlap as f64 / denom as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_disjoint_is_zero() {
        let sim = LexicalOverlap;
        assert_eq!(sim.similarity(&toks("cat dog"), &toks("fish bird")), 0.0);
    }

    #[test]
    fn test_containment_is_one() {
        let sim = LexicalOverlap;
        let score = sim.similarity(&toks("cat"), &toks("cat dog fish"));
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let sim = LexicalOverlap;
        let a = toks("the cat sat down");
        let b = toks("a cat stood up");
        assert!((sim.similarity(&a, &b) - sim.similarity(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let sim = LexicalOverlap;
        assert_eq!(sim.similarity(&[], &toks("cat")), 0.0);
        assert_eq!(sim.similarity(&toks("cat"), &[]), 0.0);
    }

    #[test]
    fn test_range() {
        let sim = LexicalOverlap;
        let score = sim.similarity(&toks("cat dog fish"), &toks("cat bird"));
        assert!(score >= 0.0 && score <= 1.0);
    }
}
