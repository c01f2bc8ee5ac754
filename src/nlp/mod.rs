//! Lexical collaborators: stopword filtering and query similarity.
//!
//! Tokenization and stemming happen upstream; this module only covers the
//! small lexical utilities the weighting strategies depend on.

pub mod similarity;
pub mod stopwords;

pub use similarity::{LexicalOverlap, Similarity};
pub use stopwords::StopwordFilter;
