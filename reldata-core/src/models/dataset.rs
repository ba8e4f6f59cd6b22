use serde::{Deserialize, Serialize};

/// A relational learning problem: positive examples, negative examples and
/// the background facts of the domain, one fact per line, e.g. `cancer(alice).`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalDataset {
    /// Positive examples
    pub pos: Vec<String>,
    /// Negative examples
    pub neg: Vec<String>,
    /// Facts for the domain
    pub facts: Vec<String>,
}

impl RelationalDataset {
    pub fn new(pos: Vec<String>, neg: Vec<String>, facts: Vec<String>) -> Self {
        Self { pos, neg, facts }
    }
}
