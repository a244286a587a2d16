mod evaluate;
mod similarity;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use similarity::{run_similarity, SimilarityArgs};
