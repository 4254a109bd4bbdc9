// Pipeline nodes

pub mod retrieve;
pub mod router;
pub mod summarize;
pub mod synthesize;

pub use retrieve::RetrieveNode;
pub use router::RouterNode;
pub use summarize::SummarizeNode;
pub use synthesize::SynthesizeNode;
