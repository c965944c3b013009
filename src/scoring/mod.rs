pub mod engagement;
pub mod ranking;

pub use engagement::{EngagementCounts, EngagementScorer, EngagementWeights};
pub use ranking::{rank_posts, PostPerformance};
