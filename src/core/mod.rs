// Core engine exports
pub mod filters;
pub mod queue;
pub mod random;
pub mod resolver;
pub mod session;

pub use filters::{is_eligible, matches_age_range, matches_gender};
pub use queue::{build_queue, CandidateQueue};
pub use random::{FixedRandom, RandomSource, ThreadRandom};
pub use resolver::{DecisionResolver, Resolution, ResolveError, MATCH_PROBABILITY};
pub use session::{DiscoveryState, SessionError};
