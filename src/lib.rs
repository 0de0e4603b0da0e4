//! Spark Engine - matching and discovery service for the Spark dating app
//!
//! The core is a candidate queue and a decision resolver. Both are pure:
//! the queue reads a profile pool, the resolver returns match and
//! notification deltas. [`services::AppStore`] is the single owner that
//! applies those deltas.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_queue, CandidateQueue, DecisionResolver, DiscoveryState, RandomSource, Resolution};
pub use models::{Match, Notification, NotificationKind, Preferences, SwipeDecision, UserProfile, Verdict};
pub use services::{AppStore, Command, Outcome};
