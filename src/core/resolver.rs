use std::sync::Arc;
use serde::Serialize;
use thiserror::Error;
use crate::core::random::{RandomSource, ThreadRandom};
use crate::models::{Match, Notification, NotificationKind, SwipeDecision, UserProfile, Verdict};

/// Chance that a like turns into a match
///
/// Stands in for "the other side already liked you"; the resolver does not
/// consult any like ledger.
pub const MATCH_PROBABILITY: f64 = 0.3;

/// Errors that can occur while resolving a decision
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("Candidate not found: {0}")]
    NotFound(String),
}

/// Side effects of one decision, to be applied by the owning store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Resolution {
    NoMatch,
    Matched {
        #[serde(rename = "match")]
        new_match: Match,
        notification: Notification,
    },
}

impl Resolution {
    pub fn match_created(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

/// Applies swipe decisions
///
/// Pure over (decision, candidate, draw): nothing is mutated, the caller
/// persists whatever comes back.
#[derive(Clone)]
pub struct DecisionResolver {
    random: Arc<dyn RandomSource>,
}

impl DecisionResolver {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Resolver backed by a fixed draw
    pub fn with_fixed_draw(draw: f64) -> Self {
        Self::new(Arc::new(crate::core::random::FixedRandom(draw)))
    }

    /// Resolve a decision against the candidate's profile
    ///
    /// # Arguments
    /// * `decision` - The viewer's verdict
    /// * `candidate` - The candidate's profile, `None` if the store has no such id
    ///
    /// # Returns
    /// The resolution, or `NotFound` when the candidate profile is missing
    pub fn resolve(
        &self,
        decision: &SwipeDecision,
        candidate: Option<&UserProfile>,
    ) -> Result<Resolution, ResolveError> {
        let candidate = candidate
            .filter(|profile| profile.user_id == decision.candidate_id)
            .ok_or_else(|| ResolveError::NotFound(decision.candidate_id.clone()))?;

        match decision.verdict {
            Verdict::Pass => Ok(Resolution::NoMatch),
            Verdict::Like => {
                let draw = self.random.draw();
                if draw >= MATCH_PROBABILITY {
                    tracing::debug!(
                        "No match: {} -> {} (draw {:.3})",
                        decision.viewer_id,
                        decision.candidate_id,
                        draw
                    );
                    return Ok(Resolution::NoMatch);
                }

                let now = decision.timestamp;
                let new_match = Match {
                    id: uuid::Uuid::new_v4().to_string(),
                    participants: (decision.viewer_id.clone(), candidate.user_id.clone()),
                    created_at: now,
                    last_message: None,
                    unread: false,
                };
                let notification = Notification::new(
                    decision.viewer_id.clone(),
                    NotificationKind::Match,
                    format!("It's a match with {}!", candidate.name),
                    now,
                );

                Ok(Resolution::Matched { new_match, notification })
            }
        }
    }
}

impl Default for DecisionResolver {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl std::fmt::Debug for DecisionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionResolver")
            .field("match_probability", &MATCH_PROBABILITY)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_candidate(id: &str, name: &str) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            name: name.to_string(),
            age: 27,
            gender: "Female".to_string(),
            location: String::new(),
            bio: String::new(),
            photos: vec![],
            interests: Default::default(),
            is_verified: true,
            last_active: None,
        }
    }

    #[test]
    fn test_pass_never_matches() {
        let resolver = DecisionResolver::with_fixed_draw(0.0);
        let candidate = create_candidate("c", "Casey");
        let decision = SwipeDecision::new("viewer", "c", Verdict::Pass);

        let resolution = resolver.resolve(&decision, Some(&candidate)).unwrap();
        assert_eq!(resolution, Resolution::NoMatch);
    }

    #[test]
    fn test_like_below_threshold_matches() {
        let resolver = DecisionResolver::with_fixed_draw(0.29);
        let candidate = create_candidate("b", "Blake");
        let decision = SwipeDecision::new("viewer", "b", Verdict::Like);

        match resolver.resolve(&decision, Some(&candidate)).unwrap() {
            Resolution::Matched { new_match, notification } => {
                assert_eq!(new_match.participants, ("viewer".to_string(), "b".to_string()));
                assert!(new_match.last_message.is_none());
                assert!(!new_match.unread);
                assert_eq!(notification.kind, NotificationKind::Match);
                assert!(notification.message.contains("Blake"));
                assert_eq!(notification.recipient_id, "viewer");
            }
            Resolution::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_like_at_threshold_does_not_match() {
        let resolver = DecisionResolver::with_fixed_draw(MATCH_PROBABILITY);
        let candidate = create_candidate("b", "Blake");
        let decision = SwipeDecision::new("viewer", "b", Verdict::Like);

        let resolution = resolver.resolve(&decision, Some(&candidate)).unwrap();
        assert!(!resolution.match_created());
    }

    #[test]
    fn test_missing_candidate() {
        let resolver = DecisionResolver::with_fixed_draw(0.0);
        let decision = SwipeDecision::new("viewer", "ghost", Verdict::Like);

        assert_eq!(
            resolver.resolve(&decision, None),
            Err(ResolveError::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_mismatched_profile_is_not_found() {
        let resolver = DecisionResolver::with_fixed_draw(0.0);
        let other = create_candidate("other", "Other");
        let decision = SwipeDecision::new("viewer", "ghost", Verdict::Pass);

        assert!(resolver.resolve(&decision, Some(&other)).is_err());
    }
}
