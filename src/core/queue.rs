use std::collections::HashSet;
use crate::core::filters::is_eligible;
use crate::models::{Preferences, UserProfile};

/// Lazy, ordered sequence of candidates still awaiting a decision
///
/// Yields profiles in pool order and never yields the same id twice.
/// The queue borrows its inputs; to restart it, build a new one from the
/// current decided set.
#[derive(Debug, Clone)]
pub struct CandidateQueue<'a> {
    viewer_id: &'a str,
    pool: std::slice::Iter<'a, UserProfile>,
    preferences: &'a Preferences,
    decided_ids: &'a HashSet<String>,
    yielded: HashSet<&'a str>,
}

impl<'a> Iterator for CandidateQueue<'a> {
    type Item = &'a UserProfile;

    fn next(&mut self) -> Option<Self::Item> {
        for profile in self.pool.by_ref() {
            if !is_eligible(profile, self.viewer_id, self.preferences, self.decided_ids) {
                continue;
            }
            if self.yielded.insert(profile.user_id.as_str()) {
                return Some(profile);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.pool.size_hint().1)
    }
}

/// Build the candidate queue for `viewer_id`
///
/// # Arguments
/// * `viewer_id` - The viewer; never part of their own queue
/// * `all_users` - The profile pool, in display order
/// * `preferences` - The viewer's age and gender filters
/// * `decided_ids` - Ids the viewer has already liked or passed
pub fn build_queue<'a>(
    viewer_id: &'a str,
    all_users: &'a [UserProfile],
    preferences: &'a Preferences,
    decided_ids: &'a HashSet<String>,
) -> CandidateQueue<'a> {
    CandidateQueue {
        viewer_id,
        pool: all_users.iter(),
        preferences,
        decided_ids,
        yielded: HashSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderFilter;

    fn create_candidate(id: &str, age: u8, gender: &str) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            age,
            gender: gender.to_string(),
            location: String::new(),
            bio: String::new(),
            photos: vec![],
            interests: Default::default(),
            is_verified: false,
            last_active: None,
        }
    }

    fn ids<'a>(queue: impl Iterator<Item = &'a UserProfile>) -> Vec<&'a str> {
        queue.map(|p| p.user_id.as_str()).collect()
    }

    #[test]
    fn test_age_filter_scenario() {
        let pool = vec![create_candidate("A", 20, "F"), create_candidate("B", 40, "M")];
        let preferences = Preferences {
            age_range: (18, 30),
            max_distance: 50,
            interested_in: GenderFilter::All,
        };
        let decided = HashSet::new();

        assert_eq!(ids(build_queue("viewer", &pool, &preferences, &decided)), vec!["A"]);
    }

    #[test]
    fn test_preserves_pool_order() {
        let pool = vec![
            create_candidate("c", 25, "F"),
            create_candidate("a", 25, "F"),
            create_candidate("b", 25, "F"),
        ];
        let preferences = Preferences::default();
        let decided = HashSet::new();

        assert_eq!(ids(build_queue("viewer", &pool, &preferences, &decided)), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_ids_yielded_once() {
        let pool = vec![
            create_candidate("a", 25, "F"),
            create_candidate("a", 25, "F"),
            create_candidate("b", 25, "F"),
        ];
        let preferences = Preferences::default();
        let decided = HashSet::new();

        assert_eq!(ids(build_queue("viewer", &pool, &preferences, &decided)), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_when_all_decided() {
        let pool = vec![create_candidate("a", 25, "F")];
        let preferences = Preferences::default();
        let decided: HashSet<String> = ["a".to_string()].into_iter().collect();

        assert!(build_queue("viewer", &pool, &preferences, &decided).next().is_none());
    }
}
