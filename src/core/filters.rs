use std::collections::HashSet;
use crate::models::{UserProfile, Preferences};

/// Check if a profile falls inside the viewer's inclusive age range
#[inline]
pub fn matches_age_range(profile: &UserProfile, preferences: &Preferences) -> bool {
    profile.age >= preferences.min_age() && profile.age <= preferences.max_age()
}

/// Check if a profile passes the viewer's gender filter
#[inline]
pub fn matches_gender(profile: &UserProfile, preferences: &Preferences) -> bool {
    preferences.interested_in.accepts(&profile.gender)
}

/// Check if a profile is still eligible for a decision by `viewer_id`
///
/// Filters run in a fixed order: self, already decided, age range, gender.
/// An inverted age range simply rejects everything.
#[inline]
pub fn is_eligible(
    profile: &UserProfile,
    viewer_id: &str,
    preferences: &Preferences,
    decided_ids: &HashSet<String>,
) -> bool {
    if profile.user_id == viewer_id {
        return false;
    }

    if decided_ids.contains(&profile.user_id) {
        return false;
    }

    if !matches_age_range(profile, preferences) {
        return false;
    }

    matches_gender(profile, preferences)
}
