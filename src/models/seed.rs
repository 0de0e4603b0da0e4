//! Demo data loaded when `matching.seed_demo_data` is enabled.

use chrono::{DateTime, TimeZone, Utc};
use crate::models::domain::{Match, Message, MessageSummary, UserProfile};

fn photo(id: &str) -> String {
    format!("https://images.unsplash.com/photo-{}?w=400&h=600&fit=crop", id)
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[allow(clippy::too_many_arguments)]
fn profile(
    id: &str,
    name: &str,
    age: u8,
    gender: &str,
    location: &str,
    bio: &str,
    interests: &[&str],
    photos: &[&str],
    is_verified: bool,
    last_active: &str,
) -> UserProfile {
    UserProfile {
        user_id: id.to_string(),
        name: name.to_string(),
        age,
        gender: gender.to_string(),
        location: location.to_string(),
        bio: bio.to_string(),
        photos: photos.iter().map(|p| photo(p)).collect(),
        interests: interests.iter().map(|i| i.to_string()).collect(),
        is_verified,
        last_active: Some(last_active.to_string()),
    }
}

/// Demo profile pool, in display order. `user-1` is the demo viewer.
pub fn demo_profiles() -> Vec<UserProfile> {
    vec![
        profile(
            "user-1",
            "Alex Rivera",
            28,
            "Non-binary",
            "San Francisco, CA",
            "Adventure seeker and coffee enthusiast. Love hiking, trying new restaurants, and deep conversations under the stars.",
            &["Hiking", "Photography", "Coffee", "Travel", "Music", "Art"],
            &["1494790108755-2616b5352da1", "1524504388940-b1c1722653e1", "1517841905240-472988babdf9"],
            true,
            "2 hours ago",
        ),
        profile(
            "user-2",
            "Jordan Chen",
            26,
            "Male",
            "New York, NY",
            "Software developer by day, chef by night. Seeking someone who appreciates good food and great company.",
            &["Cooking", "Technology", "Gaming", "Movies", "Books", "Fitness"],
            &["1507003211169-0a1dd7228f2d", "1521572267360-ee0c2909d518", "1506794778202-cad84cf45f1d"],
            true,
            "1 hour ago",
        ),
        profile(
            "user-3",
            "Maya Patel",
            29,
            "Female",
            "Los Angeles, CA",
            "Yoga instructor and wellness coach. Passionate about mindful living and sustainable fashion.",
            &["Yoga", "Meditation", "Sustainability", "Fashion", "Health", "Travel"],
            &["1489424731084-a5d8b219a5bb", "1524250502761-1ac6f2e30d43", "1487412720507-e7ab37603c6f"],
            true,
            "30 minutes ago",
        ),
        profile(
            "user-4",
            "Sam Thompson",
            31,
            "Male",
            "Chicago, IL",
            "Marketing professional with a passion for live music and craft beer.",
            &["Music", "Beer", "Marketing", "Sports", "Concerts", "Food"],
            &["1500648767791-00dcc994a43e", "1519085360753-af0119f7cbe7", "1472099645785-5658abf4ff4e"],
            true,
            "3 hours ago",
        ),
        profile(
            "user-5",
            "Emma Rodriguez",
            25,
            "Female",
            "Austin, TX",
            "Graphic designer and dog mom to Luna. Weekend farmers markets and spontaneous road trips.",
            &["Design", "Dogs", "Art", "Markets", "Road Trips", "Nature"],
            &["1438761681033-6461ffad8d80", "1494790108755-2616b5352da1", "1492633423870-43d1cd2775eb"],
            false,
            "5 hours ago",
        ),
        profile(
            "user-6",
            "David Kim",
            33,
            "Male",
            "Seattle, WA",
            "Physical therapist who loves rock climbing and planning the next adventure.",
            &["Climbing", "Healthcare", "Adventure", "Fitness", "Nature", "Travel"],
            &["1463453091185-61582044d556", "1507591064344-4c6ce005b128", "1522556189639-b150ed9c4330"],
            true,
            "1 day ago",
        ),
    ]
}

fn demo_match(id: &str, other: &str, created: DateTime<Utc>, last: (&str, DateTime<Utc>), unread: bool) -> Match {
    Match {
        id: id.to_string(),
        participants: ("user-1".to_string(), other.to_string()),
        created_at: created,
        last_message: Some(MessageSummary {
            text: last.0.to_string(),
            sent_at: last.1,
        }),
        unread,
    }
}

/// Existing matches of the demo viewer
pub fn demo_matches() -> Vec<Match> {
    vec![
        demo_match(
            "match-1",
            "user-2",
            at(2024, 1, 15, 10, 30),
            ("That sounds amazing! I've been coding all morning but I'm about to take a break and try out a new recipe.", at(2024, 1, 15, 14, 40)),
            true,
        ),
        demo_match(
            "match-2",
            "user-3",
            at(2024, 1, 14, 16, 45),
            ("Thank you! That was at Mount Tamalpais in Marin County. The sunrise view was incredible.", at(2024, 1, 14, 18, 30)),
            false,
        ),
        demo_match(
            "match-3",
            "user-5",
            at(2024, 1, 13, 9, 20),
            ("Luna is adorable! I have a golden retriever too", at(2024, 1, 13, 11, 45)),
            true,
        ),
    ]
}

fn demo_message(id: &str, match_id: &str, sender: &str, text: &str, sent_at: DateTime<Utc>) -> Message {
    Message {
        id: id.to_string(),
        match_id: match_id.to_string(),
        sender_id: sender.to_string(),
        text: text.to_string(),
        sent_at,
        is_read: sender == "user-1",
    }
}

/// Chat history for the demo matches, oldest first per match
pub fn demo_messages() -> Vec<Message> {
    vec![
        demo_message("msg-1", "match-1", "user-2", "Hey! Thanks for the match. How's your day going?", at(2024, 1, 15, 14, 22)),
        demo_message("msg-2", "match-1", "user-1", "Hi Jordan! It's going great, thanks for asking. I just got back from a morning hike. How about you?", at(2024, 1, 15, 14, 35)),
        demo_message("msg-3", "match-1", "user-2", "That sounds amazing! I've been coding all morning but I'm about to take a break and try out a new recipe.", at(2024, 1, 15, 14, 40)),
        demo_message("msg-4", "match-2", "user-3", "I love your hiking photos! Where was that taken?", at(2024, 1, 14, 18, 15)),
        demo_message("msg-5", "match-2", "user-1", "Thank you! That was at Mount Tamalpais in Marin County. The sunrise view was incredible.", at(2024, 1, 14, 18, 30)),
        demo_message("msg-6", "match-3", "user-1", "Hi Emma! Your design portfolio looks incredible. What's your favorite project you've worked on recently?", at(2024, 1, 13, 11, 30)),
        demo_message("msg-7", "match-3", "user-5", "Luna is adorable! I have a golden retriever too", at(2024, 1, 13, 11, 45)),
    ]
}
