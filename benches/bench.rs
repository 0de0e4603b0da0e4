// Criterion benchmarks for the Spark engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spark_engine::core::{build_queue, DecisionResolver};
use spark_engine::models::{GenderFilter, Preferences, SwipeDecision, UserProfile, Verdict};
use spark_engine::services::{AppStore, Command};
use chrono::Utc;
use std::collections::HashSet;

fn create_candidate(id: usize) -> UserProfile {
    UserProfile {
        user_id: format!("user-{}", id),
        name: format!("User {}", id),
        age: 18 + (id % 30) as u8,
        gender: if id % 2 == 0 { "Female" } else { "Male" }.to_string(),
        location: "Austin, TX".to_string(),
        bio: String::new(),
        photos: vec![],
        interests: Default::default(),
        is_verified: id % 3 == 0,
        last_active: None,
    }
}

fn create_preferences() -> Preferences {
    Preferences {
        age_range: (21, 35),
        max_distance: 50,
        interested_in: GenderFilter::Only("Female".to_string()),
    }
}

fn bench_build_queue(c: &mut Criterion) {
    let preferences = create_preferences();
    let mut group = c.benchmark_group("build_queue");

    for pool_size in [10, 100, 1000, 10000].iter() {
        let pool: Vec<UserProfile> = (0..*pool_size).map(create_candidate).collect();
        // Every fourth profile already decided
        let decided: HashSet<String> = pool
            .iter()
            .step_by(4)
            .map(|p| p.user_id.clone())
            .collect();

        group.bench_with_input(BenchmarkId::new("collect", pool_size), pool_size, |b, _| {
            b.iter(|| {
                build_queue(
                    black_box("user-1"),
                    black_box(&pool),
                    black_box(&preferences),
                    black_box(&decided),
                )
                .count()
            });
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let resolver = DecisionResolver::default();
    let candidate = create_candidate(2);
    let decision = SwipeDecision::new("user-1", "user-2", Verdict::Like);

    c.bench_function("resolve_like", |b| {
        b.iter(|| resolver.resolve(black_box(&decision), black_box(Some(&candidate))))
    });
}

fn bench_store_decisions(c: &mut Criterion) {
    let pool: Vec<UserProfile> = (0..500).map(create_candidate).collect();

    c.bench_function("store_pass_through_500", |b| {
        b.iter(|| {
            let mut store = AppStore::new(DecisionResolver::with_fixed_draw(0.9), create_preferences());
            for profile in pool.iter().cloned() {
                store.insert_profile(profile);
            }

            while let Some(candidate) = store.current_candidate("user-0") {
                let command = Command::Pass {
                    viewer_id: "user-0".to_string(),
                    candidate_id: candidate.user_id,
                };
                if store.apply(command, Utc::now()).is_err() {
                    break;
                }
            }
            black_box(store.matches_for("user-0").len())
        });
    });
}

criterion_group!(benches, bench_build_queue, bench_resolve, bench_store_decisions);

criterion_main!(benches);
