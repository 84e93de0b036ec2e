// Criterion benchmarks for Campus Match

use campus_match::core::{default_catalog, evaluate, filter_candidates, sort_matches, BadgeBoard};
use campus_match::models::{MatchView, Profile, ProfileCard};
use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uuid::Uuid;

fn create_candidate(i: usize) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        display_name: format!("Student {}", i),
        age: Some(18 + (i % 10) as i32),
        bio: None,
        profile_image_url: None,
        location: Some("Campus".to_string()),
        interests: Some(vec!["tennis".to_string()]),
        created_at: None,
    }
}

fn bench_badge_evaluation(c: &mut Criterion) {
    let catalog = default_catalog();
    let mut board = BadgeBoard::default();
    board.toggle_display("first-spark", &catalog);
    board.toggle_display("rare-find", &catalog);

    c.bench_function("evaluate_badges", |b| {
        b.iter(|| evaluate(black_box(175), black_box(&catalog)));
    });

    c.bench_function("displayed_badges", |b| {
        b.iter(|| board.displayed(black_box(225), black_box(&catalog)));
    });
}

fn bench_feed_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_filtering");

    for candidate_count in [20, 100, 500, 1000].iter() {
        let candidates: Vec<Profile> = (0..*candidate_count).map(create_candidate).collect();
        // Every other candidate already swiped
        let exclude: Vec<Uuid> = candidates.iter().step_by(2).map(|p| p.id).collect();

        group.bench_with_input(
            BenchmarkId::new("filter_candidates", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    filter_candidates(
                        black_box(candidates.clone()),
                        black_box(&exclude),
                        black_box(20),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_match_sorting(c: &mut Criterion) {
    let now = Utc::now();
    let views: Vec<MatchView> = (0..500)
        .map(|i| MatchView {
            id: Uuid::new_v4(),
            matched_profile: ProfileCard::unknown(Uuid::new_v4()),
            created_at: now - Duration::minutes((i * 7 % 300) as i64),
        })
        .collect();

    c.bench_function("sort_500_matches", |b| {
        b.iter(|| {
            let mut batch = views.clone();
            sort_matches(black_box(&mut batch));
            black_box(batch)
        });
    });
}

criterion_group!(
    benches,
    bench_badge_evaluation,
    bench_feed_filtering,
    bench_match_sorting
);

criterion_main!(benches);
