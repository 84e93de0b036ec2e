// Unit tests for Campus Match

use campus_match::core::{
    badges::{default_catalog, evaluate, validate_catalog, BadgeBoard},
    feed::filter_candidates,
    matches::sort_matches,
};
use campus_match::models::{Badge, BadgeTier, MatchView, Profile, ProfileCard};
use chrono::{Duration, Utc};
use uuid::Uuid;

fn custom_catalog(thresholds: &[u32]) -> Vec<Badge> {
    thresholds
        .iter()
        .enumerate()
        .map(|(i, &required)| Badge {
            id: format!("badge-{}", i),
            name: format!("Badge {}", i),
            description: "test".to_string(),
            required_matches: required,
            tier: BadgeTier::Gold,
            icon: "icon.png".to_string(),
        })
        .collect()
}

fn unlocked_ids(match_count: usize, catalog: &[Badge]) -> Vec<String> {
    evaluate(match_count, catalog)
        .into_iter()
        .filter(|s| s.unlocked)
        .map(|s| s.badge.id)
        .collect()
}

#[test]
fn test_evaluate_threshold_scenario() {
    let catalog = custom_catalog(&[50]);
    assert!(!evaluate(49, &catalog)[0].unlocked);
    assert!(evaluate(50, &catalog)[0].unlocked);
}

#[test]
fn test_evaluate_is_idempotent() {
    let catalog = default_catalog();
    assert_eq!(evaluate(175, &catalog), evaluate(175, &catalog));
}

#[test]
fn test_unlocked_set_is_monotonic() {
    let catalog = default_catalog();
    let mut previous: Vec<String> = vec![];
    for count in 0..=400 {
        let current = unlocked_ids(count, &catalog);
        assert!(previous.iter().all(|id| current.contains(id)), "badge re-locked at {}", count);
        previous = current;
    }
    assert_eq!(previous.len(), catalog.len());
}

#[test]
fn test_tier_styles_present() {
    for status in evaluate(0, &default_catalog()) {
        assert_eq!(status.tier_style, status.badge.tier.style());
        assert!(!status.display_on_profile);
    }
}

#[test]
fn test_custom_catalog_validation() {
    assert!(validate_catalog(&custom_catalog(&[1, 5, 5, 10])).is_ok());
    assert!(validate_catalog(&custom_catalog(&[10, 5])).is_err());
}

#[test]
fn test_displayed_requires_unlock_and_flag() {
    let catalog = default_catalog();
    let mut board = BadgeBoard::default();

    // Flagged before unlocking: hidden until the threshold is reached
    board.toggle_display("legend-status", &catalog);
    assert!(board.displayed(349, &catalog).is_empty());
    assert_eq!(board.displayed(350, &catalog).len(), 1);

    // Unlocked but not flagged
    assert!(board.displayed(350, &catalog).iter().all(|s| s.badge.id == "legend-status"));
}

#[test]
fn test_badge_status_json_shape() {
    let status = &evaluate(60, &default_catalog())[0];
    let json = serde_json::to_value(status).unwrap();

    assert_eq!(json["id"], "first-spark");
    assert_eq!(json["requiredMatches"], 50);
    assert_eq!(json["tier"], "bronze");
    assert_eq!(json["unlocked"], true);
    assert_eq!(json["matchesRemaining"], 0);
    assert_eq!(json["progressPercent"], 100);
    assert_eq!(json["displayOnProfile"], false);
}

#[test]
fn test_filter_candidates_keeps_order() {
    let profiles: Vec<Profile> = (0..5)
        .map(|i| Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: format!("p{}", i),
            age: None,
            bio: None,
            profile_image_url: None,
            location: None,
            interests: None,
            created_at: None,
        })
        .collect();

    let result = filter_candidates(profiles.clone(), &[profiles[2].id], 3);
    let names: Vec<&str> = result.iter().map(|p| p.display_name.as_str()).collect();
    assert_eq!(names, vec!["p0", "p1", "p3"]);
}

#[test]
fn test_sort_matches_breaks_ties_by_counterpart() {
    let now = Utc::now();
    let (low, high) = {
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        if x < y { (x, y) } else { (y, x) }
    };

    let mut views = vec![
        MatchView { id: Uuid::new_v4(), matched_profile: ProfileCard::unknown(high), created_at: now },
        MatchView {
            id: Uuid::new_v4(),
            matched_profile: ProfileCard::unknown(Uuid::new_v4()),
            created_at: now - Duration::days(1),
        },
        MatchView { id: Uuid::new_v4(), matched_profile: ProfileCard::unknown(low), created_at: now },
    ];

    sort_matches(&mut views);

    assert_eq!(views[0].matched_profile.id, low);
    assert_eq!(views[1].matched_profile.id, high);
    assert!(views[2].created_at < now);
}
