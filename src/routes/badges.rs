use actix_web::{web, HttpRequest, HttpResponse};

use super::{ApiError, AppState};
use crate::models::{BadgesResponse, ProfileId, ToggleBadgeResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/badges", web::get().to(list_badges))
        .route("/badges/displayed", web::get().to(displayed_badges))
        .route("/badges/{badge_id}/toggle", web::post().to(toggle_badge));
}

/// Caller's profile id, `None` when missing or when resolution fails
async fn profile_for(state: &AppState, http_req: &HttpRequest) -> Result<Option<ProfileId>, ApiError> {
    let user = state.authenticate(http_req)?;
    match state.profiles.resolve(&user).await {
        Ok(profile_id) => Ok(profile_id),
        Err(e) => {
            tracing::warn!("Failed to resolve profile for {}: {}", user.user_id, e);
            Ok(None)
        }
    }
}

/// Match count feeding the evaluator. A failed read counts as zero so the
/// catalog still renders, all locked, with display flags kept.
async fn match_count(state: &AppState, profile_id: Option<ProfileId>) -> usize {
    let Some(id) = profile_id else {
        return 0;
    };

    match state.matches.list(id).await {
        Ok(matches) => matches.len(),
        Err(e) => {
            tracing::warn!("Failed to count matches for {}: {}", id, e);
            0
        }
    }
}

/// GET /api/v1/badges
///
/// Full catalog with unlocked and display flags for the caller.
async fn list_badges(state: web::Data<AppState>, http_req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let profile_id = profile_for(&state, &http_req).await?;
    let count = match_count(&state, profile_id).await;

    let badges = match profile_id {
        Some(id) => state.badges.statuses(id, count).await,
        None => crate::core::evaluate(count, state.badges.catalog()),
    };

    Ok(HttpResponse::Ok().json(BadgesResponse {
        match_count: count,
        badges,
    }))
}

/// GET /api/v1/badges/displayed
async fn displayed_badges(state: web::Data<AppState>, http_req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let profile_id = profile_for(&state, &http_req).await?;
    let count = match_count(&state, profile_id).await;

    let badges = match profile_id {
        Some(id) => state.badges.displayed(id, count).await,
        None => vec![],
    };

    Ok(HttpResponse::Ok().json(BadgesResponse {
        match_count: count,
        badges,
    }))
}

/// POST /api/v1/badges/{badge_id}/toggle
///
/// Flips the session-only "display on profile" flag.
async fn toggle_badge(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let (user, profile_id) = state.caller(&http_req).await?;
    let badge_id = path.into_inner();

    let profile_id = profile_id
        .ok_or_else(|| ApiError::NotFound(format!("No profile for user {}", user.user_id)))?;

    let display_on_profile = state
        .badges
        .toggle(profile_id, &badge_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Unknown badge {}", badge_id)))?;

    Ok(HttpResponse::Ok().json(ToggleBadgeResponse {
        badge_id,
        display_on_profile,
    }))
}
