use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use super::{ApiError, AppState};
use crate::models::{FeedQuery, FeedResponse, Notice, SwipeOutcome, SwipeRequest};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/feed", web::get().to(get_feed))
        .route("/swipes", web::post().to(record_swipe));
}

/// Feed endpoint
///
/// GET /api/v1/feed?limit=20
///
/// Returns profiles the caller has not swiped on yet. Backend failures
/// produce an empty feed rather than an error.
async fn get_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    query.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let user = state.authenticate(&http_req)?;

    let profile_id = match state.profiles.resolve(&user).await {
        Ok(Some(id)) => id,
        Ok(None) => return Ok(HttpResponse::Ok().json(FeedResponse { profiles: vec![], count: 0 })),
        Err(e) => {
            tracing::warn!("Failed to resolve profile for {}: {}", user.user_id, e);
            return Ok(HttpResponse::Ok().json(FeedResponse { profiles: vec![], count: 0 }));
        }
    };

    let limit = query.limit.map(usize::from).unwrap_or_else(|| state.feed.page_size());
    let profiles = state.feed.fetch_page(profile_id, limit).await;

    tracing::info!("Returning {} feed profiles for {}", profiles.len(), profile_id);

    Ok(HttpResponse::Ok().json(FeedResponse {
        count: profiles.len(),
        profiles,
    }))
}

/// Record swipe endpoint
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "swipedId": "uuid",
///   "isLike": true
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    req: web::Json<SwipeRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = state.authenticate(&http_req)?;

    let swiper_id = match state.profiles.resolve(&user).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::debug!("User {} has no profile, ignoring swipe", user.user_id);
            return Ok(HttpResponse::Ok().json(SwipeOutcome {
                recorded: false,
                matched: false,
                notice: None,
            }));
        }
        Err(e) => {
            tracing::error!("Failed to resolve profile for {}: {}", user.user_id, e);
            return Ok(HttpResponse::InternalServerError().json(SwipeOutcome {
                recorded: false,
                matched: false,
                notice: Some(Notice::swipe_failed()),
            }));
        }
    };

    if swiper_id == req.swiped_id {
        return Err(ApiError::BadRequest("Cannot swipe on your own profile".to_string()));
    }

    let outcome = state.swipes.record(swiper_id, req.swiped_id, req.is_like).await;

    if outcome.recorded {
        Ok(HttpResponse::Ok().json(outcome))
    } else {
        Ok(HttpResponse::InternalServerError().json(outcome))
    }
}
