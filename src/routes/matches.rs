use actix_web::http::header::{CACHE_CONTROL, CONTENT_ENCODING, CONTENT_TYPE};
use actix_web::{web, HttpRequest, HttpResponse};

use super::{ApiError, AppState};
use crate::models::{MatchView, MatchesResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches", web::get().to(list_matches))
        .route("/matches/stream", web::get().to(stream_matches));
}

/// List matches endpoint
///
/// GET /api/v1/matches
async fn list_matches(state: web::Data<AppState>, http_req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let (_, profile_id) = state.caller(&http_req).await?;

    let matches = match profile_id {
        Some(id) => state.matches.list(id).await?,
        None => vec![],
    };

    Ok(HttpResponse::Ok().json(MatchesResponse {
        count: matches.len(),
        matches,
    }))
}

/// Live matches endpoint
///
/// GET /api/v1/matches/stream
///
/// Server-Sent Events. Sends the current list immediately and again after
/// every recomputation. The watcher is dropped with the connection.
async fn stream_matches(state: web::Data<AppState>, http_req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let (user, profile_id) = state.caller(&http_req).await?;
    let profile_id = profile_id
        .ok_or_else(|| ApiError::NotFound(format!("No profile for user {}", user.user_id)))?;

    let watcher = state.matches.watch(profile_id).await;
    let first = watcher.current();

    tracing::debug!("Opened match stream for {}", profile_id);

    let stream = futures_util::stream::unfold((watcher, Some(first)), |(mut watcher, pending)| async move {
        let views = match pending {
            Some(views) => views,
            None => watcher.changed().await.ok()?,
        };
        Some((sse_event(&views), (watcher, None)))
    });

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        // Keeps the compression middleware from buffering events
        .insert_header((CONTENT_ENCODING, "identity"))
        .streaming(stream))
}

fn sse_event(views: &[MatchView]) -> Result<web::Bytes, serde_json::Error> {
    let payload = serde_json::to_string(&MatchesResponse {
        matches: views.to_vec(),
        count: views.len(),
    })?;
    Ok(web::Bytes::from(format!("event: matches\ndata: {}\n\n", payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_event_framing() {
        let bytes = sse_event(&[]).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("event: matches\ndata: "));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains(r#""count":0"#));
    }
}
