//! Read-only video API
//!
//! Endpoints:
//! - GET /api/videos : paginated, filtered, newest first
//! - GET /api/videos/latest : most recent videos
//! - GET /api/videos/stats : total count and newest video
//! - GET /api/videos/{video_id} : one video by YouTube ID

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use video_store::{StoredVideo, VideoFilter};

use crate::error::{ApiError, json_response};
use crate::service::AppServices;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;
const DEFAULT_LATEST_LIMIT: u32 = 10;
const MAX_LATEST_LIMIT: u32 = 50;

/// Build the videos router.
pub fn build_videos_router(services: AppServices) -> Router {
    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/videos/latest", get(latest_videos))
        .route("/api/videos/stats", get(video_stats))
        .route("/api/videos/{video_id}", get(get_video))
        .with_state(services)
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    page: Option<u32>,
    per_page: Option<u32>,
    search: Option<String>,
    channel_id: Option<String>,
    published_after: Option<String>,
    published_before: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LatestParams {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct LatestResponse {
    videos: Vec<StoredVideo>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    total_videos: usize,
    latest_video: Option<StoredVideo>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`), a naive ISO-8601 datetime
/// (taken as UTC), or a bare date (midnight UTC).
fn parse_datetime(field: &str, raw: &str) -> Result<NaiveDateTime, ApiError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(ApiError::BadRequest(format!(
        "{field} must be an ISO-8601 datetime, got: {raw}"
    )))
}

fn parse_filter(params: &ListParams) -> Result<VideoFilter, ApiError> {
    let published_after = non_blank(params.published_after.clone())
        .map(|raw| parse_datetime("published_after", &raw))
        .transpose()?;
    let published_before = non_blank(params.published_before.clone())
        .map(|raw| parse_datetime("published_before", &raw))
        .transpose()?;

    Ok(VideoFilter {
        search: non_blank(params.search.clone()),
        channel_id: non_blank(params.channel_id.clone()),
        published_after,
        published_before,
    })
}

/// GET /api/videos
async fn list_videos(
    State(services): State<AppServices>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::BadRequest("page must be at least 1".into()));
    }
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ApiError::BadRequest(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}"
        )));
    }

    let filter = parse_filter(&params)?;
    let page = services.repository.list(&filter, page, per_page).await?;
    json_response(StatusCode::OK, &page)
}

/// GET /api/videos/latest
async fn latest_videos(
    State(services): State<AppServices>,
    params: Result<Query<LatestParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let limit = params.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    if !(1..=MAX_LATEST_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LATEST_LIMIT}"
        )));
    }

    let videos = services.repository.latest(limit as usize).await?;
    let count = videos.len();
    json_response(StatusCode::OK, &LatestResponse { videos, count })
}

/// GET /api/videos/stats
async fn video_stats(State(services): State<AppServices>) -> Result<Response, ApiError> {
    let total_videos = services.repository.count().await?;
    let latest_video = services.repository.latest(1).await?.into_iter().next();
    json_response(
        StatusCode::OK,
        &StatsResponse {
            total_videos,
            latest_video,
        },
    )
}

/// GET /api/videos/{video_id}
async fn get_video(
    State(services): State<AppServices>,
    Path(video_id): Path<String>,
) -> Result<Response, ApiError> {
    match services.repository.find_by_key(&video_id).await? {
        Some(video) => json_response(StatusCode::OK, &video),
        None => Err(ApiError::NotFound("Video not found".into())),
    }
}
