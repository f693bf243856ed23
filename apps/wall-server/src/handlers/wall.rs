//! The rendered wall.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use wishwall_core::view::{LoadStatus, SortMode, ViewState};
use wishwall_shared::ApiResponse;
use wishwall_shared::dto::{PostView, WallQuery, WallResponse, WallStatus};

use super::views;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub const LOADING_MESSAGE: &str = "Loading wishes...";
pub const EMPTY_WALL_MESSAGE: &str = "No wishes yet. Be the first to share!";

/// GET /api/wall?sort=top&recipient=amina
///
/// Sort and filter apply to this response only; omitted parameters fall back
/// to the view's active ones.
pub async fn get_wall(
    state: web::Data<AppState>,
    query: web::Query<WallQuery>,
) -> AppResult<HttpResponse> {
    let WallQuery { sort, recipient } = query.into_inner();
    let sort = sort
        .as_deref()
        .map(str::parse::<SortMode>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let recipient = recipient
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let now = Utc::now();
    let wall = state
        .sync
        .read(|view| {
            let sort = sort.unwrap_or(view.sort());
            let recipient = recipient.as_deref().or(view.recipient_filter());
            render(view, sort, recipient, now)
        })
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(wall)))
}

fn render(
    view: &ViewState,
    sort: SortMode,
    recipient: Option<&str>,
    now: DateTime<Utc>,
) -> WallResponse {
    let posts: Vec<PostView> = view
        .project(sort, recipient)
        .into_iter()
        .map(|post| views::post_view(view, post, now))
        .collect();

    let (status, message) = match view.status() {
        LoadStatus::Loading => (WallStatus::Loading, Some(LOADING_MESSAGE.to_string())),
        LoadStatus::Failed(message) => (WallStatus::Failed, Some(message.clone())),
        LoadStatus::Ready if posts.is_empty() => {
            (WallStatus::Ready, Some(EMPTY_WALL_MESSAGE.to_string()))
        }
        LoadStatus::Ready => (WallStatus::Ready, None),
    };

    WallResponse {
        status,
        message,
        banner: recipient.map(|name| format!("Showing messages for: {name}")),
        sort: sort.to_string(),
        recipient: recipient.map(str::to_string),
        posts,
    }
}
