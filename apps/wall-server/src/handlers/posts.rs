//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;
use wishwall_core::forms::PostForm;
use wishwall_core::view::UpvoteOutcome;
use wishwall_shared::ApiResponse;
use wishwall_shared::dto::{CreatePostRequest, UpvoteResponse};

use super::views;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut form = PostForm::new();
    form.set_content(req.content);
    if let Some(recipient) = req.recipient {
        form.set_recipient(recipient);
    }

    let post = match form.submit(&state.posts).await {
        Ok(post) => post,
        Err(e) => return Err(AppError::from_form(e, form.error())),
    };
    tracing::info!(post_id = %post.id, "Wish posted");

    state.sync.post_created().await;

    Ok(HttpResponse::Created().json(ApiResponse::ok(views::new_post(&post, Utc::now()))))
}

/// POST /api/posts/{id}/upvote
pub async fn upvote_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    upvote_response(state.sync.upvote_post(id).await, "post", id)
}

pub(super) fn upvote_response(
    outcome: UpvoteOutcome,
    entity: &str,
    id: Uuid,
) -> AppResult<HttpResponse> {
    match outcome {
        UpvoteOutcome::Applied { upvotes } => {
            Ok(HttpResponse::Ok().json(ApiResponse::ok(UpvoteResponse::applied(upvotes))))
        }
        UpvoteOutcome::AlreadyInFlight => Ok(HttpResponse::Ok().json(
            ApiResponse::ok_with_message(UpvoteResponse::skipped(), "Upvote already in progress"),
        )),
        UpvoteOutcome::NotFound => Err(AppError::NotFound(format!(
            "{entity} with id {id} not found"
        ))),
        // Already logged by the synchronizer; the count simply stays put.
        UpvoteOutcome::Failed => Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
            UpvoteResponse::skipped(),
            "Upvote not applied",
        ))),
    }
}
