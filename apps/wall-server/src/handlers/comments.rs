//! Comment handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;
use wishwall_core::forms::CommentForm;
use wishwall_shared::ApiResponse;
use wishwall_shared::dto::CreateCommentRequest;

use super::posts::upvote_response;
use super::views;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts/{id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let mut form = CommentForm::new(post_id);
    form.set_content(body.into_inner().content);

    let comment = match form.submit(&state.comments).await {
        Ok(comment) => comment,
        Err(e) => return Err(AppError::from_form(e, form.error())),
    };
    tracing::info!(post_id = %post_id, comment_id = %comment.id, "Comment added");

    state.sync.comment_added(post_id).await;

    Ok(HttpResponse::Created().json(ApiResponse::ok(views::new_comment(&comment, Utc::now()))))
}

/// POST /api/posts/{post_id}/comments/{id}/upvote
pub async fn upvote_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    upvote_response(
        state.sync.upvote_comment(post_id, comment_id).await,
        "comment",
        comment_id,
    )
}
