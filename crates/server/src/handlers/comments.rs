//! Comment endpoints.

use gazette_core::CommentFilters;
use gazette_core::models::{Comment, NewComment};
use salvo::prelude::*;
use serde::Deserialize;

use super::{Message, app_state, message, path_param};
use crate::AppResult;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommentQuery {
    approved_only: bool,
}

/// `POST /api/comments`
#[handler]
pub async fn create_comment(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Comment>> {
    let input = req.parse_json::<NewComment>().await?;
    let comment = app_state(depot)?.repos.comments.create(input).await?;
    Ok(Json(comment))
}

/// `GET /api/comments/{article_id}?approved_only=`
#[handler]
pub async fn list_comments(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<Comment>>> {
    let article_id = path_param(req, "id")?;
    let query = req.parse_queries::<CommentQuery>()?;
    let mut filters = CommentFilters::for_article(article_id);
    filters.approved_only = query.approved_only;
    let comments = app_state(depot)?.repos.comments.list(&filters).await?;
    Ok(Json(comments))
}

/// `PUT /api/comments/{id}/approve`
#[handler]
pub async fn approve_comment(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Message>> {
    let id = path_param(req, "id")?;
    app_state(depot)?.repos.comments.approve(&id).await?;
    Ok(message("Comment approved"))
}

/// `DELETE /api/comments/{id}`
#[handler]
pub async fn delete_comment(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Message>> {
    let id = path_param(req, "id")?;
    app_state(depot)?.repos.comments.delete(&id).await?;
    Ok(message("Comment deleted"))
}
