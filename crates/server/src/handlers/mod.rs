//! Request handlers and the `/api` route tree.

use std::sync::Arc;

use salvo::prelude::*;
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

pub mod articles;
pub mod categories;
pub mod comments;
pub mod uploads;

/// Routes served under `/api`.
pub fn api_router() -> Router {
    Router::with_path("api")
        .push(
            Router::with_path("categories")
                .get(categories::list_categories)
                .post(categories::create_category)
                .push(
                    Router::with_path("{id}")
                        .get(categories::show_category)
                        .delete(categories::delete_category),
                ),
        )
        .push(
            Router::with_path("articles")
                .get(articles::list_articles)
                .post(articles::create_article)
                .push(
                    Router::with_path("{id}")
                        .get(articles::show_article)
                        .put(articles::update_article)
                        .delete(articles::delete_article),
                ),
        )
        .push(
            Router::with_path("comments")
                .post(comments::create_comment)
                .push(
                    Router::with_path("{id}")
                        .get(comments::list_comments)
                        .delete(comments::delete_comment)
                        .push(Router::with_path("approve").put(comments::approve_comment)),
                ),
        )
        .push(Router::with_path("upload").post(uploads::upload_image))
        .push(Router::with_path("uploads/{filename}").get(uploads::serve_upload))
}

/// Acknowledgement body for deletes and approvals.
#[derive(Debug, Serialize)]
pub struct Message {
    /// What happened.
    pub message: &'static str,
}

pub(crate) fn message(message: &'static str) -> Json<Message> {
    Json(Message { message })
}

pub(crate) fn app_state(depot: &Depot) -> AppResult<&AppState> {
    depot
        .obtain::<Arc<AppState>>()
        .map(|state| &**state)
        .map_err(|_| AppError::MissingState)
}

pub(crate) fn path_param(req: &Request, name: &'static str) -> AppResult<String> {
    req.param::<String>(name).ok_or(AppError::MissingParam(name))
}
