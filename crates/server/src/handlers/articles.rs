//! Article endpoints.

use gazette_core::ArticleFilters;
use gazette_core::models::{Article, ArticleChanges, NewArticle};
use salvo::prelude::*;

use super::{Message, app_state, message, path_param};
use crate::AppResult;

/// `GET /api/articles?category_id=&search=&published_only=`
#[handler]
pub async fn list_articles(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<Article>>> {
    let filters = req.parse_queries::<ArticleFilters>()?;
    let articles = app_state(depot)?.repos.articles.list(&filters).await?;
    Ok(Json(articles))
}

/// `POST /api/articles`
#[handler]
pub async fn create_article(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Article>> {
    let input = req.parse_json::<NewArticle>().await?;
    let article = app_state(depot)?.repos.articles.create(input).await?;
    Ok(Json(article))
}

/// `GET /api/articles/{id}`
#[handler]
pub async fn show_article(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Article>> {
    let id = path_param(req, "id")?;
    let article = app_state(depot)?.repos.articles.get_by_id(&id).await?;
    Ok(Json(article))
}

/// Partial update: only the fields present in the body change.
#[handler]
pub async fn update_article(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Article>> {
    let id = path_param(req, "id")?;
    let changes = req.parse_json::<ArticleChanges>().await?;
    let article = app_state(depot)?.repos.articles.update(&id, changes).await?;
    Ok(Json(article))
}

/// Deletes the article and its comments.
#[handler]
pub async fn delete_article(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Message>> {
    let id = path_param(req, "id")?;
    app_state(depot)?.repos.articles.delete(&id).await?;
    Ok(message("Article deleted"))
}
