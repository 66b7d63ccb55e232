//! Category endpoints.

use gazette_core::models::{Category, NewCategory};
use salvo::prelude::*;

use super::{Message, app_state, message, path_param};
use crate::AppResult;

/// `GET /api/categories`
#[handler]
pub async fn list_categories(depot: &mut Depot) -> AppResult<Json<Vec<Category>>> {
    let categories = app_state(depot)?.repos.categories.list().await?;
    Ok(Json(categories))
}

/// `POST /api/categories`
#[handler]
pub async fn create_category(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Category>> {
    let input = req.parse_json::<NewCategory>().await?;
    let category = app_state(depot)?.repos.categories.create(input).await?;
    Ok(Json(category))
}

/// `GET /api/categories/{id}`
#[handler]
pub async fn show_category(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Category>> {
    let id = path_param(req, "id")?;
    let category = app_state(depot)?.repos.categories.get_by_id(&id).await?;
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}`, articles filed under it are left alone.
#[handler]
pub async fn delete_category(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Message>> {
    let id = path_param(req, "id")?;
    app_state(depot)?.repos.categories.delete(&id).await?;
    Ok(message("Category deleted"))
}
