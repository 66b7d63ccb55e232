//! Image upload and download.

use salvo::prelude::*;
use serde::Serialize;

use super::{app_state, path_param};
use crate::{AppError, AppResult};

/// Reference to a stored upload.
#[derive(Debug, Serialize)]
pub struct Uploaded {
    /// Path the file is served from.
    pub url: String,
}

/// `POST /api/upload`, multipart with a single `file` field.
#[handler]
pub async fn upload_image(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Uploaded>> {
    let media = &app_state(depot)?.media;
    let form = req.form_data().await?;
    let file = form.files.get("file").ok_or(AppError::MissingFile)?;
    let url = media
        .ingest(file.content_type().as_ref(), file.name(), file.path())
        .await?;
    Ok(Json(Uploaded { url }))
}

/// `GET /api/uploads/{filename}`
#[handler]
pub async fn serve_upload(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let filename = path_param(req, "filename")?;
    let Some(path) = app_state(depot)?.media.resolve(&filename).await else {
        return Err(AppError::FileNotFound(filename));
    };
    res.send_file(path, req.headers()).await;
    Ok(())
}
