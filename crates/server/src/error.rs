use salvo::http::{ParseError, StatusCode};
use salvo::prelude::*;
use serde::Serialize;

/// Result type returned by handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Errors a request can end with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain or store failure.
    #[error(transparent)]
    Core(#[from] gazette_core::Error),

    /// The request body or query could not be parsed.
    #[error("invalid request: {0}")]
    Parse(#[from] ParseError),

    /// A route parameter was absent.
    #[error("missing path parameter `{0}`")]
    MissingParam(&'static str),

    /// The multipart body carried no `file` field.
    #[error("no file in request")]
    MissingFile,

    /// A stored upload does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Reading or writing the upload directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// [`AppState`](crate::AppState) was not injected into the depot.
    #[error("application state is not configured")]
    MissingState,
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(gazette_core::Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Core(gazette_core::Error::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Core(gazette_core::Error::UnsupportedMedia(_)) => StatusCode::BAD_REQUEST,
            AppError::Core(gazette_core::Error::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Parse(_) => StatusCode::BAD_REQUEST,
            AppError::MissingParam(_) => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingState => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server side failures stay generic.
    pub fn detail(&self) -> String {
        if self.status().is_server_error() {
            "internal server error".to_owned()
        } else {
            self.to_string()
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, path = %req.uri().path(), "request failed");
        } else {
            tracing::debug!(error = %self, path = %req.uri().path(), "request rejected");
        }
        res.status_code(status);
        res.render(Json(ErrorBody {
            detail: self.detail(),
        }));
    }
}
