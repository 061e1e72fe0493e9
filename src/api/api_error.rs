use crate::error::Error;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error responses carry the error text as a plain text body.
pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        let status = match any_err.downcast_ref::<Error>() {
            Some(Error::MissingTemplateName) => StatusCode::NOT_FOUND,
            Some(
                Error::ParamCollision(_) | Error::InvalidParamKey(_) | Error::InvalidTemplatePath(_),
            ) => StatusCode::BAD_REQUEST,
            None if any_err.is::<QueryRejection>() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, format!("{any_err}")).into_response()
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
