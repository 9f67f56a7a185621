//! Request extractors whose rejections use the API error body

use axum::extract::{FromRequest, FromRequestParts};
use curatly_common::errors::AppError;

/// JSON request body; malformed bodies become a 400 `{error}` response
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; unparsable segments become a 400 `{error}` response
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
