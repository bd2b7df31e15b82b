use axum::response::Response;

pub mod contact;
pub mod health;

pub async fn not_found() -> Response {
    crate::errors::not_found()
}
