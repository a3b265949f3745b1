use crate::models::CurrentUser;
use axum::{Extension, Json};

#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Identity of the current session", body = CurrentUser),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session" = [])
    ),
    tag = "auth"
)]
pub async fn get_current_user(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}
