use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::state::AppState;

/// Management-only upload endpoint. Expects a multipart body with a `file`
/// field; validation of filename and extension happens in the image store.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("未找到文件"))?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::bad_request("未找到文件"))?;
            file = Some((name, bytes.to_vec()));
            break;
        }
    }

    let Some((name, bytes)) = file else {
        return Err(ApiError::bad_request("未找到文件"));
    };

    let stored = state.images.save(&name, &bytes).await?;
    Ok(Json(json!({
        "success": true,
        "filename": stored,
        "url": format!("/img/{stored}"),
    })))
}
