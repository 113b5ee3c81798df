/// Homepage content endpoints
///
/// The home document is a singleton; reads are public and the admin
/// edit upserts the one well-known record. The edit accepts
/// `multipart/form-data`:
///
/// - text parts: `titulo`, `card1_titulo`, `card2_titulo`, `card3_titulo`
/// - file parts: `portada`, `card1_imagen`, `card2_imagen`, `card3_imagen`
///
/// Absent parts keep their stored values; an explicit empty text part
/// clears its field.
///
/// # Endpoints
///
/// - `GET /home` - Current homepage content (public)
/// - `PUT /home` - Edit homepage content (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::DataResponse,
    uploads,
};
use axum::{
    extract::{Multipart, State},
    Json,
};

use talleres_shared::models::home::{HomeContent, UpdateHomeContent};

/// Current homepage content
///
/// The `data` field is an empty object when the singleton has never
/// been written, so clients always receive JSON they can render from.
pub async fn get_home(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<serde_json::Value>>> {
    let data = match HomeContent::get(&state.db).await? {
        Some(content) => serde_json::to_value(content)
            .map_err(|e| ApiError::InternalError(format!("Serialization failed: {}", e)))?,
        None => serde_json::json!({}),
    };

    Ok(Json(DataResponse::new(data)))
}

/// Edit homepage content (admin)
///
/// Upserts the singleton record: create-on-first-write, partial update
/// afterwards. Image parts are validated and stored before the record
/// is touched, so a rejected image leaves the document unchanged.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed multipart body or rejected image
/// - `500 Internal Server Error`: Server error
pub async fn update_home(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<DataResponse<HomeContent>>> {
    let mut update = UpdateHomeContent::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        match name.as_str() {
            "titulo" | "card1_titulo" | "card2_titulo" | "card3_titulo" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field: {}", e)))?;

                match name.as_str() {
                    "titulo" => update.titulo = Some(value),
                    "card1_titulo" => update.card1_titulo = Some(value),
                    "card2_titulo" => update.card2_titulo = Some(value),
                    _ => update.card3_titulo = Some(value),
                }
            }
            "portada" | "card1_imagen" | "card2_imagen" | "card3_imagen" => {
                let content_type = field.content_type().map(|ct| ct.to_string());
                let file_name = field.file_name().map(|n| n.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid image part: {}", e)))?;

                let path = uploads::save_image(
                    &state.config.uploads.dir,
                    uploads::HOME_SUBDIR,
                    content_type.as_deref(),
                    file_name.as_deref(),
                    &data,
                )
                .await?;

                match name.as_str() {
                    "portada" => update.portada = Some(path),
                    "card1_imagen" => update.card1_imagen = Some(path),
                    "card2_imagen" => update.card2_imagen = Some(path),
                    _ => update.card3_imagen = Some(path),
                }
            }
            _ => {}
        }
    }

    let content = HomeContent::upsert(&state.db, update).await?;

    Ok(Json(DataResponse::new(content)))
}
