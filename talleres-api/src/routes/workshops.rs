/// Workshop catalog endpoints
///
/// Reads are public; writes require an admin identity (enforced by the
/// router's access gate). Create and update accept `multipart/form-data`
/// so the workshop image can travel with its text fields:
///
/// - text parts: `titulo`, `descripcion`, `precio`, `fecha`, `categoria`
/// - file part: `img_taller` (image, at most 5 MiB)
///
/// # Endpoints
///
/// - `GET    /workshops` - List all workshops (public)
/// - `GET    /workshops/:id` - Get one workshop (public)
/// - `POST   /workshops` - Create a workshop (admin)
/// - `PUT    /workshops/:id` - Update a workshop (admin)
/// - `DELETE /workshops/:id` - Delete a workshop (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::DataResponse,
    uploads,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use talleres_shared::models::workshop::{CreateWorkshop, UpdateWorkshop, Workshop};

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
    pub msg: String,
}

/// Fields collected from a multipart workshop form
///
/// Every field is optional at parse time; create enforces presence
/// afterwards, update treats absence as "keep stored value".
#[derive(Debug, Default)]
struct WorkshopForm {
    titulo: Option<String>,
    descripcion: Option<String>,
    precio: Option<f64>,
    fecha: Option<NaiveDate>,
    categoria: Option<String>,
    /// Stored server-relative path of an uploaded image part
    img_taller: Option<String>,
}

fn field_error(field: &str, message: &str) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: field.to_string(),
        message: message.to_string(),
    }])
}

fn parse_precio(raw: &str) -> Result<f64, ApiError> {
    let precio: f64 = raw
        .trim()
        .parse()
        .map_err(|_| field_error("precio", "Price must be a number"))?;

    if !precio.is_finite() || precio < 0.0 {
        return Err(field_error("precio", "Price must be zero or positive"));
    }

    Ok(precio)
}

fn parse_fecha(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| field_error("fecha", "Date must be YYYY-MM-DD"))
}

fn validate_titulo(titulo: &str) -> Result<(), ApiError> {
    if titulo.trim().len() < 3 {
        return Err(field_error("titulo", "Title must be at least 3 characters"));
    }
    Ok(())
}

/// Drains a multipart stream into a [`WorkshopForm`]
///
/// The image part is validated and persisted as a side effect, so a
/// rejected image aborts the whole request before any row is written.
async fn parse_workshop_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<WorkshopForm, ApiError> {
    let mut form = WorkshopForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        match name.as_str() {
            "titulo" => {
                let value = read_text(field).await?;
                validate_titulo(&value)?;
                form.titulo = Some(value);
            }
            "descripcion" => form.descripcion = Some(read_text(field).await?),
            "precio" => form.precio = Some(parse_precio(&read_text(field).await?)?),
            "fecha" => form.fecha = Some(parse_fecha(&read_text(field).await?)?),
            "categoria" => form.categoria = Some(read_text(field).await?),
            "img_taller" => {
                let content_type = field.content_type().map(|ct| ct.to_string());
                let file_name = field.file_name().map(|n| n.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid image part: {}", e)))?;

                let path = uploads::save_image(
                    &state.config.uploads.dir,
                    uploads::WORKSHOP_SUBDIR,
                    content_type.as_deref(),
                    file_name.as_deref(),
                    &data,
                )
                .await?;
                form.img_taller = Some(path);
            }
            // Unknown parts are ignored
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field: {}", e)))
}

/// List all workshops, newest first
pub async fn list_workshops(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<Workshop>>>> {
    let workshops = Workshop::list(&state.db).await?;
    Ok(Json(DataResponse::new(workshops)))
}

/// Get one workshop by id
///
/// # Errors
///
/// - `404 Not Found`: No workshop with that id
pub async fn get_workshop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<Workshop>>> {
    let workshop = Workshop::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Workshop not found".to_string()))?;

    Ok(Json(DataResponse::new(workshop)))
}

/// Create a workshop (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Missing or invalid fields, rejected image, or
///   duplicate title
/// - `500 Internal Server Error`: Server error
pub async fn create_workshop(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = parse_workshop_form(&state, multipart).await?;

    let titulo = form
        .titulo
        .ok_or_else(|| field_error("titulo", "Title is required"))?;
    let descripcion = form
        .descripcion
        .ok_or_else(|| field_error("descripcion", "Description is required"))?;
    let precio = form
        .precio
        .ok_or_else(|| field_error("precio", "Price is required"))?;
    let fecha = form
        .fecha
        .ok_or_else(|| field_error("fecha", "Date is required"))?;
    let categoria = form
        .categoria
        .ok_or_else(|| field_error("categoria", "Category is required"))?;

    let workshop = Workshop::create(
        &state.db,
        CreateWorkshop {
            titulo,
            descripcion,
            precio,
            fecha,
            categoria,
            img_taller: form.img_taller,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(workshop))))
}

/// Update a workshop (admin)
///
/// Partial: absent parts keep their stored values, including the image.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid field values or duplicate title
/// - `404 Not Found`: No workshop with that id
pub async fn update_workshop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<DataResponse<Workshop>>> {
    let form = parse_workshop_form(&state, multipart).await?;

    let workshop = Workshop::update(
        &state.db,
        id,
        UpdateWorkshop {
            titulo: form.titulo,
            descripcion: form.descripcion,
            precio: form.precio,
            fecha: form.fecha,
            categoria: form.categoria,
            img_taller: form.img_taller,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Workshop not found".to_string()))?;

    Ok(Json(DataResponse::new(workshop)))
}

/// Delete a workshop (admin)
///
/// Enrollment rows referencing it are removed by the schema's cascade.
///
/// # Errors
///
/// - `404 Not Found`: No workshop with that id
pub async fn delete_workshop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let deleted = Workshop::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Workshop not found".to_string()));
    }

    Ok(Json(DeletedResponse {
        ok: true,
        msg: "Workshop deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_precio_accepts_zero_and_decimals() {
        assert_eq!(parse_precio("0").unwrap(), 0.0);
        assert_eq!(parse_precio("19.99").unwrap(), 19.99);
        assert_eq!(parse_precio(" 25 ").unwrap(), 25.0);
    }

    #[test]
    fn test_parse_precio_rejects_negative_and_garbage() {
        assert!(parse_precio("-1").is_err());
        assert!(parse_precio("gratis").is_err());
        assert!(parse_precio("NaN").is_err());
        assert!(parse_precio("inf").is_err());
    }

    #[test]
    fn test_parse_fecha() {
        assert_eq!(
            parse_fecha("2026-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
        assert!(parse_fecha("15/03/2026").is_err());
        assert!(parse_fecha("2026-13-01").is_err());
    }

    #[test]
    fn test_validate_titulo_minimum_length() {
        assert!(validate_titulo("ab").is_err());
        assert!(validate_titulo("  a  ").is_err());
        assert!(validate_titulo("Pintura").is_ok());
    }
}
