/// Workshop model and database operations
///
/// Workshops are publicly readable; create/update/delete is gated to
/// admin identities at the middleware layer. The title is unique and
/// the price is non-negative, both enforced by the schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workshop offering record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workshop {
    /// Unique workshop ID (UUID v4)
    pub id: Uuid,

    /// Title, unique across all workshops
    pub titulo: String,

    /// Description
    pub descripcion: String,

    /// Price, >= 0
    pub precio: f64,

    /// Workshop date
    pub fecha: NaiveDate,

    /// Category
    pub categoria: String,

    /// Server-relative image path (e.g. `/uploads/talleres/...`)
    pub img_taller: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new workshop
#[derive(Debug, Clone)]
pub struct CreateWorkshop {
    pub titulo: String,
    pub descripcion: String,
    pub precio: f64,
    pub fecha: NaiveDate,
    pub categoria: String,
    pub img_taller: Option<String>,
}

/// Input for updating an existing workshop
///
/// Only `Some` fields are written; an absent image field keeps the
/// stored image path.
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkshop {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
    pub fecha: Option<NaiveDate>,
    pub categoria: Option<String>,
    pub img_taller: Option<String>,
}

impl Workshop {
    /// Creates a new workshop
    ///
    /// # Errors
    ///
    /// Returns an error if the title already exists or the price check
    /// fails.
    pub async fn create(pool: &PgPool, data: CreateWorkshop) -> Result<Self, sqlx::Error> {
        let workshop = sqlx::query_as::<_, Workshop>(
            r#"
            INSERT INTO workshops (titulo, descripcion, precio, fecha, categoria, img_taller)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, titulo, descripcion, precio, fecha, categoria, img_taller,
                      created_at, updated_at
            "#,
        )
        .bind(data.titulo)
        .bind(data.descripcion)
        .bind(data.precio)
        .bind(data.fecha)
        .bind(data.categoria)
        .bind(data.img_taller)
        .fetch_one(pool)
        .await?;

        Ok(workshop)
    }

    /// Finds a workshop by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let workshop = sqlx::query_as::<_, Workshop>(
            r#"
            SELECT id, titulo, descripcion, precio, fecha, categoria, img_taller,
                   created_at, updated_at
            FROM workshops
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(workshop)
    }

    /// Lists all workshops, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let workshops = sqlx::query_as::<_, Workshop>(
            r#"
            SELECT id, titulo, descripcion, precio, fecha, categoria, img_taller,
                   created_at, updated_at
            FROM workshops
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(workshops)
    }

    /// Updates an existing workshop
    ///
    /// # Returns
    ///
    /// The updated workshop, or None if the id does not resolve
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateWorkshop,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE workshops SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.titulo.is_some() {
            bind_count += 1;
            query.push_str(&format!(", titulo = ${}", bind_count));
        }
        if data.descripcion.is_some() {
            bind_count += 1;
            query.push_str(&format!(", descripcion = ${}", bind_count));
        }
        if data.precio.is_some() {
            bind_count += 1;
            query.push_str(&format!(", precio = ${}", bind_count));
        }
        if data.fecha.is_some() {
            bind_count += 1;
            query.push_str(&format!(", fecha = ${}", bind_count));
        }
        if data.categoria.is_some() {
            bind_count += 1;
            query.push_str(&format!(", categoria = ${}", bind_count));
        }
        if data.img_taller.is_some() {
            bind_count += 1;
            query.push_str(&format!(", img_taller = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, titulo, descripcion, precio, fecha, categoria, \
             img_taller, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Workshop>(&query).bind(id);

        if let Some(titulo) = data.titulo {
            q = q.bind(titulo);
        }
        if let Some(descripcion) = data.descripcion {
            q = q.bind(descripcion);
        }
        if let Some(precio) = data.precio {
            q = q.bind(precio);
        }
        if let Some(fecha) = data.fecha {
            q = q.bind(fecha);
        }
        if let Some(categoria) = data.categoria {
            q = q.bind(categoria);
        }
        if let Some(img_taller) = data.img_taller {
            q = q.bind(img_taller);
        }

        let workshop = q.fetch_optional(pool).await?;

        Ok(workshop)
    }

    /// Deletes a workshop by ID
    ///
    /// # Returns
    ///
    /// True if a workshop was deleted, false if the id did not resolve
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workshops WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
