/// Singleton homepage content
///
/// The home document is a genuine singleton: every writer upserts the
/// fixed well-known id, so there is no "most recent instance" ambiguity
/// and concurrent edits cannot produce competing rows.
///
/// Updates are partial: an absent field keeps the stored value (the
/// COALESCE over a bound NULL), while an explicit empty string
/// overwrites. Absence and emptiness are distinct cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Fixed id of the singleton home document
pub fn home_content_id() -> Uuid {
    Uuid::nil()
}

/// Homepage content: a title plus up to three image/title card pairs
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HomeContent {
    pub id: Uuid,
    pub titulo: Option<String>,
    pub portada: Option<String>,
    pub card1_titulo: Option<String>,
    pub card1_imagen: Option<String>,
    pub card2_titulo: Option<String>,
    pub card2_imagen: Option<String>,
    pub card3_titulo: Option<String>,
    pub card3_imagen: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for the home document
///
/// `None` keeps the stored value; `Some("")` clears a field to empty.
#[derive(Debug, Clone, Default)]
pub struct UpdateHomeContent {
    pub titulo: Option<String>,
    pub portada: Option<String>,
    pub card1_titulo: Option<String>,
    pub card1_imagen: Option<String>,
    pub card2_titulo: Option<String>,
    pub card2_imagen: Option<String>,
    pub card3_titulo: Option<String>,
    pub card3_imagen: Option<String>,
}

impl HomeContent {
    /// Gets the singleton home document, if it has ever been written
    pub async fn get(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let content = sqlx::query_as::<_, HomeContent>(
            r#"
            SELECT id, titulo, portada,
                   card1_titulo, card1_imagen,
                   card2_titulo, card2_imagen,
                   card3_titulo, card3_imagen,
                   created_at, updated_at
            FROM home_content
            WHERE id = $1
            "#,
        )
        .bind(home_content_id())
        .fetch_optional(pool)
        .await?;

        Ok(content)
    }

    /// Upserts the singleton home document
    ///
    /// Update-if-exists-else-create by the fixed id in one statement;
    /// absent fields keep their stored values.
    pub async fn upsert(pool: &PgPool, data: UpdateHomeContent) -> Result<Self, sqlx::Error> {
        let content = sqlx::query_as::<_, HomeContent>(
            r#"
            INSERT INTO home_content (id, titulo, portada,
                                      card1_titulo, card1_imagen,
                                      card2_titulo, card2_imagen,
                                      card3_titulo, card3_imagen)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                titulo       = COALESCE(EXCLUDED.titulo, home_content.titulo),
                portada      = COALESCE(EXCLUDED.portada, home_content.portada),
                card1_titulo = COALESCE(EXCLUDED.card1_titulo, home_content.card1_titulo),
                card1_imagen = COALESCE(EXCLUDED.card1_imagen, home_content.card1_imagen),
                card2_titulo = COALESCE(EXCLUDED.card2_titulo, home_content.card2_titulo),
                card2_imagen = COALESCE(EXCLUDED.card2_imagen, home_content.card2_imagen),
                card3_titulo = COALESCE(EXCLUDED.card3_titulo, home_content.card3_titulo),
                card3_imagen = COALESCE(EXCLUDED.card3_imagen, home_content.card3_imagen),
                updated_at   = NOW()
            RETURNING id, titulo, portada,
                      card1_titulo, card1_imagen,
                      card2_titulo, card2_imagen,
                      card3_titulo, card3_imagen,
                      created_at, updated_at
            "#,
        )
        .bind(home_content_id())
        .bind(data.titulo)
        .bind(data.portada)
        .bind(data.card1_titulo)
        .bind(data.card1_imagen)
        .bind(data.card2_titulo)
        .bind(data.card2_imagen)
        .bind(data.card3_titulo)
        .bind(data.card3_imagen)
        .fetch_one(pool)
        .await?;

        Ok(content)
    }
}
