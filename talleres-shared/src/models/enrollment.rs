/// Enrollment ledger
///
/// Links a user to a workshop with at most one enrollment per
/// (user, workshop) pair. The compound unique index
/// `enrollments_user_workshop_key` is the authoritative enforcement:
/// the handler's pre-check only produces a friendlier message and can
/// lose a race safely, because the losing insert still fails on the
/// constraint and surfaces the same conflict.
///
/// Reads and cancellations are scoped to the owning user. Cancellation
/// checks id and ownership in one combined lookup so a caller cannot
/// distinguish "exists but not yours" from "doesn't exist".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::workshop::Workshop;

/// Enrollment record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    /// Unique enrollment ID (UUID v4)
    pub id: Uuid,

    /// Enrolled user
    pub user_id: Uuid,

    /// Target workshop
    pub workshop_id: Uuid,

    /// When the enrollment was created
    pub enrolled_at: DateTime<Utc>,
}

/// An enrollment expanded with its workshop
///
/// A missing workshop (deleted after enrollment) yields `None` rather
/// than an error; the enrollment row still appears.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentWithWorkshop {
    pub id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub workshop: Option<Workshop>,
}

/// Flat row shape for the enrollment + workshop join
#[derive(Debug, sqlx::FromRow)]
struct EnrollmentJoinRow {
    id: Uuid,
    enrolled_at: DateTime<Utc>,
    w_id: Option<Uuid>,
    w_titulo: Option<String>,
    w_descripcion: Option<String>,
    w_precio: Option<f64>,
    w_fecha: Option<chrono::NaiveDate>,
    w_categoria: Option<String>,
    w_img_taller: Option<String>,
    w_created_at: Option<DateTime<Utc>>,
    w_updated_at: Option<DateTime<Utc>>,
}

impl From<EnrollmentJoinRow> for EnrollmentWithWorkshop {
    fn from(row: EnrollmentJoinRow) -> Self {
        // All workshop columns are NULL together when the join misses
        let workshop = match (
            row.w_id,
            row.w_titulo,
            row.w_descripcion,
            row.w_precio,
            row.w_fecha,
            row.w_categoria,
            row.w_created_at,
            row.w_updated_at,
        ) {
            (
                Some(id),
                Some(titulo),
                Some(descripcion),
                Some(precio),
                Some(fecha),
                Some(categoria),
                Some(created_at),
                Some(updated_at),
            ) => Some(Workshop {
                id,
                titulo,
                descripcion,
                precio,
                fecha,
                categoria,
                img_taller: row.w_img_taller,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            enrolled_at: row.enrolled_at,
            workshop,
        }
    }
}

impl Enrollment {
    /// Creates an enrollment for a (user, workshop) pair
    ///
    /// # Errors
    ///
    /// A duplicate pair fails on `enrollments_user_workshop_key`; a
    /// nonexistent workshop fails on the foreign key. Both surface as
    /// database errors for the API layer to map.
    pub async fn enroll(
        pool: &PgPool,
        user_id: Uuid,
        workshop_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (user_id, workshop_id)
            VALUES ($1, $2)
            RETURNING id, user_id, workshop_id, enrolled_at
            "#,
        )
        .bind(user_id)
        .bind(workshop_id)
        .fetch_one(pool)
        .await?;

        Ok(enrollment)
    }

    /// Checks whether an enrollment exists for the pair
    ///
    /// Pre-check only; the unique index is the authoritative rejection.
    pub async fn exists(
        pool: &PgPool,
        user_id: Uuid,
        workshop_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM enrollments
                WHERE user_id = $1 AND workshop_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(workshop_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the caller's enrollments, each with its workshop embedded
    ///
    /// One LEFT JOIN replaces a per-row secondary lookup; an enrollment
    /// whose workshop is gone still appears, with a null workshop.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<EnrollmentWithWorkshop>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EnrollmentJoinRow>(
            r#"
            SELECT e.id, e.enrolled_at,
                   w.id AS w_id, w.titulo AS w_titulo, w.descripcion AS w_descripcion,
                   w.precio AS w_precio, w.fecha AS w_fecha, w.categoria AS w_categoria,
                   w.img_taller AS w_img_taller, w.created_at AS w_created_at,
                   w.updated_at AS w_updated_at
            FROM enrollments e
            LEFT JOIN workshops w ON w.id = e.workshop_id
            WHERE e.user_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(EnrollmentWithWorkshop::from).collect())
    }

    /// Cancels an enrollment owned by the given user
    ///
    /// Id and ownership are checked in a single combined delete;
    /// a miss on either yields false and the caller maps it to 404.
    pub async fn cancel(
        pool: &PgPool,
        enrollment_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1 AND user_id = $2")
            .bind(enrollment_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn join_row(with_workshop: bool) -> EnrollmentJoinRow {
        let now = Utc::now();
        EnrollmentJoinRow {
            id: Uuid::new_v4(),
            enrolled_at: now,
            w_id: with_workshop.then(Uuid::new_v4),
            w_titulo: with_workshop.then(|| "Pintura".to_string()),
            w_descripcion: with_workshop.then(|| "Acuarela".to_string()),
            w_precio: with_workshop.then_some(20.0),
            w_fecha: with_workshop.then(|| NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()),
            w_categoria: with_workshop.then(|| "arte".to_string()),
            w_img_taller: None,
            w_created_at: with_workshop.then_some(now),
            w_updated_at: with_workshop.then_some(now),
        }
    }

    #[test]
    fn test_join_row_with_workshop() {
        let expanded = EnrollmentWithWorkshop::from(join_row(true));
        let workshop = expanded.workshop.expect("workshop should be present");
        assert_eq!(workshop.titulo, "Pintura");
        assert_eq!(workshop.precio, 20.0);
    }

    #[test]
    fn test_join_row_without_workshop_yields_null_field() {
        let expanded = EnrollmentWithWorkshop::from(join_row(false));
        assert!(expanded.workshop.is_none());

        // The row still serializes, with an explicit null workshop
        let json = serde_json::to_value(&expanded).unwrap();
        assert!(json["workshop"].is_null());
        assert!(json["id"].is_string());
    }
}
