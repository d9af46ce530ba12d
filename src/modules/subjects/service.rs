use anyhow::anyhow;
use edudesk_core::pagination::like_pattern;
use edudesk_core::{AppError, ListParams, PaginationMeta};
use edudesk_models::ids::SubjectId;
use edudesk_models::subjects::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, UpdateSubjectDto, normalize_code,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::utils::{SqlFilters, map_write_error};

const SUBJECT_COLUMNS: &str = "id, name, code, description, created_at, updated_at";
const DUPLICATE_CODE: &str = "A subject with this code already exists";

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let query = format!(
            "INSERT INTO subjects (name, code, description) VALUES ($1, $2, $3) RETURNING {}",
            SUBJECT_COLUMNS
        );
        let subject = sqlx::query_as::<_, Subject>(&query)
            .bind(dto.name.trim())
            .bind(normalize_code(&dto.code))
            .bind(&dto.description)
            .fetch_one(db)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_CODE))?;

        Ok(subject)
    }

    #[instrument(skip(db))]
    pub async fn get_subjects(
        db: &PgPool,
        params: ListParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut filters = SqlFilters::new();
        filters.search(&["name", "code"], params.search.as_deref().map(like_pattern));
        let where_clause = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM subjects{}", where_clause);
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "SELECT {} FROM subjects{} ORDER BY name, code LIMIT {} OFFSET {}",
            SUBJECT_COLUMNS, where_clause, limit, offset
        );
        let subjects = filters
            .bind_as(sqlx::query_as::<_, Subject>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedSubjectsResponse {
            data: subjects,
            meta: PaginationMeta::for_params(&params.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &PgPool, id: SubjectId) -> Result<Subject, AppError> {
        let query = format!("SELECT {} FROM subjects WHERE id = $1", SUBJECT_COLUMNS);
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_subject(
        db: &PgPool,
        id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let existing = Self::get_subject(db, id).await?;

        let query = format!(
            r#"UPDATE subjects SET name = $1, code = $2, description = $3, updated_at = NOW()
               WHERE id = $4
               RETURNING {}"#,
            SUBJECT_COLUMNS
        );
        let subject = sqlx::query_as::<_, Subject>(&query)
            .bind(dto.name.map(|n| n.trim().to_string()).unwrap_or(existing.name))
            .bind(dto.code.as_deref().map(normalize_code).unwrap_or(existing.code))
            .bind(dto.description.or(existing.description))
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_CODE))?;

        Ok(subject)
    }

    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, id: SubjectId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Subject not found")));
        }
        Ok(())
    }
}
