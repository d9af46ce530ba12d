use anyhow::anyhow;
use edudesk_core::pagination::like_pattern;
use edudesk_core::{AppError, ListParams, PaginationMeta};
use edudesk_models::ids::TeacherId;
use edudesk_models::teachers::{
    CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::utils::{SqlFilters, map_write_error};

const TEACHER_COLUMNS: &str = "id, first_name, last_name, email, phone, qualification, \
     specialization, hire_date, created_at, updated_at";

const DUPLICATE_EMAIL: &str = "A teacher with this email already exists";

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, dto))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let query = format!(
            r#"INSERT INTO teachers (first_name, last_name, email, phone, qualification, specialization, hire_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {}"#,
            TEACHER_COLUMNS
        );
        let teacher = sqlx::query_as::<_, Teacher>(&query)
            .bind(dto.first_name.trim())
            .bind(dto.last_name.trim())
            .bind(dto.email.trim().to_lowercase())
            .bind(&dto.phone)
            .bind(&dto.qualification)
            .bind(&dto.specialization)
            .bind(dto.hire_date)
            .fetch_one(db)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_EMAIL))?;

        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        params: ListParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut filters = SqlFilters::new();
        filters.search(
            &[
                "first_name",
                "last_name",
                "email",
                "specialization",
                "(first_name || ' ' || last_name)",
            ],
            params.search.as_deref().map(like_pattern),
        );
        let where_clause = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM teachers{}", where_clause);
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "SELECT {} FROM teachers{} ORDER BY last_name, first_name, id LIMIT {} OFFSET {}",
            TEACHER_COLUMNS, where_clause, limit, offset
        );
        let teachers = filters
            .bind_as(sqlx::query_as::<_, Teacher>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedTeachersResponse {
            data: teachers,
            meta: PaginationMeta::for_params(&params.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: TeacherId) -> Result<Teacher, AppError> {
        let query = format!("SELECT {} FROM teachers WHERE id = $1", TEACHER_COLUMNS);
        sqlx::query_as::<_, Teacher>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let existing = Self::get_teacher(db, id).await?;

        let query = format!(
            r#"UPDATE teachers
               SET first_name = $1, last_name = $2, email = $3, phone = $4,
                   qualification = $5, specialization = $6, hire_date = $7, updated_at = NOW()
               WHERE id = $8
               RETURNING {}"#,
            TEACHER_COLUMNS
        );
        let teacher = sqlx::query_as::<_, Teacher>(&query)
            .bind(dto.first_name.map(|s| s.trim().to_string()).unwrap_or(existing.first_name))
            .bind(dto.last_name.map(|s| s.trim().to_string()).unwrap_or(existing.last_name))
            .bind(dto.email.map(|s| s.trim().to_lowercase()).unwrap_or(existing.email))
            .bind(dto.phone.or(existing.phone))
            .bind(dto.qualification.or(existing.qualification))
            .bind(dto.specialization.or(existing.specialization))
            .bind(dto.hire_date.or(existing.hire_date))
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_EMAIL))?;

        Ok(teacher)
    }

    /// Sections led by the teacher keep existing with no class teacher;
    /// timetable entries taught by the teacher are removed.
    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: TeacherId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }
        Ok(())
    }
}
