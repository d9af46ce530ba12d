use anyhow::anyhow;
use edudesk_core::{AppError, PaginationMeta};
use edudesk_models::ids::{ClassId, SectionId, StudentId};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, Placement, Student, StudentFilterParams,
    UpdateStudentDto,
};
use crate::utils::{SqlFilters, map_write_error};

const STUDENT_SELECT: &str = r#"SELECT
        s.id, s.first_name, s.last_name, s.admission_number, s.email, s.phone, s.gender,
        s.date_of_birth, s.guardian_name, s.guardian_phone, s.address,
        s.class_id, s.section_id, s.bus_id,
        c.name AS class_name, sec.name AS section_name, b.bus_number,
        s.created_at, s.updated_at
    FROM students s
    LEFT JOIN classes c ON c.id = s.class_id
    LEFT JOIN sections sec ON sec.id = s.section_id
    LEFT JOIN buses b ON b.id = s.bus_id"#;

const DUPLICATE_ADMISSION: &str = "A student with this admission number already exists";

pub struct StudentService;

impl StudentService {
    /// Rejects a section that is missing or belongs to another class.
    #[instrument(skip(db))]
    pub async fn ensure_section_in_class(
        db: &PgPool,
        class_id: Option<ClassId>,
        section_id: Option<SectionId>,
    ) -> Result<(), AppError> {
        let Some(section_id) = section_id else {
            return Ok(());
        };
        let Some(class_id) = class_id else {
            return Err(AppError::bad_request(anyhow!(
                "section_id requires class_id"
            )));
        };

        let owner = sqlx::query_scalar::<_, ClassId>("SELECT class_id FROM sections WHERE id = $1")
            .bind(section_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow!("Section not found")))?;

        if owner != class_id {
            return Err(AppError::bad_request(anyhow!(
                "Section does not belong to the selected class"
            )));
        }
        Ok(())
    }

    #[instrument(skip(db, dto), fields(admission_number = %dto.admission_number))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        Self::ensure_section_in_class(db, dto.class_id, dto.section_id).await?;

        let id = sqlx::query_scalar::<_, StudentId>(
            r#"INSERT INTO students (
                   first_name, last_name, admission_number, email, phone, gender, date_of_birth,
                   guardian_name, guardian_phone, address, class_id, section_id, bus_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
               RETURNING id"#,
        )
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.admission_number.trim())
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.gender)
        .bind(dto.date_of_birth)
        .bind(&dto.guardian_name)
        .bind(&dto.guardian_phone)
        .bind(&dto.address)
        .bind(dto.class_id)
        .bind(dto.section_id)
        .bind(dto.bus_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_ADMISSION))?;

        crate::metrics::track_student_enrolled();
        Self::get_student(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut conditions = SqlFilters::new();
        conditions
            .eq_uuid("s.class_id", filters.class_id)
            .eq_uuid("s.section_id", filters.section_id)
            .eq_uuid("s.bus_id", filters.bus_id)
            .search(
                &[
                    "s.first_name",
                    "s.last_name",
                    "s.admission_number",
                    "s.email",
                    "(s.first_name || ' ' || s.last_name)",
                ],
                filters.search.as_deref().map(edudesk_core::pagination::like_pattern),
            );
        let where_clause = conditions.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM students s{}", where_clause);
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} ORDER BY s.last_name, s.first_name, s.id LIMIT {} OFFSET {}",
            STUDENT_SELECT, where_clause, limit, offset
        );
        let students = conditions
            .bind_as(sqlx::query_as::<_, Student>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::for_params(&filters.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        let query = format!("{} WHERE s.id = $1", STUDENT_SELECT);
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student(db, id).await?;

        let placement = Placement::from(&existing).merged(&dto);
        placement
            .check()
            .map_err(|e| AppError::bad_request(anyhow!("{}", e)))?;
        Self::ensure_section_in_class(db, placement.class_id, placement.section_id).await?;

        sqlx::query(
            r#"UPDATE students
               SET first_name = $1, last_name = $2, admission_number = $3, email = $4,
                   phone = $5, gender = $6, date_of_birth = $7, guardian_name = $8,
                   guardian_phone = $9, address = $10, class_id = $11, section_id = $12,
                   bus_id = $13, updated_at = NOW()
               WHERE id = $14"#,
        )
        .bind(dto.first_name.as_deref().map(str::trim).unwrap_or(&existing.first_name))
        .bind(dto.last_name.as_deref().map(str::trim).unwrap_or(&existing.last_name))
        .bind(
            dto.admission_number
                .as_deref()
                .map(str::trim)
                .unwrap_or(&existing.admission_number),
        )
        .bind(dto.email.unwrap_or(existing.email))
        .bind(dto.phone.unwrap_or(existing.phone))
        .bind(dto.gender.unwrap_or(existing.gender))
        .bind(dto.date_of_birth.unwrap_or(existing.date_of_birth))
        .bind(dto.guardian_name.unwrap_or(existing.guardian_name))
        .bind(dto.guardian_phone.unwrap_or(existing.guardian_phone))
        .bind(dto.address.unwrap_or(existing.address))
        .bind(placement.class_id)
        .bind(placement.section_id)
        .bind(placement.bus_id)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_ADMISSION))?;

        Self::get_student(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }
        Ok(())
    }
}
