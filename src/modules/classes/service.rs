use anyhow::anyhow;
use edudesk_core::pagination::like_pattern;
use edudesk_core::{AppError, ListParams, PaginationMeta};
use edudesk_models::classes::{
    Class, ClassWithStats, CreateClassDto, CreateSectionDto, PaginatedClassesResponse,
    PaginatedSectionsResponse, Section, SectionFilterParams, UpdateClassDto, UpdateSectionDto,
};
use edudesk_models::ids::{ClassId, SectionId};
use sqlx::PgPool;
use tracing::instrument;

use crate::utils::{SqlFilters, map_write_error};

const CLASS_WITH_STATS_SELECT: &str = r#"SELECT
        c.id, c.name, c.description,
        (SELECT COUNT(*) FROM sections sec WHERE sec.class_id = c.id) AS section_count,
        (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS student_count,
        c.created_at, c.updated_at
    FROM classes c"#;

const SECTION_SELECT: &str = r#"SELECT
        sec.id, sec.class_id, sec.name, sec.capacity, sec.class_teacher_id,
        c.name AS class_name,
        (SELECT COUNT(*) FROM students s WHERE s.section_id = sec.id) AS student_count,
        sec.created_at, sec.updated_at
    FROM sections sec
    JOIN classes c ON c.id = sec.class_id"#;

const DUPLICATE_CLASS: &str = "A class with this name already exists";
const DUPLICATE_SECTION: &str = "A section with this name already exists in this class";

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, dto))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<Class, AppError> {
        let class = sqlx::query_as::<_, Class>(
            r#"INSERT INTO classes (name, description)
               VALUES ($1, $2)
               RETURNING id, name, description, created_at, updated_at"#,
        )
        .bind(dto.name.trim())
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_CLASS))?;

        Ok(class)
    }

    #[instrument(skip(db))]
    pub async fn get_classes(
        db: &PgPool,
        params: ListParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut filters = SqlFilters::new();
        filters.search(&["c.name"], params.search.as_deref().map(like_pattern));
        let where_clause = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM classes c{}", where_clause);
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} ORDER BY c.name, c.id LIMIT {} OFFSET {}",
            CLASS_WITH_STATS_SELECT, where_clause, limit, offset
        );
        let classes = filters
            .bind_as(sqlx::query_as::<_, ClassWithStats>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedClassesResponse {
            data: classes,
            meta: PaginationMeta::for_params(&params.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, id: ClassId) -> Result<ClassWithStats, AppError> {
        let query = format!("{} WHERE c.id = $1", CLASS_WITH_STATS_SELECT);
        sqlx::query_as::<_, ClassWithStats>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))
    }

    #[instrument(skip(db))]
    async fn ensure_class_exists(db: &PgPool, id: ClassId) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await?;
        if !exists {
            return Err(AppError::not_found(anyhow!("Class not found")));
        }
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_class(
        db: &PgPool,
        id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let existing = sqlx::query_as::<_, Class>(
            "SELECT id, name, description, created_at, updated_at FROM classes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))?;

        let class = sqlx::query_as::<_, Class>(
            r#"UPDATE classes SET name = $1, description = $2, updated_at = NOW()
               WHERE id = $3
               RETURNING id, name, description, created_at, updated_at"#,
        )
        .bind(dto.name.map(|n| n.trim().to_string()).unwrap_or(existing.name))
        .bind(dto.description.or(existing.description))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_CLASS))?;

        Ok(class)
    }

    /// Sections and timetable entries of the class go with it; students stay
    /// enrolled without a class.
    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, id: ClassId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Class not found")));
        }
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn create_section(
        db: &PgPool,
        class_id: ClassId,
        dto: CreateSectionDto,
    ) -> Result<Section, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let id = sqlx::query_scalar::<_, SectionId>(
            r#"INSERT INTO sections (class_id, name, capacity, class_teacher_id)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(class_id)
        .bind(dto.name.trim())
        .bind(dto.capacity)
        .bind(dto.class_teacher_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_SECTION))?;

        Self::get_section(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_sections(
        db: &PgPool,
        params: SectionFilterParams,
    ) -> Result<PaginatedSectionsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut filters = SqlFilters::new();
        filters
            .eq_uuid("sec.class_id", params.class_id)
            .search(&["sec.name"], params.search.as_deref().map(like_pattern));
        let where_clause = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM sections sec{}", where_clause);
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} ORDER BY c.name, sec.name, sec.id LIMIT {} OFFSET {}",
            SECTION_SELECT, where_clause, limit, offset
        );
        let sections = filters
            .bind_as(sqlx::query_as::<_, Section>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedSectionsResponse {
            data: sections,
            meta: PaginationMeta::for_params(&params.pagination, total),
        })
    }

    /// Sections of one class; `404` when the class does not exist.
    #[instrument(skip(db))]
    pub async fn get_class_sections(
        db: &PgPool,
        class_id: ClassId,
        params: ListParams,
    ) -> Result<PaginatedSectionsResponse, AppError> {
        Self::ensure_class_exists(db, class_id).await?;
        Self::get_sections(
            db,
            SectionFilterParams {
                class_id: Some(class_id),
                search: params.search,
                pagination: params.pagination,
            },
        )
        .await
    }

    #[instrument(skip(db))]
    pub async fn get_section(db: &PgPool, id: SectionId) -> Result<Section, AppError> {
        let query = format!("{} WHERE sec.id = $1", SECTION_SELECT);
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Section not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_section(
        db: &PgPool,
        id: SectionId,
        dto: UpdateSectionDto,
    ) -> Result<Section, AppError> {
        let existing = Self::get_section(db, id).await?;

        sqlx::query(
            r#"UPDATE sections
               SET name = $1, capacity = $2, class_teacher_id = $3, updated_at = NOW()
               WHERE id = $4"#,
        )
        .bind(dto.name.map(|n| n.trim().to_string()).unwrap_or(existing.name))
        .bind(dto.capacity.or(existing.capacity))
        .bind(dto.class_teacher_id.or(existing.class_teacher_id))
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_SECTION))?;

        Self::get_section(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_section(db: &PgPool, id: SectionId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Section not found")));
        }
        Ok(())
    }
}
