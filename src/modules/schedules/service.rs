use std::collections::HashMap;

use anyhow::anyhow;
use edudesk_core::{AppError, PaginationMeta};
use edudesk_models::ids::{ClassId, PeriodId, ScheduleId, SectionId};
use edudesk_models::schedules::{
    BulkScheduleUpdateDto, BulkScheduleUpdateResponse, ConflictKind, CreateScheduleDto,
    PaginatedSchedulesResponse, ScheduleChangeError, ScheduleChangeTracker, ScheduleConflict,
    ScheduleEntry, ScheduleField, ScheduleFilterParams, ScheduleSlot, ScheduleValidationReport,
    Timetable, TimetableParams, UpdateScheduleDto, UpdateScheduleStatusDto, ValidateSchedulesDto,
    build_timetable, describe_conflicts, detect_conflicts,
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::utils::{SqlFilters, map_db_error};

const SCHEDULE_SELECT: &str = r#"SELECT
        sc.id, sc.day, sc.period_id, sc.class_id, sc.section_id, sc.subject_id, sc.teacher_id,
        sc.room, sc.status,
        p.name AS period_name, p.sort_order AS period_sort_order, p.start_time, p.end_time,
        c.name AS class_name, sec.name AS section_name, sub.name AS subject_name,
        (t.first_name || ' ' || t.last_name) AS teacher_name,
        sc.created_at, sc.updated_at
    FROM schedules sc
    JOIN periods p ON p.id = sc.period_id
    JOIN classes c ON c.id = sc.class_id
    JOIN sections sec ON sec.id = sc.section_id
    JOIN subjects sub ON sub.id = sc.subject_id
    JOIN teachers t ON t.id = sc.teacher_id"#;

const SCHEDULE_ORDER: &str = "ORDER BY sc.day, p.sort_order, p.start_time, c.name, sec.name";

fn change_error(err: ScheduleChangeError) -> AppError {
    match err {
        ScheduleChangeError::UnknownEntry(_) => AppError::not_found(err),
        ScheduleChangeError::DuplicateEntry(_) => AppError::bad_request(err),
        ScheduleChangeError::InvalidStatusTransition { .. } => AppError::unprocessable(err),
    }
}

fn record_conflicts(conflicts: &[ScheduleConflict]) {
    let slot_taken = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::SlotTaken)
        .count();
    crate::metrics::track_schedule_conflicts("slot_taken", slot_taken);
    crate::metrics::track_schedule_conflicts(
        "teacher_double_booked",
        conflicts.len() - slot_taken,
    );
}

pub struct ScheduleService;

impl ScheduleService {
    /// Every slot must name a section of its class.
    async fn ensure_sections_match(
        conn: &mut PgConnection,
        slots: &[ScheduleSlot],
    ) -> Result<(), AppError> {
        let section_ids: Vec<SectionId> = slots.iter().map(|s| s.section_id).collect();
        let owners: HashMap<SectionId, ClassId> =
            sqlx::query_as::<_, (SectionId, ClassId)>(
                "SELECT id, class_id FROM sections WHERE id = ANY($1)",
            )
            .bind(section_ids)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .collect();

        for slot in slots {
            match owners.get(&slot.section_id) {
                None => return Err(AppError::bad_request(anyhow!("Section not found"))),
                Some(class_id) if *class_id != slot.class_id => {
                    return Err(AppError::bad_request(anyhow!(
                        "Section does not belong to the selected class"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Stored entries that occupy any of the periods the candidates use.
    async fn stored_slots(
        conn: &mut PgConnection,
        candidates: &[ScheduleSlot],
    ) -> Result<Vec<ScheduleSlot>, AppError> {
        let period_ids: Vec<PeriodId> = candidates.iter().map(|c| c.period_id).collect();
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            r#"SELECT id, day, period_id, class_id, section_id, subject_id, teacher_id,
                      room, status, created_at, updated_at
               FROM schedules
               WHERE period_id = ANY($1) AND status <> 'inactive'"#,
        )
        .bind(period_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(ScheduleSlot::from).collect())
    }

    async fn find_conflicts(
        conn: &mut PgConnection,
        candidates: &[ScheduleSlot],
    ) -> Result<Vec<ScheduleConflict>, AppError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        Self::ensure_sections_match(conn, candidates).await?;
        let stored = Self::stored_slots(conn, candidates).await?;
        Ok(detect_conflicts(candidates, &stored))
    }

    /// Holds a transaction-scoped advisory lock on every day and period the
    /// candidates occupy, so concurrent writers to one slot check in turn.
    async fn lock_slots(
        conn: &mut PgConnection,
        candidates: &[ScheduleSlot],
    ) -> Result<(), AppError> {
        let mut keys: Vec<String> = candidates
            .iter()
            .filter(|c| c.status.occupies_slot())
            .map(|c| format!("schedule-slot:{}:{}", c.day.as_str(), c.period_id))
            .collect();
        // Fixed order keeps two multi-slot writers from deadlocking.
        keys.sort();
        keys.dedup();

        for key in keys {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(key)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    /// `409` listing every conflict the candidates would introduce.
    ///
    /// Must run inside the write transaction: the slot locks taken here are
    /// held until it commits.
    async fn reject_conflicts(
        conn: &mut PgConnection,
        candidates: &[ScheduleSlot],
    ) -> Result<(), AppError> {
        Self::lock_slots(conn, candidates).await?;
        let conflicts = Self::find_conflicts(conn, candidates).await?;
        if conflicts.is_empty() {
            return Ok(());
        }

        record_conflicts(&conflicts);
        tracing::info!(count = conflicts.len(), "Rejected schedule change with conflicts");
        Err(AppError::conflict(anyhow!(
            "{}",
            describe_conflicts(&conflicts)
        )))
    }

    /// Loads the entries and locks their rows until the transaction ends.
    async fn lock_schedules(
        conn: &mut PgConnection,
        ids: &[ScheduleId],
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        let query = format!(
            "{} WHERE sc.id = ANY($1) ORDER BY sc.id FOR UPDATE OF sc",
            SCHEDULE_SELECT
        );
        let entries = sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(ids.to_vec())
            .fetch_all(&mut *conn)
            .await?;
        Ok(entries)
    }

    /// Writes the dirty columns of every dirty entry; clean entries are not touched.
    async fn persist_changes(
        conn: &mut PgConnection,
        tracker: &ScheduleChangeTracker,
    ) -> Result<usize, AppError> {
        let mut updated = 0;
        for (id, fields, dirty) in tracker.dirty_entries() {
            let assignments: Vec<String> = dirty
                .iter()
                .enumerate()
                .map(|(i, field)| format!("{} = ${}", field.column(), i + 1))
                .collect();
            let sql = format!(
                "UPDATE schedules SET {}, updated_at = NOW() WHERE id = ${}",
                assignments.join(", "),
                dirty.len() + 1
            );

            let mut query = sqlx::query(&sql);
            for field in dirty {
                query = match field {
                    ScheduleField::Day => query.bind(fields.day),
                    ScheduleField::PeriodId => query.bind(fields.period_id),
                    ScheduleField::ClassId => query.bind(fields.class_id),
                    ScheduleField::SectionId => query.bind(fields.section_id),
                    ScheduleField::SubjectId => query.bind(fields.subject_id),
                    ScheduleField::TeacherId => query.bind(fields.teacher_id),
                    ScheduleField::Room => query.bind(fields.room.clone()),
                    ScheduleField::Status => query.bind(fields.status),
                };
            }
            query
                .bind(id)
                .execute(&mut *conn)
                .await
                .map_err(map_db_error)?;
            updated += 1;
        }
        Ok(updated)
    }

    #[instrument(skip(db, dto), fields(day = %dto.day))]
    pub async fn create_schedule(
        db: &PgPool,
        dto: CreateScheduleDto,
    ) -> Result<ScheduleEntry, AppError> {
        let fields = dto.into_fields();
        let mut tx = db.begin().await?;

        let candidate = ScheduleSlot::from_fields(None, &fields);
        Self::reject_conflicts(&mut tx, &[candidate]).await?;

        let id = sqlx::query_scalar::<_, ScheduleId>(
            r#"INSERT INTO schedules (
                   day, period_id, class_id, section_id, subject_id, teacher_id, room, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(fields.day)
        .bind(fields.period_id)
        .bind(fields.class_id)
        .bind(fields.section_id)
        .bind(fields.subject_id)
        .bind(fields.teacher_id)
        .bind(&fields.room)
        .bind(fields.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await?;
        Self::get_schedule(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_schedules(
        db: &PgPool,
        filters: ScheduleFilterParams,
    ) -> Result<PaginatedSchedulesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut conditions = SqlFilters::new();
        conditions
            .eq_enum("sc.day", "day_of_week", filters.day.map(|d| d.as_str()))
            .eq_uuid("sc.class_id", filters.class_id)
            .eq_uuid("sc.section_id", filters.section_id)
            .eq_uuid("sc.teacher_id", filters.teacher_id)
            .eq_enum(
                "sc.status",
                "schedule_status",
                filters.status.map(|s| s.as_str()),
            );
        let where_clause = conditions.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM schedules sc{}", where_clause);
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} {} LIMIT {} OFFSET {}",
            SCHEDULE_SELECT, where_clause, SCHEDULE_ORDER, limit, offset
        );
        let entries = conditions
            .bind_as(sqlx::query_as::<_, ScheduleEntry>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedSchedulesResponse {
            data: entries,
            meta: PaginationMeta::for_params(&filters.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_schedule(db: &PgPool, id: ScheduleId) -> Result<ScheduleEntry, AppError> {
        let query = format!("{} WHERE sc.id = $1", SCHEDULE_SELECT);
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Schedule entry not found")))
    }

    /// Partial edit of one entry. An edit that restores every original
    /// value writes nothing.
    #[instrument(skip(db, dto))]
    pub async fn update_schedule(
        db: &PgPool,
        id: ScheduleId,
        dto: UpdateScheduleDto,
    ) -> Result<ScheduleEntry, AppError> {
        let mut tx = db.begin().await?;

        let stored = Self::lock_schedules(&mut tx, &[id]).await?;
        if stored.is_empty() {
            return Err(AppError::not_found(anyhow!("Schedule entry not found")));
        }

        let mut tracker = ScheduleChangeTracker::from_snapshot(&stored).map_err(change_error)?;
        tracker
            .apply_all(id, dto.changes())
            .map_err(change_error)?;

        if tracker.is_dirty() {
            let candidates: Vec<ScheduleSlot> = tracker
                .dirty_entries()
                .map(|(id, fields, _)| ScheduleSlot::from_fields(Some(id), fields))
                .collect();
            Self::reject_conflicts(&mut tx, &candidates).await?;
            Self::persist_changes(&mut tx, &tracker).await?;
        }

        tx.commit().await?;
        Self::get_schedule(db, id).await
    }

    /// Moves an entry along its lifecycle; activating re-checks its slot.
    #[instrument(skip(db))]
    pub async fn update_schedule_status(
        db: &PgPool,
        id: ScheduleId,
        dto: UpdateScheduleStatusDto,
    ) -> Result<ScheduleEntry, AppError> {
        Self::update_schedule(
            db,
            id,
            UpdateScheduleDto {
                status: Some(dto.status),
                ..Default::default()
            },
        )
        .await
    }

    /// Saves a batch of edited entries in one transaction.
    ///
    /// The stored rows are locked and used as the snapshot. Only fields that
    /// differ from it are written; entries with no effective change are
    /// counted as unchanged.
    #[instrument(skip(db, dto), fields(entries = dto.entries.len()))]
    pub async fn bulk_update_schedules(
        db: &PgPool,
        dto: BulkScheduleUpdateDto,
    ) -> Result<BulkScheduleUpdateResponse, AppError> {
        let mut ids: Vec<ScheduleId> = dto.entries.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();

        let mut tx = db.begin().await?;

        let stored = Self::lock_schedules(&mut tx, &ids).await?;
        let mut tracker = ScheduleChangeTracker::from_snapshot(&stored).map_err(change_error)?;
        for patch in &dto.entries {
            tracker
                .apply_all(patch.id, patch.update.changes())
                .map_err(change_error)?;
        }

        let candidates: Vec<ScheduleSlot> = tracker
            .dirty_entries()
            .map(|(id, fields, _)| ScheduleSlot::from_fields(Some(id), fields))
            .collect();
        Self::reject_conflicts(&mut tx, &candidates).await?;

        let changes = tracker.changes();
        let updated = Self::persist_changes(&mut tx, &tracker).await?;
        let unchanged = tracker.len() - updated;

        tx.commit().await?;
        crate::metrics::track_schedule_bulk_update(updated, unchanged);
        tracing::info!(updated, unchanged, "Saved schedule changes");

        let query = format!("{} WHERE sc.id = ANY($1) {}", SCHEDULE_SELECT, SCHEDULE_ORDER);
        let entries = sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(ids)
            .fetch_all(db)
            .await?;

        Ok(BulkScheduleUpdateResponse {
            updated,
            unchanged,
            changes,
            entries,
        })
    }

    /// Reports the conflicts proposed entries would cause, without saving.
    #[instrument(skip(db, dto), fields(entries = dto.entries.len()))]
    pub async fn validate_schedules(
        db: &PgPool,
        dto: ValidateSchedulesDto,
    ) -> Result<ScheduleValidationReport, AppError> {
        let candidates: Vec<ScheduleSlot> = dto
            .entries
            .iter()
            .map(|p| ScheduleSlot::from_fields(p.id, &p.fields))
            .collect();

        let mut conn = db.acquire().await?;
        let conflicts = Self::find_conflicts(&mut conn, &candidates).await?;
        record_conflicts(&conflicts);

        Ok(ScheduleValidationReport {
            valid: conflicts.is_empty(),
            conflicts,
        })
    }

    /// Weekly grid for a class (optionally one section) or a teacher.
    #[instrument(skip(db))]
    pub async fn get_timetable(db: &PgPool, params: TimetableParams) -> Result<Timetable, AppError> {
        if params.class_id.is_none() && params.section_id.is_none() && params.teacher_id.is_none()
        {
            return Err(AppError::bad_request(anyhow!(
                "class_id, section_id or teacher_id is required"
            )));
        }

        let mut conditions = SqlFilters::new();
        conditions
            .eq_uuid("sc.class_id", params.class_id)
            .eq_uuid("sc.section_id", params.section_id)
            .eq_uuid("sc.teacher_id", params.teacher_id);
        if !params.include_inactive {
            conditions.raw("sc.status <> 'inactive'");
        }

        let query = format!("{}{}", SCHEDULE_SELECT, conditions.where_sql());
        let entries = conditions
            .bind_as(sqlx::query_as::<_, ScheduleEntry>(&query))
            .fetch_all(db)
            .await?;

        Ok(build_timetable(entries))
    }

    #[instrument(skip(db))]
    pub async fn delete_schedule(db: &PgPool, id: ScheduleId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Schedule entry not found")));
        }
        Ok(())
    }
}
