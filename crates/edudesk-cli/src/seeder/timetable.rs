//! Periods and a draft weekly timetable.

use chrono::{Duration, NaiveTime};
use edudesk_models::ids::{PeriodId, SubjectId, TeacherId};
use edudesk_models::schedules::{DayOfWeek, ScheduleStatus};
use sqlx::PgPool;
use std::time::Instant;

use super::models::SeededSection;

const SCHOOL_DAYS: [DayOfWeek; 5] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
];

const PERIOD_MINUTES: i64 = 45;
const BREAK_MINUTES: i64 = 5;

/// Start and end of each period, back to back from 08:00 with short breaks.
pub fn period_times(count: usize) -> Vec<(NaiveTime, NaiveTime)> {
    let mut times = Vec::with_capacity(count);
    let Some(mut start) = NaiveTime::from_hms_opt(8, 0, 0) else {
        return times;
    };
    for _ in 0..count {
        let end = start + Duration::minutes(PERIOD_MINUTES);
        if end <= start {
            break;
        }
        times.push((start, end));
        start = end + Duration::minutes(BREAK_MINUTES);
    }
    times
}

pub async fn seed_periods(
    db: &PgPool,
    count: usize,
) -> Result<Vec<PeriodId>, Box<dyn std::error::Error>> {
    println!("⏰ Seeding {} periods...", count);

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(count);
    for (idx, (start, end)) in period_times(count).into_iter().enumerate() {
        let id = sqlx::query_scalar::<_, PeriodId>(
            r#"INSERT INTO periods (name, start_time, end_time, sort_order)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(format!("Period {}", idx + 1))
        .bind(start)
        .bind(end)
        .bind(idx as i32 + 1)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} periods", ids.len());
    Ok(ids)
}

/// One planned timetable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedEntry {
    pub day: DayOfWeek,
    pub period_idx: usize,
    pub section_idx: usize,
    pub subject_idx: usize,
    pub teacher_idx: usize,
}

/// Fills every section's week with subjects and teachers.
///
/// At a given day and period each section gets a different teacher, so the
/// plan is free of double bookings as long as there are at least as many
/// teachers as sections. Returns an empty plan otherwise.
pub fn plan_timetable(
    sections: usize,
    periods: usize,
    subjects: usize,
    teachers: usize,
) -> Vec<PlannedEntry> {
    if sections == 0 || subjects == 0 || teachers < sections {
        return Vec::new();
    }

    let mut plan = Vec::with_capacity(SCHOOL_DAYS.len() * periods * sections);
    for (day_idx, day) in SCHOOL_DAYS.into_iter().enumerate() {
        for period_idx in 0..periods {
            let shift = day_idx * periods + period_idx;
            for section_idx in 0..sections {
                plan.push(PlannedEntry {
                    day,
                    period_idx,
                    section_idx,
                    subject_idx: (section_idx + shift) % subjects,
                    teacher_idx: (section_idx + shift) % teachers,
                });
            }
        }
    }
    plan
}

/// Inserts a draft timetable for the seeded sections.
pub async fn seed_schedules(
    db: &PgPool,
    sections: &[SeededSection],
    period_ids: &[PeriodId],
    subject_ids: &[SubjectId],
    teacher_ids: &[TeacherId],
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let plan = plan_timetable(
        sections.len(),
        period_ids.len(),
        subject_ids.len(),
        teacher_ids.len(),
    );
    if plan.is_empty() {
        println!("⚠️  Skipping timetable: need at least one teacher per section");
        return Ok(0);
    }
    println!("🗓️  Seeding {} draft schedule entries...", plan.len());

    let mut tx = db.begin().await?;
    for entry in &plan {
        let section = sections[entry.section_idx];
        sqlx::query(
            r#"INSERT INTO schedules (day, period_id, class_id, section_id, subject_id, teacher_id, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(entry.day)
        .bind(period_ids[entry.period_idx])
        .bind(section.class_id)
        .bind(section.section_id)
        .bind(subject_ids[entry.subject_idx])
        .bind(teacher_ids[entry.teacher_idx])
        .bind(ScheduleStatus::Draft)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} schedule entries in {:?}",
        plan.len(),
        start_time.elapsed()
    );
    Ok(plan.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_period_times_are_ordered() {
        let times = period_times(3);
        assert_eq!(times.len(), 3);
        assert_eq!(times[0].0, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(times[0].1, NaiveTime::from_hms_opt(8, 45, 0).unwrap());
        assert_eq!(times[1].0, NaiveTime::from_hms_opt(8, 50, 0).unwrap());
        assert!(times.iter().all(|(start, end)| start < end));
    }

    #[test]
    fn test_plan_has_no_double_bookings() {
        let plan = plan_timetable(4, 6, 8, 5);
        assert_eq!(plan.len(), 5 * 6 * 4);

        let mut teacher_slots = HashSet::new();
        let mut section_slots = HashSet::new();
        for entry in &plan {
            assert!(teacher_slots.insert((entry.day, entry.period_idx, entry.teacher_idx)));
            assert!(section_slots.insert((entry.day, entry.period_idx, entry.section_idx)));
        }
    }

    #[test]
    fn test_plan_needs_enough_teachers() {
        assert!(plan_timetable(6, 6, 8, 5).is_empty());
        assert!(plan_timetable(0, 6, 8, 5).is_empty());
    }
}
