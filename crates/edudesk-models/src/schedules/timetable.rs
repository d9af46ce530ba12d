//! Weekly timetable view.

use serde::Serialize;
use utoipa::ToSchema;

use super::{DayOfWeek, ScheduleEntry};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimetableDay {
    pub day: DayOfWeek,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Timetable {
    pub days: Vec<TimetableDay>,
}

/// Groups entries by weekday (Monday first), each day ordered by period
/// sort order then start time. Days without entries are left out.
pub fn build_timetable(mut entries: Vec<ScheduleEntry>) -> Timetable {
    entries.sort_by(|a, b| {
        a.day
            .cmp(&b.day)
            .then(a.period_sort_order.cmp(&b.period_sort_order))
            .then(a.start_time.cmp(&b.start_time))
    });

    let mut days: Vec<TimetableDay> = Vec::new();
    for entry in entries {
        match days.last_mut() {
            Some(current) if current.day == entry.day => current.entries.push(entry),
            _ => days.push(TimetableDay {
                day: entry.day,
                entries: vec![entry],
            }),
        }
    }
    Timetable { days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ClassId, PeriodId, ScheduleId, SectionId, SubjectId, TeacherId};
    use crate::schedules::ScheduleStatus;
    use chrono::{NaiveTime, Utc};

    fn entry(day: DayOfWeek, sort_order: i32, hour: u32) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleId::new(),
            day,
            period_id: PeriodId::new(),
            class_id: ClassId::new(),
            section_id: SectionId::new(),
            subject_id: SubjectId::new(),
            teacher_id: TeacherId::new(),
            room: None,
            status: ScheduleStatus::Active,
            period_name: None,
            period_sort_order: Some(sort_order),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0),
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0),
            class_name: None,
            section_name: None,
            subject_name: None,
            teacher_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_groups_by_day_in_week_order() {
        let timetable = build_timetable(vec![
            entry(DayOfWeek::Wednesday, 1, 8),
            entry(DayOfWeek::Monday, 2, 9),
            entry(DayOfWeek::Monday, 1, 8),
        ]);

        let days: Vec<_> = timetable.days.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![DayOfWeek::Monday, DayOfWeek::Wednesday]);

        let monday: Vec<_> = timetable.days[0]
            .entries
            .iter()
            .map(|e| e.period_sort_order)
            .collect();
        assert_eq!(monday, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_start_time_breaks_sort_order_ties() {
        let timetable = build_timetable(vec![
            entry(DayOfWeek::Friday, 1, 10),
            entry(DayOfWeek::Friday, 1, 8),
        ]);
        let hours: Vec<_> = timetable.days[0]
            .entries
            .iter()
            .map(|e| e.start_time)
            .collect();
        assert_eq!(
            hours,
            vec![NaiveTime::from_hms_opt(8, 0, 0), NaiveTime::from_hms_opt(10, 0, 0)]
        );
    }

    #[test]
    fn test_empty_timetable() {
        assert!(build_timetable(Vec::new()).days.is_empty());
    }
}
