//! Demo data seeding.
//!
//! Everything the seeder creates is recognizable afterwards: subject codes,
//! admission numbers and bus numbers start with [`SEED_PREFIX`], teachers use
//! the [`SEED_EMAIL_DOMAIN`] mail domain and classes carry
//! [`SEED_CLASS_DESCRIPTION`]. [`clear_all`] removes exactly those rows.

pub mod billing;
pub mod directory;
pub mod models;
pub mod timetable;

use sqlx::PgPool;
use std::time::Instant;

pub use models::{
    SEED_CLASS_DESCRIPTION, SEED_EMAIL_DOMAIN, SEED_PREFIX, SeedConfig, SeededSection,
};

/// Counts of what a seeding run created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub sections: usize,
    pub subjects: usize,
    pub teachers: usize,
    pub buses: usize,
    pub periods: usize,
    pub students: usize,
    pub schedules: usize,
    pub fees: usize,
}

pub async fn seed_all(
    db: &PgPool,
    config: SeedConfig,
) -> Result<SeedReport, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("\n🌱 Seeding demo data...\n");

    let sections = directory::seed_classes(db, config.classes, config.sections_per_class).await?;
    let subject_ids = directory::seed_subjects(db).await?;
    let teacher_ids = directory::seed_teachers(db, config.teachers).await?;
    let bus_ids = directory::seed_buses(db, config.buses).await?;
    let period_ids = timetable::seed_periods(db, config.periods).await?;
    let student_ids =
        directory::seed_students(db, &sections, config.students_per_section, &bus_ids).await?;

    let schedules = if config.with_schedules {
        timetable::seed_schedules(db, &sections, &period_ids, &subject_ids, &teacher_ids).await?
    } else {
        0
    };

    let fees = if config.with_fees {
        billing::seed_fees(db, &student_ids).await?.len()
    } else {
        0
    };

    let report = SeedReport {
        sections: sections.len(),
        subjects: subject_ids.len(),
        teachers: teacher_ids.len(),
        buses: bus_ids.len(),
        periods: period_ids.len(),
        students: student_ids.len(),
        schedules,
        fees,
    };

    println!("\n✅ Seeding completed in {:?}", start_time.elapsed());
    println!("   Sections:  {}", report.sections);
    println!("   Teachers:  {}", report.teachers);
    println!("   Students:  {}", report.students);
    println!("   Schedules: {}", report.schedules);
    println!("   Fees:      {}", report.fees);

    Ok(report)
}

/// Deletes seeded rows. Fees, payments and schedule entries go with their
/// students, classes and teachers; periods are removed once nothing uses them.
pub async fn clear_all(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let like_prefix = format!("{}%", SEED_PREFIX);
    let like_email = format!("%{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;
    let mut deleted = 0;

    deleted += sqlx::query("DELETE FROM students WHERE admission_number LIKE $1")
        .bind(&like_prefix)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    deleted += sqlx::query("DELETE FROM classes WHERE description = $1")
        .bind(SEED_CLASS_DESCRIPTION)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    deleted += sqlx::query("DELETE FROM teachers WHERE email LIKE $1")
        .bind(&like_email)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    deleted += sqlx::query("DELETE FROM subjects WHERE code LIKE $1")
        .bind(&like_prefix)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    deleted += sqlx::query("DELETE FROM buses WHERE bus_number LIKE $1")
        .bind(&like_prefix)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    deleted += sqlx::query(
        r#"DELETE FROM periods p
           WHERE p.name LIKE 'Period %'
             AND NOT EXISTS (SELECT 1 FROM schedules s WHERE s.period_id = p.id)"#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    println!(
        "   ✓ Deleted {} rows in {:?}",
        deleted,
        start_time.elapsed()
    );
    Ok(deleted)
}
