//! Classes, sections, subjects, teachers, buses and students.

use chrono::NaiveDate;
use edudesk_models::ids::{BusId, ClassId, SectionId, StudentId, SubjectId, TeacherId};
use fake::Fake;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{
    SEED_CLASS_DESCRIPTION, SEED_EMAIL_DOMAIN, SEED_PREFIX, SeededSection, StudentSeed, TeacherSeed,
};

const SUBJECTS: [(&str, &str); 8] = [
    ("Mathematics", "MATH"),
    ("English Language", "ENG"),
    ("Integrated Science", "SCI"),
    ("Social Studies", "SST"),
    ("Computer Studies", "ICT"),
    ("French", "FRE"),
    ("Physical Education", "PE"),
    ("Creative Arts", "ART"),
];

const SPECIALIZATIONS: [&str; 6] = [
    "Mathematics",
    "Languages",
    "Sciences",
    "Humanities",
    "Technology",
    "Arts",
];

/// Inserts `count` classes, each with `sections_per_class` sections named A, B, C...
pub async fn seed_classes(
    db: &PgPool,
    count: usize,
    sections_per_class: usize,
) -> Result<Vec<SeededSection>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🏫 Seeding {} classes with {} sections each...",
        count, sections_per_class
    );

    let mut tx = db.begin().await?;
    let mut sections = Vec::with_capacity(count * sections_per_class);

    for grade in 1..=count {
        let class_id = sqlx::query_scalar::<_, ClassId>(
            "INSERT INTO classes (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(format!("Grade {}", grade))
        .bind(SEED_CLASS_DESCRIPTION)
        .fetch_one(&mut *tx)
        .await?;

        for idx in 0..sections_per_class {
            let section_id = sqlx::query_scalar::<_, SectionId>(
                "INSERT INTO sections (class_id, name, capacity) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(class_id)
            .bind(section_name(idx))
            .bind(40_i32)
            .fetch_one(&mut *tx)
            .await?;
            sections.push(SeededSection {
                class_id,
                section_id,
            });
        }
    }

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} sections in {:?}",
        sections.len(),
        start_time.elapsed()
    );

    Ok(sections)
}

/// `A`..`Z`, then `S27`, `S28`...
fn section_name(idx: usize) -> String {
    match u8::try_from(idx) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => format!("S{}", idx + 1),
    }
}

pub async fn seed_subjects(db: &PgPool) -> Result<Vec<SubjectId>, Box<dyn std::error::Error>> {
    println!("📖 Seeding {} subjects...", SUBJECTS.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(SUBJECTS.len());
    for (name, code) in SUBJECTS {
        let id = sqlx::query_scalar::<_, SubjectId>(
            "INSERT INTO subjects (name, code) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(format!("{}{}", SEED_PREFIX, code))
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} subjects", ids.len());
    Ok(ids)
}

/// Generates teacher data in parallel using Rayon
pub fn generate_teachers(count: usize) -> Vec<TeacherSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+teacher{}{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                idx,
                SEED_EMAIL_DOMAIN
            );

            TeacherSeed {
                first_name,
                last_name,
                email,
                phone: PhoneNumber().fake(),
                specialization: SPECIALIZATIONS[idx % SPECIALIZATIONS.len()].to_string(),
            }
        })
        .collect()
}

pub async fn seed_teachers(
    db: &PgPool,
    count: usize,
) -> Result<Vec<TeacherId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("👩‍🏫 Seeding {} teachers...", count);

    let teachers = generate_teachers(count);
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(teachers.len());
    for teacher in &teachers {
        let id = sqlx::query_scalar::<_, TeacherId>(
            r#"INSERT INTO teachers (first_name, last_name, email, phone, specialization, hire_date)
               VALUES ($1, $2, $3, $4, $5, CURRENT_DATE)
               RETURNING id"#,
        )
        .bind(&teacher.first_name)
        .bind(&teacher.last_name)
        .bind(&teacher.email)
        .bind(&teacher.phone)
        .bind(&teacher.specialization)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn seed_buses(
    db: &PgPool,
    count: usize,
) -> Result<Vec<BusId>, Box<dyn std::error::Error>> {
    println!("🚌 Seeding {} buses...", count);

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(count);
    for idx in 0..count {
        let city: String = CityName().fake();
        let street: String = StreetName().fake();
        let driver_first: String = FirstName().fake();
        let driver_last: String = LastName().fake();
        let driver_phone: String = PhoneNumber().fake();

        let id = sqlx::query_scalar::<_, BusId>(
            r#"INSERT INTO buses (bus_number, route_name, driver_name, driver_phone, capacity)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(format!("{}BUS-{:02}", SEED_PREFIX, idx + 1))
        .bind(format!("{} via {}", city, street))
        .bind(format!("{} {}", driver_first, driver_last))
        .bind(driver_phone)
        .bind(45_i32)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} buses", ids.len());
    Ok(ids)
}

/// Generates students for every section; every third student rides a bus.
pub fn generate_students(
    sections: &[SeededSection],
    students_per_section: usize,
    bus_ids: &[BusId],
) -> Vec<StudentSeed> {
    sections
        .par_iter()
        .enumerate()
        .flat_map(|(section_idx, section)| {
            (0..students_per_section)
                .map(|student_idx| {
                    let bus_id = if bus_ids.is_empty() || student_idx % 3 != 0 {
                        None
                    } else {
                        Some(bus_ids[(section_idx + student_idx) % bus_ids.len()])
                    };
                    generate_student(*section, section_idx, student_idx, bus_id)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn generate_student(
    section: SeededSection,
    section_idx: usize,
    student_idx: usize,
    bus_id: Option<BusId>,
) -> StudentSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let guardian_first: String = FirstName().fake();
    let year: i32 = (2008..2019).fake();
    let month: u32 = (1..13).fake();
    let day: u32 = (1..29).fake();

    StudentSeed {
        guardian_name: format!("{} {}", guardian_first, last_name),
        guardian_phone: PhoneNumber().fake(),
        first_name,
        last_name,
        admission_number: format!("{}{:03}{:04}", SEED_PREFIX, section_idx, student_idx),
        gender: if student_idx % 2 == 0 { "female" } else { "male" },
        date_of_birth: NaiveDate::from_ymd_opt(year, month, day),
        class_id: section.class_id,
        section_id: section.section_id,
        bus_id,
    }
}

pub async fn seed_students(
    db: &PgPool,
    sections: &[SeededSection],
    students_per_section: usize,
    bus_ids: &[BusId],
) -> Result<Vec<StudentId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding {} students ({} per section)...",
        sections.len() * students_per_section,
        students_per_section
    );

    let students = generate_students(sections, students_per_section, bus_ids);

    // 10 params per student
    const BATCH_SIZE: usize = 500;

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        ids.extend(insert_students_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<Vec<StudentId>, Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO students (first_name, last_name, admission_number, gender, date_of_birth, \
         guardian_name, guardian_phone, class_id, section_id, bus_id) VALUES ",
    );

    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let base = i * 10;
        let placeholders: Vec<String> = (1..=10).map(|n| format!("${}", base + n)).collect();
        query.push_str(&format!("({})", placeholders.join(", ")));
    }
    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar::<_, StudentId>(&query);
    for student in students {
        q = q
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.admission_number)
            .bind(student.gender)
            .bind(student.date_of_birth)
            .bind(&student.guardian_name)
            .bind(&student.guardian_phone)
            .bind(student.class_id)
            .bind(student.section_id)
            .bind(student.bus_id);
    }

    let ids = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}
