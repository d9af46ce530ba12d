//! Class (grade) and section models and DTOs.
//!
//! A class such as "Grade 5" is split into sections ("A", "B", ...). Section
//! names are unique within their class.

use chrono::{DateTime, Utc};
use edudesk_core::serde::{deserialize_optional_parsed, deserialize_optional_trimmed};
use edudesk_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{ClassId, SectionId, TeacherId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassWithStats {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    pub section_count: i64,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<ClassWithStats>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Section {
    pub id: SectionId,
    pub class_id: ClassId,
    pub name: String,
    pub capacity: Option<i32>,
    pub class_teacher_id: Option<TeacherId>,
    #[sqlx(default)]
    pub class_name: Option<String>,
    #[sqlx(default)]
    pub student_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for `POST /classes/{id}/sections`; the class comes from the path.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSectionDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub class_teacher_id: Option<TeacherId>,
}

/// Body for `POST /sections`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSectionWithClassDto {
    pub class_id: ClassId,
    #[serde(flatten)]
    #[validate(nested)]
    pub section: CreateSectionDto,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSectionDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub class_teacher_id: Option<TeacherId>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SectionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub class_id: Option<ClassId>,
    /// Matches the section name
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSectionsResponse {
    pub data: Vec<Section>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_class_dto_validation() {
        let valid = CreateClassDto {
            name: "Grade 5".to_string(),
            description: None,
        };
        assert!(valid.validate().is_ok());

        let long_name = CreateClassDto {
            name: "x".repeat(101),
            description: None,
        };
        assert!(long_name.validate().is_err());
    }

    #[test]
    fn test_create_section_dto_capacity() {
        let zero = CreateSectionDto {
            name: "A".to_string(),
            capacity: Some(0),
            class_teacher_id: None,
        };
        assert!(zero.validate().is_err());

        let ok = CreateSectionDto {
            name: "A".to_string(),
            capacity: Some(35),
            class_teacher_id: None,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_create_section_with_class_is_flat_json() {
        let class_id = ClassId::new();
        let json = format!(r#"{{"class_id":"{}","name":"B","capacity":30}}"#, class_id);
        let dto: CreateSectionWithClassDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.class_id, class_id);
        assert_eq!(dto.section.name, "B");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_section_with_class_validates_nested() {
        let json = format!(r#"{{"class_id":"{}","name":""}}"#, ClassId::new());
        let dto: CreateSectionWithClassDto = serde_json::from_str(&json).unwrap();
        assert!(dto.validate().is_err());
    }
}
