//! Student domain models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use edudesk_core::serde::{deserialize_optional_parsed, deserialize_optional_trimmed, deserialize_some};
use edudesk_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::{BusId, ClassId, SectionId, StudentId};

/// A student record, joined with the names of its class, section and bus.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub admission_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub address: Option<String>,
    pub class_id: Option<ClassId>,
    pub section_id: Option<SectionId>,
    pub bus_id: Option<BusId>,
    #[sqlx(default)]
    pub class_name: Option<String>,
    #[sqlx(default)]
    pub section_name: Option<String>,
    #[sqlx(default)]
    pub bus_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_placement"))]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    pub admission_number: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 150))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 30))]
    pub guardian_phone: Option<String>,
    pub address: Option<String>,
    pub class_id: Option<ClassId>,
    pub section_id: Option<SectionId>,
    pub bus_id: Option<BusId>,
}

/// Partial update. Omitted fields keep their value. Every optional column
/// (contact details, guardian, assignments) may be sent as `null` to clear it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub admission_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = "email")]
    #[validate(email)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 30))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 150))]
    pub guardian_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 30))]
    pub guardian_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub class_id: Option<Option<ClassId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub section_id: Option<Option<SectionId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub bus_id: Option<Option<BusId>>,
}

/// Where a student sits once an update is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub class_id: Option<ClassId>,
    pub section_id: Option<SectionId>,
    pub bus_id: Option<BusId>,
}

impl Placement {
    /// Applies the assignment fields of `dto` on top of `self`.
    #[must_use]
    pub fn merged(self, dto: &UpdateStudentDto) -> Self {
        Self {
            class_id: dto.class_id.unwrap_or(self.class_id),
            section_id: dto.section_id.unwrap_or(self.section_id),
            bus_id: dto.bus_id.unwrap_or(self.bus_id),
        }
    }

    /// A section only makes sense inside a class.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.section_id.is_some() && self.class_id.is_none() {
            return Err(ValidationError::new("section_without_class")
                .with_message("section_id requires class_id".into()));
        }
        Ok(())
    }
}

impl From<&Student> for Placement {
    fn from(student: &Student) -> Self {
        Self {
            class_id: student.class_id,
            section_id: student.section_id,
            bus_id: student.bus_id,
        }
    }
}

fn validate_create_placement(dto: &CreateStudentDto) -> Result<(), ValidationError> {
    Placement {
        class_id: dto.class_id,
        section_id: dto.section_id,
        bus_id: dto.bus_id,
    }
    .check()
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Matches first name, last name, admission number or email
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub section_id: Option<SectionId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub bus_id: Option<BusId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateStudentDto {
        CreateStudentDto {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            admission_number: "ADM-0001".to_string(),
            email: Some("ada.obi@example.com".to_string()),
            phone: None,
            gender: Some("female".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(2012, 3, 14),
            guardian_name: Some("Ngozi Obi".to_string()),
            guardian_phone: Some("+2348000000000".to_string()),
            address: None,
            class_id: Some(ClassId::new()),
            section_id: Some(SectionId::new()),
            bus_id: None,
        }
    }

    #[test]
    fn test_create_student_dto_validation() {
        assert!(create_dto().validate().is_ok());
    }

    #[test]
    fn test_create_student_requires_names_and_admission_number() {
        let mut dto = create_dto();
        dto.first_name = String::new();
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.admission_number = "x".repeat(51);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_student_invalid_email() {
        let mut dto = create_dto();
        dto.email = Some("not-an-email".to_string());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_student_section_without_class() {
        let mut dto = create_dto();
        dto.class_id = None;
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("__all__"));
    }

    #[test]
    fn test_update_student_dto_empty_is_valid() {
        assert!(UpdateStudentDto::default().validate().is_ok());
    }

    #[test]
    fn test_update_dto_null_clears_assignment() {
        let dto: UpdateStudentDto = serde_json::from_str(r#"{"bus_id":null}"#).unwrap();
        assert_eq!(dto.bus_id, Some(None));
        assert_eq!(dto.class_id, None);
    }

    #[test]
    fn test_update_dto_null_clears_contact_fields() {
        let json = r#"{"guardian_name":null,"email":null,"phone":"0803"}"#;
        let dto: UpdateStudentDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.guardian_name, Some(None));
        assert_eq!(dto.email, Some(None));
        assert_eq!(dto.phone, Some(Some("0803".to_string())));
        assert_eq!(dto.address, None);
        assert_eq!(dto.date_of_birth, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_validates_present_contact_values() {
        let dto = UpdateStudentDto {
            email: Some(Some("not-an-email".to_string())),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateStudentDto {
            guardian_name: Some(Some("x".repeat(151))),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_placement_merge() {
        let class_id = ClassId::new();
        let section_id = SectionId::new();
        let bus_id = BusId::new();
        let current = Placement {
            class_id: Some(class_id),
            section_id: Some(section_id),
            bus_id: Some(bus_id),
        };

        let dto = UpdateStudentDto {
            bus_id: Some(None),
            ..Default::default()
        };
        let merged = current.merged(&dto);
        assert_eq!(merged.class_id, Some(class_id));
        assert_eq!(merged.section_id, Some(section_id));
        assert_eq!(merged.bus_id, None);
        assert!(merged.check().is_ok());

        let dto = UpdateStudentDto {
            class_id: Some(None),
            ..Default::default()
        };
        assert!(current.merged(&dto).check().is_err());
    }

    #[test]
    fn test_filter_params_blank_ids() {
        let json = r#"{"class_id":"","search":"","page":"2"}"#;
        let params: StudentFilterParams = serde_json::from_str(json).unwrap();
        assert!(params.class_id.is_none());
        assert!(params.search.is_none());
        assert_eq!(params.pagination.page(), Some(2));
    }
}
