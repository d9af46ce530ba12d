//! Timetable period models and DTOs.
//!
//! A period is a named time slot of the school day ("Period 1", 08:00-08:45).
//! Periods are ordered by `sort_order`, then by start time.

use chrono::{DateTime, NaiveTime, Utc};
use edudesk_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::PeriodId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Period {
    pub id: PeriodId,
    pub name: String,
    #[schema(value_type = String, example = "08:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "08:45:00")]
    pub end_time: NaiveTime,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_times"))]
pub struct CreatePeriodDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[schema(value_type = String, example = "08:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "08:45")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePeriodDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedPeriodsResponse {
    pub data: Vec<Period>,
    pub meta: PaginationMeta,
}

/// Checks that a period starts before it ends.
pub fn check_period_times(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::new("period_times")
            .with_message("start_time must be before end_time".into()));
    }
    Ok(())
}

fn validate_create_times(dto: &CreatePeriodDto) -> Result<(), ValidationError> {
    check_period_times(dto.start_time, dto.end_time)
}
