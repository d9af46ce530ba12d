//! School bus models and DTOs.

use chrono::{DateTime, Utc};
use edudesk_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::BusId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Bus {
    pub id: BusId,
    pub bus_number: String,
    pub route_name: String,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub capacity: Option<i32>,
    #[sqlx(default)]
    pub student_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBusDto {
    #[validate(length(min = 1, max = 30))]
    pub bus_number: String,
    #[validate(length(min = 1, max = 150))]
    pub route_name: String,
    #[validate(length(max = 150))]
    pub driver_name: Option<String>,
    #[validate(length(max = 30))]
    pub driver_phone: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBusDto {
    #[validate(length(min = 1, max = 30))]
    pub bus_number: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub route_name: Option<String>,
    #[validate(length(max = 150))]
    pub driver_name: Option<String>,
    #[validate(length(max = 30))]
    pub driver_phone: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedBusesResponse {
    pub data: Vec<Bus>,
    pub meta: PaginationMeta,
}
