//! Fee payment models and DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use edudesk_core::PaginationMeta;
use edudesk_core::PaginationParams;
use edudesk_core::serde::{deserialize_amount_or_zero, deserialize_optional_parsed};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::fees::FeeSummary;
use crate::ids::{FeeId, PaymentId, StudentId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    Online,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Online => "online",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "online" => Ok(PaymentMethod::Online),
            "cheque" => Ok(PaymentMethod::Cheque),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: PaymentId,
    pub fee_id: FeeId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
    #[sqlx(default)]
    pub student_id: Option<StudentId>,
    #[sqlx(default)]
    pub fee_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentDto {
    pub fee_id: FeeId,
    /// Unparseable amounts count as zero and are rejected
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    #[serde(default)]
    pub method: PaymentMethod,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
    /// Defaults to now
    pub paid_at: Option<DateTime<Utc>>,
}

/// A stored payment and the fee balance after it.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordedPayment {
    pub payment: Payment,
    pub fee: FeeSummary,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub fee_id: Option<FeeId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub method: Option<PaymentMethod>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedPaymentsResponse {
    pub data: Vec<Payment>,
    pub meta: PaginationMeta,
}
