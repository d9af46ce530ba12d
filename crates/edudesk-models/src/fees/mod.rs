//! Fee billing models, DTOs and the fee calculator.

pub mod calculator;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use edudesk_core::serde::{
    deserialize_amount_or_zero, deserialize_optional_amount, deserialize_optional_parsed,
    deserialize_optional_trimmed, deserialize_some,
};
use edudesk_core::{PaginationMeta, PaginationParams};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{FeeId, FeeItemId, StudentId};
use crate::payments::Payment;

pub use calculator::{FeeBreakdown, FeeError};

/// Derived from the amounts; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    Unpaid,
    Partial,
    Paid,
}

impl FeeStatus {
    /// `paid` once nothing remains (a zero total counts as paid).
    pub fn from_amounts(total: Decimal, paid: Decimal) -> Self {
        if paid >= total {
            FeeStatus::Paid
        } else if paid > Decimal::ZERO {
            FeeStatus::Partial
        } else {
            FeeStatus::Unpaid
        }
    }

    /// SQL predicate over the `fees f` alias matching this status.
    pub fn sql_predicate(self) -> &'static str {
        match self {
            FeeStatus::Paid => "f.paid_amount >= f.total",
            FeeStatus::Partial => "f.paid_amount > 0 AND f.paid_amount < f.total",
            FeeStatus::Unpaid => "f.paid_amount = 0 AND f.total > 0",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Unpaid => "unpaid",
            FeeStatus::Partial => "partial",
            FeeStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unpaid" => Ok(FeeStatus::Unpaid),
            "partial" => Ok(FeeStatus::Partial),
            "paid" => Ok(FeeStatus::Paid),
            other => Err(format!("unknown fee status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FeeItem {
    pub id: FeeItemId,
    pub fee_id: FeeId,
    pub name: String,
    pub amount: Decimal,
    pub position: i32,
}

/// A line item as submitted; unparseable amounts count as zero.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FeeItemInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    #[schema(value_type = String, example = "250.00")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FeeRecord {
    pub id: FeeId,
    pub student_id: StudentId,
    pub title: String,
    pub academic_term: Option<String>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    #[sqlx(default)]
    pub student_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeeRecord {
    pub fn remaining(&self) -> Decimal {
        self.total - self.paid_amount
    }

    pub fn status(&self) -> FeeStatus {
        FeeStatus::from_amounts(self.total, self.paid_amount)
    }

    /// Rebuilds the breakdown from the stored amounts.
    pub fn breakdown(&self) -> Result<FeeBreakdown, FeeError> {
        FeeBreakdown::compute([self.subtotal], self.discount, self.paid_amount)
    }
}

/// A fee with its derived balance and status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeeSummary {
    #[serde(flatten)]
    pub fee: FeeRecord,
    pub remaining: Decimal,
    pub status: FeeStatus,
}

impl From<FeeRecord> for FeeSummary {
    fn from(fee: FeeRecord) -> Self {
        Self {
            remaining: fee.remaining(),
            status: fee.status(),
            fee,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeeDetails {
    #[serde(flatten)]
    pub summary: FeeSummary,
    pub items: Vec<FeeItem>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFeeDto {
    pub student_id: StudentId,
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(max = 50))]
    pub academic_term: Option<String>,
    #[validate(length(min = 1, max = 50), nested)]
    pub items: Vec<FeeItemInput>,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    #[schema(value_type = String, example = "0.00")]
    pub discount: Decimal,
    pub due_date: Option<NaiveDate>,
}

impl CreateFeeDto {
    pub fn breakdown(&self) -> Result<FeeBreakdown, FeeError> {
        FeeBreakdown::compute(self.items.iter().map(|i| i.amount), self.discount, Decimal::ZERO)
    }
}

/// Partial update. Replacing `items` or `discount` recomputes the totals.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFeeDto {
    #[validate(length(min = 1, max = 150))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub academic_term: Option<Option<String>>,
    #[validate(length(min = 1, max = 50), nested)]
    pub items: Option<Vec<FeeItemInput>>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    #[schema(value_type = Option<String>)]
    pub discount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = "date")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateFeeDto {
    pub fn changes_amounts(&self) -> bool {
        self.items.is_some() || self.discount.is_some()
    }
}

/// Body of `POST /fees/preview`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FeePreviewDto {
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<FeeItemInput>,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    #[schema(value_type = String)]
    pub discount: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    #[schema(value_type = String)]
    pub paid_amount: Decimal,
}

impl FeePreviewDto {
    pub fn breakdown(&self) -> Result<FeeBreakdown, FeeError> {
        FeeBreakdown::compute(
            self.items.iter().map(|i| i.amount),
            self.discount,
            self.paid_amount,
        )
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeFilterParams {
    /// Matches title or academic term
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<FeeStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedFeesResponse {
    pub data: Vec<FeeSummary>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_from_amounts() {
        assert_eq!(FeeStatus::from_amounts(dec!(100), dec!(0)), FeeStatus::Unpaid);
        assert_eq!(FeeStatus::from_amounts(dec!(100), dec!(1)), FeeStatus::Partial);
        assert_eq!(FeeStatus::from_amounts(dec!(100), dec!(100)), FeeStatus::Paid);
        assert_eq!(FeeStatus::from_amounts(dec!(0), dec!(0)), FeeStatus::Paid);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Partial".parse::<FeeStatus>().unwrap(), FeeStatus::Partial);
        assert!("overdue".parse::<FeeStatus>().is_err());
    }

    #[test]
    fn test_create_dto_lenient_amounts() {
        let json = format!(
            r#"{{"student_id":"{}","title":"Term 1","items":[
                {{"name":"Tuition","amount":"1500"}},
                {{"name":"Lab","amount":"n/a"}},
                {{"name":"Library","amount":25.5}}
            ],"discount":""}}"#,
            StudentId::new()
        );
        let dto: CreateFeeDto = serde_json::from_str(&json).unwrap();
        assert!(dto.validate().is_ok());

        let b = dto.breakdown().unwrap();
        assert_eq!(b.subtotal, dec!(1525.50));
        assert_eq!(b.discount, Decimal::ZERO);
        assert_eq!(b.total, dec!(1525.50));
        assert_eq!(b.status, FeeStatus::Unpaid);
    }

    #[test]
    fn test_create_dto_requires_items() {
        let json = format!(
            r#"{{"student_id":"{}","title":"Term 1","items":[]}}"#,
            StudentId::new()
        );
        let dto: CreateFeeDto = serde_json::from_str(&json).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_item_name_validated() {
        let json = format!(
            r#"{{"student_id":"{}","title":"Term 1","items":[{{"name":"","amount":1}}]}}"#,
            StudentId::new()
        );
        let dto: CreateFeeDto = serde_json::from_str(&json).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_dto_item_list_bounds() {
        let dto: UpdateFeeDto = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(dto.validate().is_err());

        let dto: UpdateFeeDto =
            serde_json::from_str(r#"{"items":[{"name":"Lab","amount":"20"}]}"#).unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_amount_detection() {
        let dto: UpdateFeeDto = serde_json::from_str(r#"{"title":"Renamed"}"#).unwrap();
        assert!(!dto.changes_amounts());

        let dto: UpdateFeeDto = serde_json::from_str(r#"{"discount":"abc"}"#).unwrap();
        assert!(dto.changes_amounts());
        assert_eq!(dto.discount, Some(Decimal::ZERO));

        let dto: UpdateFeeDto = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(dto.due_date, Some(None));
    }

    #[test]
    fn test_preview_dto() {
        let dto: FeePreviewDto = serde_json::from_str(
            r#"{"items":[{"name":"A","amount":"100"}],"discount":"10","paid_amount":"45.5"}"#,
        )
        .unwrap();
        let b = dto.breakdown().unwrap();
        assert_eq!(b.total, dec!(90));
        assert_eq!(b.remaining, dec!(44.50));
        assert_eq!(b.status, FeeStatus::Partial);
    }

    #[test]
    fn test_summary_derives_balance() {
        let fee = FeeRecord {
            id: FeeId::new(),
            student_id: StudentId::new(),
            title: "Bus".to_string(),
            academic_term: None,
            subtotal: dec!(300),
            discount: dec!(0),
            total: dec!(300),
            paid_amount: dec!(120),
            due_date: None,
            student_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let summary = FeeSummary::from(fee);
        assert_eq!(summary.remaining, dec!(180));
        assert_eq!(summary.status, FeeStatus::Partial);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["title"], "Bus");
    }
}
