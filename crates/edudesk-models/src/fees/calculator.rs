//! Fee arithmetic.
//!
//! `subtotal = Σ items`, `total = subtotal − discount`, `remaining = total − paid`.
//! All amounts are kept to cents and bounded by what a `NUMERIC(12,2)`
//! column holds.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::FeeStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    NegativeAmount(&'static str),
    AmountTooLarge(&'static str),
    DiscountExceedsSubtotal { discount: Decimal, subtotal: Decimal },
    Overpaid { paid: Decimal, total: Decimal },
    NonPositivePayment(Decimal),
    PaymentExceedsBalance { amount: Decimal, remaining: Decimal },
}

impl fmt::Display for FeeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeError::NegativeAmount(field) => write!(f, "{} cannot be negative", field),
            FeeError::AmountTooLarge(field) => {
                write!(f, "{} cannot exceed {}", field, max_amount())
            }
            FeeError::DiscountExceedsSubtotal { discount, subtotal } => write!(
                f,
                "Discount {} exceeds the fee subtotal {}",
                discount, subtotal
            ),
            FeeError::Overpaid { paid, total } => {
                write!(f, "Amount paid {} exceeds the fee total {}", paid, total)
            }
            FeeError::NonPositivePayment(amount) => {
                write!(f, "Payment amount must be greater than zero, got {}", amount)
            }
            FeeError::PaymentExceedsBalance { amount, remaining } => write!(
                f,
                "Payment of {} exceeds the remaining balance {}",
                amount, remaining
            ),
        }
    }
}

impl std::error::Error for FeeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeeBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
    pub status: FeeStatus,
}

impl FeeBreakdown {
    pub fn compute<I>(amounts: I, discount: Decimal, paid: Decimal) -> Result<Self, FeeError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut subtotal = Decimal::ZERO;
        for amount in amounts {
            let amount = bounded(amount, "Item amount")?;
            subtotal = subtotal
                .checked_add(amount)
                .filter(|sum| *sum <= max_amount())
                .ok_or(FeeError::AmountTooLarge("Subtotal"))?;
        }
        let discount = bounded(discount, "Discount")?;
        let paid = bounded(paid, "Amount paid")?;

        if discount > subtotal {
            return Err(FeeError::DiscountExceedsSubtotal { discount, subtotal });
        }

        let total = subtotal - discount;
        if paid > total {
            return Err(FeeError::Overpaid { paid, total });
        }

        let remaining = total - paid;
        Ok(Self {
            subtotal,
            discount,
            total,
            paid,
            remaining,
            status: FeeStatus::from_amounts(total, paid),
        })
    }

    /// Breakdown after recording a payment against this fee.
    pub fn with_payment(&self, amount: Decimal) -> Result<Self, FeeError> {
        let amount = cents(amount);
        if amount <= Decimal::ZERO {
            return Err(FeeError::NonPositivePayment(amount));
        }
        if amount > self.remaining {
            return Err(FeeError::PaymentExceedsBalance {
                amount,
                remaining: self.remaining,
            });
        }
        let paid = self
            .paid
            .checked_add(amount)
            .ok_or(FeeError::AmountTooLarge("Amount paid"))?;
        self.repaid(paid)
    }

    /// Breakdown after a previously recorded payment is removed.
    pub fn without_payment(&self, amount: Decimal) -> Result<Self, FeeError> {
        let paid = self
            .paid
            .checked_sub(cents(amount))
            .filter(|paid| *paid >= Decimal::ZERO)
            .ok_or(FeeError::NegativeAmount("Amount paid"))?;
        self.repaid(paid)
    }

    fn repaid(&self, paid: Decimal) -> Result<Self, FeeError> {
        Self::compute([self.subtotal], self.discount, paid)
    }
}

fn cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Largest amount a stored fee column accepts.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Rounds to cents and checks `0 <= amount <= max_amount()`.
fn bounded(amount: Decimal, field: &'static str) -> Result<Decimal, FeeError> {
    if amount < Decimal::ZERO {
        return Err(FeeError::NegativeAmount(field));
    }
    let amount = cents(amount);
    if amount > max_amount() {
        return Err(FeeError::AmountTooLarge(field));
    }
    Ok(amount)
}
