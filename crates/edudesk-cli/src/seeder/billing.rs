//! Term fees for seeded students.

use edudesk_models::fees::FeeBreakdown;
use edudesk_models::ids::{FeeId, StudentId};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::time::Instant;

pub const FEE_TITLE: &str = "Term 1 Fees";
pub const FEE_TERM: &str = "Term 1";

/// Line items billed to every seeded student, in cents.
const FEE_ITEMS: [(&str, i64); 4] = [
    ("Tuition", 150_000),
    ("Library", 7_500),
    ("Laboratory", 12_050),
    ("Sports", 5_000),
];

pub fn fee_items() -> Vec<(&'static str, Decimal)> {
    FEE_ITEMS
        .iter()
        .map(|(name, cents)| (*name, Decimal::new(*cents, 2)))
        .collect()
}

/// Every tenth student gets a 10% sibling discount.
pub fn discount_for(student_idx: usize, subtotal: Decimal) -> Decimal {
    if student_idx % 10 == 0 {
        (subtotal / Decimal::from(10)).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

pub async fn seed_fees(
    db: &PgPool,
    student_ids: &[StudentId],
) -> Result<Vec<FeeId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("💰 Seeding fees for {} students...", student_ids.len());

    let items = fee_items();
    let subtotal: Decimal = items.iter().map(|(_, amount)| *amount).sum();

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(student_ids.len());
    for (idx, student_id) in student_ids.iter().enumerate() {
        let breakdown = FeeBreakdown::compute(
            items.iter().map(|(_, amount)| *amount),
            discount_for(idx, subtotal),
            Decimal::ZERO,
        )?;

        let fee_id = sqlx::query_scalar::<_, FeeId>(
            r#"INSERT INTO fees (student_id, title, academic_term, subtotal, discount, total)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(student_id)
        .bind(FEE_TITLE)
        .bind(FEE_TERM)
        .bind(breakdown.subtotal)
        .bind(breakdown.discount)
        .bind(breakdown.total)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (name, amount)) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO fee_items (fee_id, name, amount, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(fee_id)
            .bind(*name)
            .bind(*amount)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }
        ids.push(fee_id);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} fees in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_items_total() {
        let subtotal: Decimal = fee_items().iter().map(|(_, a)| *a).sum();
        assert_eq!(subtotal, dec!(1745.50));
    }

    #[test]
    fn test_discount_every_tenth_student() {
        assert_eq!(discount_for(0, dec!(1745.50)), dec!(174.55));
        assert_eq!(discount_for(3, dec!(1745.50)), Decimal::ZERO);
        assert_eq!(discount_for(20, dec!(100)), dec!(10));
    }
}
