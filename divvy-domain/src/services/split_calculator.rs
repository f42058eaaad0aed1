//! Split computation under the exact-total invariant.
//!
//! Even and share-weighted division round each share to the cent and hand
//! the rounding residue to the last participant in iteration order, so the
//! returned shares always reproduce the expense total exactly, even when
//! the division does not terminate (10.00 / 3).

use crate::model::{Money, Split, SplitPolicy, SplitShare};
use rust_decimal::Decimal;

/// Split computation service
pub struct SplitCalculator;

impl SplitCalculator {
    /// Computes per-participant owed amounts for one expense.
    ///
    /// Participants are taken in slice order. An empty split list yields an
    /// empty result, not an error; a positive total is a caller
    /// precondition (see `Expense::check_shape`). Stateless and idempotent:
    /// identical inputs always produce identical outputs, and any edit to
    /// the amount, participant set, policy or weights calls for a full
    /// recomputation rather than an incremental patch.
    pub fn compute(
        &self,
        total: Money,
        splits: &[Split],
        policy: SplitPolicy,
    ) -> Vec<SplitShare> {
        if splits.is_empty() {
            return Vec::new();
        }

        match policy {
            SplitPolicy::Even => divide_evenly(total, splits),
            SplitPolicy::FixedAmount => splits
                .iter()
                .map(|split| SplitShare {
                    member: split.member,
                    owed: split.amount.unwrap_or(Money::ZERO),
                })
                .collect(),
            SplitPolicy::Shares => {
                let weight_sum: Decimal = splits.iter().filter_map(|split| split.shares).sum();
                if weight_sum.is_zero() {
                    tracing::debug!(
                        participant_count = splits.len(),
                        "All share weights are zero, falling back to an even split"
                    );
                    return divide_evenly(total, splits);
                }
                allocate_with_residual(total, splits, |split| {
                    let weight = split.shares.unwrap_or(Decimal::ZERO);
                    Money::from_decimal(total.as_decimal() * weight / weight_sum).round_to_cents()
                })
            }
        }
    }
}

fn divide_evenly(total: Money, splits: &[Split]) -> Vec<SplitShare> {
    let per_head =
        Money::from_decimal(total.as_decimal() / Decimal::from(splits.len())).round_to_cents();
    allocate_with_residual(total, splits, |_| per_head)
}

/// Every participant but the last gets their rounded share; the last gets
/// whatever remains of the total.
fn allocate_with_residual(
    total: Money,
    splits: &[Split],
    share_of: impl Fn(&Split) -> Money,
) -> Vec<SplitShare> {
    let mut shares = Vec::with_capacity(splits.len());
    let mut allocated = Money::ZERO;
    for split in &splits[..splits.len() - 1] {
        let owed = share_of(split);
        allocated += owed;
        shares.push(SplitShare {
            member: split.member,
            owed,
        });
    }

    let last = &splits[splits.len() - 1];
    shares.push(SplitShare {
        member: last.member,
        owed: total - allocated,
    });
    shares
}
