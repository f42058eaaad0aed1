#![warn(clippy::uninlined_format_args)]

mod model;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub use model::{PartyBalance, SettlingTransfer};

/// Reduces a set of net positions to pairwise settling transfers by greedy
/// largest-debtor/largest-creditor matching.
///
/// Parties within `tolerance` cents of zero are treated as already settled
/// and excluded. Each step pairs the largest outstanding debtor with the
/// largest outstanding creditor and transfers the smaller of the two
/// magnitudes, so every step fully retires at least one party and the
/// transfer count never exceeds `debtors + creditors - 1`. Equal magnitudes
/// resolve toward the smaller id, keeping the output deterministic.
///
/// When the input positions sum to zero, every party ends within
/// `tolerance` of settled. An imbalanced input still terminates; the
/// residual stays on whichever side runs out last and is the caller's
/// invariant violation to surface.
pub fn reduce_transfers<M>(
    parties: impl IntoIterator<Item = PartyBalance<M>>,
    tolerance: i64,
) -> Vec<SettlingTransfer<M>>
where
    M: Copy + Ord,
{
    let mut debtors: BinaryHeap<(i64, Reverse<M>)> = BinaryHeap::new();
    let mut creditors: BinaryHeap<(i64, Reverse<M>)> = BinaryHeap::new();

    for party in parties {
        if party.cents < -tolerance {
            debtors.push((-party.cents, Reverse(party.id)));
        } else if party.cents > tolerance {
            creditors.push((party.cents, Reverse(party.id)));
        }
    }

    let mut transfers = Vec::with_capacity(debtors.len().max(creditors.len()));

    while let (Some((owed, Reverse(debtor))), Some((due, Reverse(creditor)))) =
        (debtors.pop(), creditors.pop())
    {
        let amount = owed.min(due);
        if amount > tolerance {
            transfers.push(SettlingTransfer {
                from: debtor,
                to: creditor,
                amount,
            });
        }

        let owed_left = owed - amount;
        if owed_left > tolerance {
            debtors.push((owed_left, Reverse(debtor)));
        }
        let due_left = due - amount;
        if due_left > tolerance {
            creditors.push((due_left, Reverse(creditor)));
        }
    }

    transfers
}
