use std::fmt;

use crate::model::{Expense, Money, SplitPolicy};
use thiserror::Error;

/// Which of the expense sums failed to reconcile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MismatchKind {
    /// Σ payments differs from the expense total.
    Payments,
    /// Σ computed owed amounts differs from the expense total.
    Splits,
    /// Σ user-entered fixed amounts differs from the expense total.
    EnteredAmounts,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MismatchKind::Payments => "payment",
            MismatchKind::Splits => "split",
            MismatchKind::EnteredAmounts => "entered amount",
        };
        f.write_str(label)
    }
}

/// Structured sum diagnostic. Returned, never raised: the host renders it
/// as a "$0.50 left" / "$0.50 over" style message and re-solicits input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind} total {actual} does not match expense total {expected}")]
pub struct SumMismatch {
    pub kind: MismatchKind,
    pub expected: Money,
    pub actual: Money,
}

impl SumMismatch {
    /// Negative when the sums fall short of the expense total, positive
    /// when they overshoot it.
    pub fn delta(&self) -> Money {
        self.actual - self.expected
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Mismatch(SumMismatch),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// Expense consistency checks
pub struct PaymentValidator;

impl PaymentValidator {
    /// Validates that payer contributions and participant obligations each
    /// reconcile with the expense total, to the cent.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// payment sum, owed sum, then (fixed-amount policy only) the
    /// user-entered amounts. A share-weighted expense whose weights sum to
    /// zero is accepted, since the calculator documents the even fallback
    /// for that case. Purely diagnostic; the expense is never mutated or
    /// auto-corrected.
    pub fn validate(&self, expense: &Expense) -> ValidationOutcome {
        if let Some(mismatch) = reconcile(
            MismatchKind::Payments,
            expense.amount,
            expense.payment_total(),
        ) {
            return ValidationOutcome::Mismatch(mismatch);
        }

        if let Some(mismatch) =
            reconcile(MismatchKind::Splits, expense.amount, expense.owed_total())
        {
            return ValidationOutcome::Mismatch(mismatch);
        }

        if expense.policy == SplitPolicy::FixedAmount {
            let entered: Money = expense.splits.iter().filter_map(|split| split.amount).sum();
            if let Some(mismatch) = reconcile(MismatchKind::EnteredAmounts, expense.amount, entered)
            {
                return ValidationOutcome::Mismatch(mismatch);
            }
        }

        ValidationOutcome::Valid
    }
}

fn reconcile(kind: MismatchKind, expected: Money, actual: Money) -> Option<SumMismatch> {
    if (actual - expected).within_tolerance() {
        None
    } else {
        Some(SumMismatch {
            kind,
            expected,
            actual,
        })
    }
}
