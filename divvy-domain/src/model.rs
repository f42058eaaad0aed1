use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use fxhash::FxHashSet;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentMethodId(pub u64);

/// A project participant. Lifecycle (join, rename, delete cascade) belongs
/// to the host's persistence layer; the name is a plain mutable field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

const CURRENCY_SCALE: u32 = 2;

/// Fixed-point currency amount with 2-decimal semantic precision.
///
/// Positive values are money owed to a member, negative values money a
/// member owes. Arithmetic is exact decimal arithmetic; rounding only
/// happens where a service asks for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(mantissa: i64, scale: u32) -> Self {
        Self(Decimal::new(mantissa, scale))
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, CURRENCY_SCALE))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn signum(self) -> i64 {
        match self.0.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        }
    }

    /// Rounds to cents, half away from zero.
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Converts to integer atomic units (cents), rounding half away from
    /// zero first. `None` when the result does not fit in an `i64`.
    pub fn to_cents(self) -> Option<i64> {
        let units = self
            .round_to_cents()
            .0
            .checked_mul(Decimal::ONE_HUNDRED)?;
        units.to_i64()
    }

    /// The uniform "effectively zero / matching" threshold: |self| <= 0.01.
    pub fn within_tolerance(self) -> bool {
        self.0.abs() <= Decimal::new(1, CURRENCY_SCALE)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|money| money.0).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        Self(iter.map(|money| money.0).sum())
    }
}

/// How an expense is divided among its participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Equal shares, rounding residue to the last participant.
    Even,
    /// Each participant enters an explicit amount.
    FixedAmount,
    /// Shares proportional to per-participant weights.
    Shares,
}

/// Who actually paid, and how much. An expense carries at least one
/// payment and the payment amounts must sum to the expense total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payment {
    pub member: MemberId,
    pub amount: Money,
}

impl Payment {
    pub fn new(member: MemberId, amount: Money) -> Self {
        Self { member, amount }
    }
}

/// One participating member's share of an expense, in participant
/// iteration order. Non-participating members are simply absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split {
    pub member: MemberId,
    /// Filled in by the split calculator before the expense reaches
    /// storage.
    pub owed: Money,
    /// User-entered figure, meaningful under [`SplitPolicy::FixedAmount`].
    pub amount: Option<Money>,
    /// Weight, meaningful under [`SplitPolicy::Shares`].
    pub shares: Option<Decimal>,
}

impl Split {
    pub fn even(member: MemberId) -> Self {
        Self {
            member,
            owed: Money::ZERO,
            amount: None,
            shares: None,
        }
    }

    pub fn fixed(member: MemberId, amount: Money) -> Self {
        Self {
            member,
            owed: Money::ZERO,
            amount: Some(amount),
            shares: None,
        }
    }

    pub fn weighted(member: MemberId, shares: Decimal) -> Self {
        Self {
            member,
            owed: Money::ZERO,
            amount: None,
            shares: Some(shares),
        }
    }
}

/// Calculator output: one participant's computed owed amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitShare {
    pub member: MemberId,
    pub owed: Money,
}

/// One shared cost, already decoded by the host's persistence layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Money,
    pub policy: SplitPolicy,
    pub payments: Vec<Payment>,
    pub splits: Vec<Split>,
    pub category: Option<CategoryId>,
    pub method: Option<PaymentMethodId>,
}

/// Malformed expense input. Callers run [`Expense::check_shape`] before
/// invoking the calculator or the aggregator; none of the services repeat
/// these checks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputShapeError {
    #[error("expense amount must be positive (got {0})")]
    NonPositiveAmount(Money),
    #[error("expense has no payments")]
    NoPayments,
    #[error("expense has no participants")]
    NoParticipants,
    #[error("member {0:?} appears more than once in the split list")]
    DuplicateParticipant(MemberId),
    #[error("fixed-amount split for member {0:?} has no amount")]
    MissingFixedAmount(MemberId),
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        amount: Money,
        policy: SplitPolicy,
        payments: Vec<Payment>,
        splits: Vec<Split>,
    ) -> Self {
        Self {
            id,
            amount,
            policy,
            payments,
            splits,
            category: None,
            method: None,
        }
    }

    pub fn check_shape(&self) -> Result<(), InputShapeError> {
        if self.amount.signum() <= 0 {
            return Err(InputShapeError::NonPositiveAmount(self.amount));
        }
        if self.payments.is_empty() {
            return Err(InputShapeError::NoPayments);
        }
        if self.splits.is_empty() {
            return Err(InputShapeError::NoParticipants);
        }

        let mut seen: FxHashSet<MemberId> = FxHashSet::default();
        for split in &self.splits {
            if !seen.insert(split.member) {
                return Err(InputShapeError::DuplicateParticipant(split.member));
            }
            if self.policy == SplitPolicy::FixedAmount && split.amount.is_none() {
                return Err(InputShapeError::MissingFixedAmount(split.member));
            }
        }
        Ok(())
    }

    pub fn payment_total(&self) -> Money {
        self.payments.iter().map(|payment| payment.amount).sum()
    }

    pub fn owed_total(&self) -> Money {
        self.splits.iter().map(|split| split.owed).sum()
    }
}

/// Net balances by member, derived from the expense history and never
/// persisted. BTreeMap keyed by MemberId so iteration order is stable and
/// downstream tie-breaks stay deterministic.
pub type MemberBalances = BTreeMap<MemberId, Money>;

/// Proposed settling instruction: `from` pays `to`. Recomputed on demand,
/// never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub new_balances: MemberBalances,
    pub transfers: Vec<Transfer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(Money::new(125, 3).round_to_cents(), Money::from_cents(13));
        assert_eq!(Money::new(-125, 3).round_to_cents(), Money::from_cents(-13));
    }

    #[test]
    fn money_converts_to_cents() {
        assert_eq!(Money::new(333, 2).to_cents(), Some(333));
        assert_eq!(Money::from_i64(10).to_cents(), Some(1_000));
        assert_eq!(Money::new(335, 3).to_cents(), Some(34));
    }

    #[rstest]
    #[case::zero(Money::ZERO, true)]
    #[case::one_cent(Money::from_cents(1), true)]
    #[case::negative_cent(Money::from_cents(-1), true)]
    #[case::two_cents(Money::from_cents(2), false)]
    fn tolerance_threshold(#[case] amount: Money, #[case] settled: bool) {
        assert_eq!(amount.within_tolerance(), settled);
    }

    fn base_expense() -> Expense {
        Expense::new(
            ExpenseId(1),
            Money::from_i64(30),
            SplitPolicy::Even,
            vec![Payment::new(MemberId(1), Money::from_i64(30))],
            vec![Split::even(MemberId(1)), Split::even(MemberId(2))],
        )
    }

    #[test]
    fn well_formed_expense_passes_shape_check() {
        let mut expense = base_expense();
        expense.category = Some(CategoryId(7));
        expense.method = Some(PaymentMethodId(2));
        assert_eq!(expense.check_shape(), Ok(()));
    }

    #[test]
    fn member_name_is_a_plain_mutable_field() {
        let mut member = Member::new(MemberId(1), "Ana");
        member.name = "Ana B.".to_string();
        assert_eq!(member.name, "Ana B.");
    }

    #[rstest]
    #[case::non_positive(
        |e: &mut Expense| e.amount = Money::ZERO,
        InputShapeError::NonPositiveAmount(Money::ZERO)
    )]
    #[case::no_payments(
        |e: &mut Expense| e.payments.clear(),
        InputShapeError::NoPayments
    )]
    #[case::no_participants(
        |e: &mut Expense| e.splits.clear(),
        InputShapeError::NoParticipants
    )]
    #[case::duplicate_participant(
        |e: &mut Expense| e.splits.push(Split::even(MemberId(2))),
        InputShapeError::DuplicateParticipant(MemberId(2))
    )]
    #[case::missing_fixed_amount(
        |e: &mut Expense| e.policy = SplitPolicy::FixedAmount,
        InputShapeError::MissingFixedAmount(MemberId(1))
    )]
    fn malformed_expense_is_rejected(
        #[case] mutate: fn(&mut Expense),
        #[case] expected: InputShapeError,
    ) {
        let mut expense = base_expense();
        mutate(&mut expense);
        assert_eq!(expense.check_shape(), Err(expected));
    }
}
