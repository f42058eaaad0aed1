use crate::model::{Expense, MemberBalances, MemberId, Money};

/// Folds an expense history into net per-member balances: what each member
/// paid minus what they owe. Positive means the project owes the member,
/// negative means the member owes the project.
pub struct BalanceAggregator {
    balances: MemberBalances,
}

impl BalanceAggregator {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        let balances = members
            .into_iter()
            .map(|member| (member, Money::ZERO))
            .collect();
        Self { balances }
    }

    /// Adds one expense: each payment credits its payer, each split debits
    /// its participant. Members missing from the initial set are created
    /// at zero on first sight. Summation is commutative, so the fold is
    /// order-independent and introduces no rounding beyond what the
    /// inputs already carry.
    pub fn apply(&mut self, expense: &Expense) {
        for payment in &expense.payments {
            *self
                .balances
                .entry(payment.member)
                .or_insert(Money::ZERO) += payment.amount;
        }
        for split in &expense.splits {
            *self.balances.entry(split.member).or_insert(Money::ZERO) -= split.owed;
        }
    }

    pub fn balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }

    /// Folds a whole expense slice in one call.
    pub fn aggregate<I>(members: I, expenses: &[Expense]) -> MemberBalances
    where
        I: IntoIterator<Item = MemberId>,
    {
        let mut aggregator = Self::new(members);
        for expense in expenses {
            aggregator.apply(expense);
        }
        aggregator.into_balances()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseId, Payment, Split, SplitPolicy};
    use crate::services::SplitCalculator;

    fn expense(id: u64, amount: Money, payer: MemberId, participants: &[MemberId]) -> Expense {
        let mut splits: Vec<Split> = participants.iter().copied().map(Split::even).collect();
        let shares = SplitCalculator.compute(amount, &splits, SplitPolicy::Even);
        for (split, share) in splits.iter_mut().zip(&shares) {
            split.owed = share.owed;
        }
        Expense::new(
            ExpenseId(id),
            amount,
            SplitPolicy::Even,
            vec![Payment::new(payer, amount)],
            splits,
        )
    }

    fn members() -> [MemberId; 3] {
        [MemberId(1), MemberId(2), MemberId(3)]
    }

    #[test]
    fn payer_gains_what_others_owe() {
        let [a, b, c] = members();
        let expenses = [expense(1, Money::from_i64(30), a, &[a, b, c])];

        let balances = BalanceAggregator::aggregate(members(), &expenses);

        assert_eq!(balances.get(&a), Some(&Money::from_i64(20)));
        assert_eq!(balances.get(&b), Some(&Money::from_i64(-10)));
        assert_eq!(balances.get(&c), Some(&Money::from_i64(-10)));
    }

    #[test]
    fn members_without_expenses_stay_at_zero() {
        let [a, b, c] = members();
        let expenses = [expense(1, Money::from_i64(10), a, &[a, b])];

        let balances = BalanceAggregator::aggregate(members(), &expenses);

        assert_eq!(balances.get(&c), Some(&Money::ZERO));
    }

    #[test]
    fn aggregation_is_order_independent() {
        let [a, b, c] = members();
        let mut expenses = vec![
            expense(1, Money::from_i64(30), a, &[a, b, c]),
            expense(2, Money::from_i64(10), b, &[a, b]),
            expense(3, Money::new(755, 2), c, &[b, c]),
        ];

        let forward = BalanceAggregator::aggregate(members(), &expenses);
        expenses.reverse();
        let backward = BalanceAggregator::aggregate(members(), &expenses);

        assert_eq!(forward, backward);
    }

    #[test]
    fn consistent_expenses_net_to_zero() {
        let [a, b, c] = members();
        let expenses = [
            expense(1, Money::from_i64(10), a, &[a, b, c]),
            expense(2, Money::new(999, 2), b, &[a, c]),
        ];

        let balances = BalanceAggregator::aggregate(members(), &expenses);

        let total: Money = balances.values().copied().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn aggregates_over_a_member_roster() {
        use crate::model::Member;

        let roster = [
            Member::new(MemberId(1), "ana"),
            Member::new(MemberId(2), "bo"),
        ];
        let expenses = [expense(
            1,
            Money::from_i64(10),
            MemberId(1),
            &[MemberId(1), MemberId(2)],
        )];

        let balances =
            BalanceAggregator::aggregate(roster.iter().map(|member| member.id), &expenses);

        assert_eq!(balances.get(&MemberId(2)), Some(&Money::from_i64(-5)));
    }

    #[test]
    fn unknown_payer_is_created_on_first_sight() {
        let [a, b, _] = members();
        let outsider = MemberId(9);
        let expenses = [expense(1, Money::from_i64(20), outsider, &[a, b])];

        let balances = BalanceAggregator::aggregate([a, b], &expenses);

        assert_eq!(balances.get(&outsider), Some(&Money::from_i64(20)));
    }
}
