use crate::model::{MemberBalances, MemberId, Money, Settlement, Transfer};
use divvy_settle::{PartyBalance, reduce_transfers};

const TOLERANCE_CENTS: i64 = 1;

/// Debt simplification service
pub struct DebtSimplifier;

impl DebtSimplifier {
    /// Reduces net balances to a short list of settling transfers.
    ///
    /// Greedy largest-debtor/largest-creditor netting on atomic cents: no
    /// transfer exceeds the smaller party's outstanding magnitude, every
    /// settled member ends within 0.01 of zero, and at most
    /// debtors + creditors - 1 transfers come back. The transfer count is
    /// a documented heuristic, not a proven optimum under additional
    /// constraints.
    ///
    /// This service never fails. When the input balances do not net to ~0
    /// (an upstream correctness bug) the residual is left undistributed in
    /// `new_balances` for the caller to notice; a warning is logged.
    pub fn simplify(&self, balances: MemberBalances) -> Settlement {
        let net: Money = balances.values().copied().sum();
        if !net.within_tolerance() {
            tracing::warn!(
                net = %net,
                member_count = balances.len(),
                "Balances do not net to zero, residual will remain unsettled"
            );
        }

        // MemberBalances iterates in MemberId order, so equal magnitudes
        // resolve identically on every run.
        let parties: Vec<PartyBalance<MemberId>> = balances
            .iter()
            .filter_map(|(member, balance)| match balance.to_cents() {
                Some(cents) => Some(PartyBalance {
                    id: *member,
                    cents,
                }),
                None => {
                    tracing::error!(
                        member = ?member,
                        balance = %balance,
                        "Balance does not fit in atomic units, member skipped"
                    );
                    None
                }
            })
            .collect();

        let mut transfers: Vec<Transfer> = reduce_transfers(parties, TOLERANCE_CENTS)
            .into_iter()
            .map(|transfer| Transfer {
                from: transfer.from,
                to: transfer.to,
                amount: Money::from_cents(transfer.amount),
            })
            .collect();
        transfers.sort_unstable_by_key(|transfer| (transfer.from, transfer.to));

        let mut new_balances = balances;
        for transfer in &transfers {
            if let Some(balance) = new_balances.get_mut(&transfer.from) {
                *balance += transfer.amount;
            }
            if let Some(balance) = new_balances.get_mut(&transfer.to) {
                *balance -= transfer.amount;
            }
        }

        Settlement {
            new_balances,
            transfers,
        }
    }
}
