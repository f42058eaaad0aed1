/// Net position of one party in integer cents
/// (positive: is owed money, negative: owes money).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyBalance<M = u64> {
    pub id: M,
    pub cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlingTransfer<M = u64> {
    pub from: M,
    pub to: M,
    pub amount: i64,
}
