#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    CategoryId, Expense, ExpenseId, InputShapeError, Member, MemberBalances, MemberId, Money,
    Payment, PaymentMethodId, Settlement, Split, SplitPolicy, SplitShare, Transfer,
};
pub use services::{
    BalanceAggregator, DebtSimplifier, MismatchKind, PaymentValidator, SplitCalculator,
    SumMismatch, ValidationOutcome,
};
