pub mod balance_aggregator;
pub mod debt_simplifier;
pub mod payment_validator;
pub mod split_calculator;

pub use balance_aggregator::BalanceAggregator;
pub use debt_simplifier::DebtSimplifier;
pub use payment_validator::{MismatchKind, PaymentValidator, SumMismatch, ValidationOutcome};
pub use split_calculator::SplitCalculator;
