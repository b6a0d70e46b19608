pub mod money;
pub mod period;
pub mod transaction;

pub use money::Money;
pub use period::{parse_as_of, DateParseError, Period, DEFAULT_PERIOD_DAYS};
pub use transaction::{Transaction, TransactionError, TransactionSet};
