use serde::Serialize;
use thiserror::Error;

use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Money),
}

/// One expense line read from a statement. The amount is the absolute value
/// of the spend and is always strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    description: String,
    amount: Money,
}

impl Transaction {
    pub fn new(description: impl Into<String>, amount: Money) -> Result<Self, TransactionError> {
        if !amount.is_positive() {
            return Err(TransactionError::NonPositiveAmount(amount));
        }
        Ok(Transaction {
            description: description.into(),
            amount,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

/// Ordered expenses gathered from one or more statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransactionSet {
    items: Vec<Transaction>,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tx: Transaction) {
        self.items.push(tx);
    }

    /// Append another set, keeping its order after ours.
    pub fn extend(&mut self, other: TransactionSet) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.items
    }

    pub fn amounts(&self) -> impl Iterator<Item = Money> + '_ {
        self.items.iter().map(Transaction::amount)
    }

    /// Sum of all amounts, or `None` if it leaves the decimal range.
    pub fn total(&self) -> Option<Money> {
        self.amounts().try_fold(Money::ZERO, Money::checked_add)
    }

    /// A new set holding the members that satisfy `keep`, in order.
    pub fn filtered<F>(&self, mut keep: F) -> TransactionSet
    where
        F: FnMut(&Transaction) -> bool,
    {
        self.items.iter().filter(|tx| keep(tx)).cloned().collect()
    }
}

impl FromIterator<Transaction> for TransactionSet {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        TransactionSet {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TransactionSet {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a TransactionSet {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(desc: &str, units: i64) -> Transaction {
        Transaction::new(desc, Money::new(units)).unwrap()
    }

    #[test]
    fn new_accepts_positive_amount() {
        let t = tx("QRIS WARUNG BU SRI", 21_500);
        assert_eq!(t.description(), "QRIS WARUNG BU SRI");
        assert_eq!(t.amount(), Money::new(21_500));
    }

    #[test]
    fn new_rejects_zero_and_negative() {
        assert_eq!(
            Transaction::new("x", Money::zero()),
            Err(TransactionError::NonPositiveAmount(Money::zero()))
        );
        assert!(matches!(
            Transaction::new("x", Money::new(-5)),
            Err(TransactionError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn duplicate_descriptions_are_allowed() {
        let set: TransactionSet = vec![tx("GOJEK", 15_000), tx("GOJEK", 15_000)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn extend_preserves_order() {
        let mut a: TransactionSet = vec![tx("a", 1), tx("b", 2)].into_iter().collect();
        let b: TransactionSet = vec![tx("c", 3)].into_iter().collect();
        a.extend(b);
        let names: Vec<&str> = a.iter().map(Transaction::description).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(a.total(), Some(Money::new(6)));
    }

    #[test]
    fn total_out_of_decimal_range_is_none() {
        let huge = Money::from_decimal(rust_decimal::Decimal::MAX);
        let set: TransactionSet = vec![tx("a", 1), Transaction::new("b", huge).unwrap()]
            .into_iter()
            .collect();
        assert_eq!(set.total(), None);
        assert_eq!(TransactionSet::new().total(), Some(Money::zero()));
    }

    #[test]
    fn filtered_produces_new_set() {
        let set: TransactionSet = vec![tx("a", 1_000), tx("b", 50_000), tx("c", 9_000)]
            .into_iter()
            .collect();
        let small = set.filtered(|t| t.amount() < Money::new(10_000));
        assert_eq!(small.len(), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn serializes_as_list() {
        let set: TransactionSet = vec![tx("a", 1)].into_iter().collect();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["description"], "a");
    }
}
