//! Ordered ledger of chemical quantities
//!
//! Entries keep their insertion order, which the simulator relies on when
//! choosing between competing reactions. Containers hold tens of chemicals
//! at most, so a plain vector with linear lookup is enough.

use std::fmt;

use crate::error::ReactionError;
use crate::models::Quantity;

#[derive(Debug, Clone, Default)]
pub struct QuantityLedger {
    entries: Vec<Quantity>,
}

impl QuantityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh ledger from copies of `quantities`, keeping their order.
    pub fn from_sequence<'a, I>(quantities: I) -> Result<Self, ReactionError>
    where
        I: IntoIterator<Item = &'a Quantity>,
    {
        let mut ledger = Self::new();
        for quantity in quantities {
            ledger.merge(quantity.scaled(1))?;
        }
        Ok(ledger)
    }

    pub fn from_pairs<S, I>(pairs: I) -> Result<Self, ReactionError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, u64)>,
    {
        let mut ledger = Self::new();
        for (name, amount) in pairs {
            ledger.merge(Quantity::new(name, amount))?;
        }
        Ok(ledger)
    }

    pub fn contains(&self, quantity: &Quantity) -> bool {
        self.contains_name(&quantity.name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|q| q.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.entries.iter().find(|q| q.name == name)
    }

    /// Add `quantity` to the same-named entry, or append it as a new entry.
    ///
    /// Zero amounts are dropped so that every present entry stays positive.
    /// A total past `u64::MAX` is rejected and leaves the entry unchanged.
    pub fn merge(&mut self, quantity: Quantity) -> Result<&mut Self, ReactionError> {
        if quantity.amount == 0 {
            return Ok(self);
        }
        match self.entries.iter_mut().find(|q| q.same_chemical(&quantity)) {
            Some(existing) => {
                existing.amount = existing
                    .amount
                    .checked_add(quantity.amount)
                    .ok_or(ReactionError::Overflow { name: quantity.name })?;
            }
            None => self.entries.push(quantity),
        }
        Ok(self)
    }

    /// Take `quantity` out of the same-named entry, removing it once empty.
    ///
    /// Fails without touching the ledger when the entry is missing or holds
    /// less than requested.
    pub fn deplete(&mut self, quantity: &Quantity) -> Result<&mut Self, ReactionError> {
        let index = self.position(&quantity.name).ok_or_else(|| ReactionError::Missing {
            name: quantity.name.clone(),
        })?;

        let entry = &mut self.entries[index];
        if entry.amount < quantity.amount {
            return Err(ReactionError::Overdrawn {
                name: quantity.name.clone(),
                available: entry.amount,
                requested: quantity.amount,
            });
        }

        entry.subtract(quantity.amount);
        if entry.amount == 0 {
            self.entries.remove(index);
        }
        Ok(self)
    }

    pub fn names(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(|q| q.name.as_str())
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Quantity> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Quantity)> + ExactSizeIterator {
        self.entries.iter().map(|q| (q.name.as_str(), q))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[Quantity] {
        &self.entries
    }
}

impl fmt::Display for QuantityLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, quantity) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", quantity)?;
        }
        Ok(())
    }
}
