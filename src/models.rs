//! Data models for chemicals and reaction recipes

use std::fmt;

use crate::ledger::QuantityLedger;

/// A named chemical together with an amount in units.
///
/// There is intentionally no `PartialEq` impl: "is this the same chemical"
/// and "is there enough of it" are different questions, answered by
/// [`Quantity::same_chemical`] and [`Quantity::has_enough`].
#[derive(Debug, Clone)]
pub struct Quantity {
    pub name: String,
    pub amount: u64,
}

impl Quantity {
    pub fn new(name: impl Into<String>, amount: u64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }

    /// True when both quantities name the same chemical, whatever their amounts.
    pub fn same_chemical(&self, other: &Quantity) -> bool {
        self.name == other.name
    }

    /// True when `self` is the same chemical as `required` and at least as much of it.
    pub fn has_enough(&self, required: &Quantity) -> bool {
        self.same_chemical(required) && self.amount >= required.amount
    }

    /// Independent copy with the amount multiplied by `ratio`.
    pub fn scaled(&self, ratio: u64) -> Quantity {
        Quantity::new(self.name.clone(), self.amount * ratio)
    }

    /// Decrease the amount in place. Bounds are the ledger's job; callers
    /// must not take more than is present.
    pub fn subtract(&mut self, amount: u64) -> &mut Self {
        self.amount -= amount;
        self
    }

    pub fn scale(&mut self, factor: u64) -> &mut Self {
        self.amount *= factor;
        self
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.amount)
    }
}

/// How a chemical comes into a container.
#[derive(Debug, Clone)]
pub enum RecipeKind {
    /// Dispensed directly (hydrogen, carbon, ...)
    Base,
    /// Sourced from outside the chemistry set (welding fuel, ...)
    Alternative,
    /// Brewed from the listed components, in exactly these proportions
    Composite(QuantityLedger),
}

impl RecipeKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecipeKind::Base => "base",
            RecipeKind::Alternative => "alternative",
            RecipeKind::Composite(_) => "composite",
        }
    }
}

/// A catalog entry: one chemical and how it is obtained.
#[derive(Debug, Clone)]
pub struct RecipeDefinition {
    pub name: String,
    /// Units produced by one batch of the recipe
    pub output_amount: u64,
    pub kind: RecipeKind,
}

impl RecipeDefinition {
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_amount: 1,
            kind: RecipeKind::Base,
        }
    }

    pub fn alternative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_amount: 1,
            kind: RecipeKind::Alternative,
        }
    }

    pub fn composite(name: impl Into<String>, output_amount: u64, components: QuantityLedger) -> Self {
        Self {
            name: name.into(),
            output_amount,
            kind: RecipeKind::Composite(components),
        }
    }

    /// Base and alternative chemicals are raw materials and never react into existence.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, RecipeKind::Composite(_))
    }

    pub fn component_ledger(&self) -> Option<&QuantityLedger> {
        match &self.kind {
            RecipeKind::Composite(components) => Some(components),
            _ => None,
        }
    }

    /// Component requirements in declaration order; empty for raw materials.
    pub fn components(&self) -> impl Iterator<Item = &Quantity> {
        self.component_ledger().into_iter().flat_map(|c| c.values())
    }

    pub fn component(&self, name: &str) -> Option<&Quantity> {
        self.component_ledger().and_then(|c| c.get(name))
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.component_ledger().is_some_and(|c| c.contains_name(name))
    }

    pub fn component_count(&self) -> usize {
        self.component_ledger().map_or(0, |c| c.len())
    }

    /// Number of whole batches `reagent` can supply for its matching component.
    ///
    /// `None` when the recipe has no component of that chemical.
    pub fn ratio_for(&self, reagent: &Quantity) -> Option<u64> {
        self.components()
            .find(|component| reagent.same_chemical(component))
            .map(|component| reagent.amount / component.amount)
    }

    /// Whether `available` holds every component in at least the required amount.
    ///
    /// Chemicals in `available` that the recipe does not use are ignored.
    /// The temperature is accepted for future heat-dependent recipes and
    /// currently has no effect.
    pub fn can_react(&self, available: &QuantityLedger, _temperature: i32) -> bool {
        let Some(components) = self.component_ledger() else {
            return false;
        };

        let satisfied = available
            .values()
            .filter(|chem| {
                components
                    .get(&chem.name)
                    .is_some_and(|required| chem.amount >= required.amount)
            })
            .count();

        satisfied == components.len()
    }

    /// Smallest multiple of the output amount that covers `amount_wanted`.
    ///
    /// `None` when that multiple does not fit in a `u64`.
    pub fn minimal(&self, amount_wanted: u64) -> Option<u64> {
        let remainder = amount_wanted % self.output_amount;
        if remainder == 0 {
            Some(amount_wanted)
        } else {
            amount_wanted.checked_add(self.output_amount - remainder)
        }
    }
}

impl fmt::Display for RecipeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
