//! Registry of recipe definitions
//!
//! Insertion order matters: when several composite recipes fit the same
//! group of reagents, the one registered first wins.

use crate::error::CatalogError;
use crate::ledger::QuantityLedger;
use crate::models::{Quantity, RecipeDefinition};

#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<RecipeDefinition>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chemistry set shipped with the simulator.
    pub fn standard() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for base in ["carbon", "hydrogen", "oxygen", "nitrogen"] {
            catalog.add_base(base)?;
        }
        catalog
            .add_alternative("weldingfuel")?
            .add_composite("ammonia", 3, [("hydrogen", 3), ("nitrogen", 1)])?
            .add_composite("oil", 3, [("carbon", 1), ("hydrogen", 1), ("weldingfuel", 1)])?;
        Ok(catalog)
    }

    pub fn add_base(&mut self, name: &str) -> Result<&mut Self, CatalogError> {
        self.insert(RecipeDefinition::base(name))
    }

    pub fn add_alternative(&mut self, name: &str) -> Result<&mut Self, CatalogError> {
        self.insert(RecipeDefinition::alternative(name))
    }

    /// Register a recipe producing `output_amount` units per batch of `components`.
    pub fn add_composite<S, I>(
        &mut self,
        name: &str,
        output_amount: u64,
        components: I,
    ) -> Result<&mut Self, CatalogError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, u64)>,
    {
        if output_amount == 0 {
            return Err(CatalogError::ZeroOutput(name.to_string()));
        }

        let mut ledger = QuantityLedger::new();
        for (component, amount) in components {
            let component = component.into();
            if amount == 0 {
                return Err(CatalogError::ZeroAmount {
                    recipe: name.to_string(),
                    component,
                });
            }
            ledger.merge(Quantity::new(component, amount))?;
        }
        if ledger.is_empty() {
            return Err(CatalogError::EmptyComposite(name.to_string()));
        }

        self.insert(RecipeDefinition::composite(name, output_amount, ledger))
    }

    fn insert(&mut self, recipe: RecipeDefinition) -> Result<&mut Self, CatalogError> {
        if self.get(&recipe.name).is_some() {
            return Err(CatalogError::Duplicate(recipe.name));
        }
        self.recipes.push(recipe);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RecipeDefinition> {
        self.recipes.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecipeDefinition> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
