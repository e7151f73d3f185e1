//! Matching a group of reagents against the catalog

use tracing::trace;

use crate::catalog::RecipeCatalog;
use crate::ledger::QuantityLedger;
use crate::models::{Quantity, RecipeDefinition};

/// Find the first composite recipe whose components are exactly covered by `reagents`.
///
/// The group must have the same number of chemicals as the recipe has
/// components, and every reagent must be one of those components in at
/// least the required amount. Catalog order decides between recipes that
/// both fit.
pub fn find_reaction<'c>(
    catalog: &'c RecipeCatalog,
    reagents: &QuantityLedger,
) -> Option<&'c RecipeDefinition> {
    catalog
        .iter()
        .filter(|recipe| !recipe.is_terminal())
        .filter(|recipe| recipe.component_count() == reagents.len())
        .find(|recipe| reagents.values().all(|reagent| supplies_component(reagent, recipe)))
        .inspect(|recipe| trace!(recipe = %recipe.name, group = %reagents, "group matches recipe"))
}

fn supplies_component(reagent: &Quantity, recipe: &RecipeDefinition) -> bool {
    recipe.components().any(|component| reagent.has_enough(component))
}
