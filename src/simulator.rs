//! Step-by-step reaction simulation for a single container

use std::fmt;

use itertools::Itertools;
use tracing::{debug, info};

use crate::catalog::RecipeCatalog;
use crate::error::ReactionError;
use crate::ledger::QuantityLedger;
use crate::matcher::find_reaction;
use crate::models::{Quantity, RecipeDefinition};

/// Tunables for a simulation run
#[derive(Debug, Clone, Copy)]
pub struct SimulatorConfig {
    /// Container temperature in °C. Recipes do not depend on it yet.
    pub temperature: i32,
    /// Upper bound on reactions applied by [`Simulator::run`]
    pub max_steps: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            temperature: 20,
            max_steps: 64,
        }
    }
}

/// One applied reaction
#[derive(Debug, Clone)]
pub struct Reaction {
    pub recipe: String,
    pub ratio: u64,
    /// Reagents removed from the container, in container order
    pub consumed: Vec<Quantity>,
    pub produced: Quantity,
    /// Container contents once the reaction finished
    pub after: QuantityLedger,
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let consumed: Vec<String> = self.consumed.iter().map(|q| q.to_string()).collect();
        write!(
            f,
            "{} x{}: {} -> {}",
            self.recipe,
            self.ratio,
            consumed.join(" + "),
            self.produced
        )
    }
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Reacted(Reaction),
    /// Nothing in the container can react; the container is unchanged.
    NoReaction,
}

/// A container of chemicals reacting against a recipe catalog.
///
/// Each [`step`](Simulator::step) applies at most one reaction, at the
/// largest ratio the reagents allow.
#[derive(Debug)]
pub struct Simulator<'c> {
    catalog: &'c RecipeCatalog,
    ledger: QuantityLedger,
    config: SimulatorConfig,
}

impl<'c> Simulator<'c> {
    pub fn new(catalog: &'c RecipeCatalog, ledger: QuantityLedger) -> Self {
        Self::with_config(catalog, ledger, SimulatorConfig::default())
    }

    pub fn with_config(catalog: &'c RecipeCatalog, ledger: QuantityLedger, config: SimulatorConfig) -> Self {
        Self {
            catalog,
            ledger,
            config,
        }
    }

    pub fn ledger(&self) -> &QuantityLedger {
        &self.ledger
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Apply the first available reaction.
    ///
    /// The step is all-or-nothing: on error the container is left exactly
    /// as it was before the call.
    pub fn step(&mut self) -> Result<StepOutcome, ReactionError> {
        debug!(temperature = self.config.temperature, container = %self.ledger, "stepping");
        let candidates = self.candidate_recipes()?;
        let Some(recipe) = self.select(&candidates)? else {
            debug!("no reaction possible");
            return Ok(StepOutcome::NoReaction);
        };
        let ratio = self.limiting_ratio(recipe)?;

        let mut next = self.ledger.clone();
        let mut consumed = Vec::new();
        for reagent in self.ledger.values() {
            if let Some(component) = recipe.component(&reagent.name) {
                let mut taken = component.scaled(1);
                taken.scale(ratio);
                next.deplete(&taken)?;
                consumed.push(taken);
            }
        }
        let output = recipe
            .output_amount
            .checked_mul(ratio)
            .ok_or_else(|| ReactionError::Overflow {
                name: recipe.name.clone(),
            })?;
        let produced = Quantity::new(recipe.name.clone(), output);
        next.merge(produced.clone())?;

        self.ledger = next;
        info!(recipe = %recipe.name, ratio, container = %self.ledger, "reaction applied");

        Ok(StepOutcome::Reacted(Reaction {
            recipe: recipe.name.clone(),
            ratio,
            consumed,
            produced,
            after: self.ledger.clone(),
        }))
    }

    /// Step until the container settles or `max_steps` reactions have run.
    pub fn run(&mut self) -> Result<Vec<Reaction>, ReactionError> {
        let mut applied = Vec::new();
        while applied.len() < self.config.max_steps {
            match self.step()? {
                StepOutcome::Reacted(reaction) => applied.push(reaction),
                StepOutcome::NoReaction => break,
            }
        }
        Ok(applied)
    }

    /// Every distinct recipe that some subset of the container could trigger.
    fn candidate_recipes(&self) -> Result<Vec<&'c RecipeDefinition>, ReactionError> {
        let entries = self.ledger.as_slice();
        let mut found: Vec<&'c RecipeDefinition> = Vec::new();

        for size in 1..=entries.len() {
            for picked in entries.iter().combinations(size) {
                let group = QuantityLedger::from_sequence(picked)?;
                if let Some(recipe) = find_reaction(self.catalog, &group) {
                    if !found.iter().any(|r| r.name == recipe.name) {
                        debug!(recipe = %recipe.name, group = %group, "candidate reaction");
                        found.push(recipe);
                    }
                }
            }
        }
        Ok(found)
    }

    /// Prefer the recipe whose last-placed reagent sits earliest in the
    /// container. Equal positions fall back to recipe name.
    ///
    /// `None` only when there are no candidates at all.
    fn select(&self, candidates: &[&'c RecipeDefinition]) -> Result<Option<&'c RecipeDefinition>, ReactionError> {
        let mut ranked = Vec::with_capacity(candidates.len());
        for &recipe in candidates {
            let index = self
                .rightmost_reagent(recipe)
                .ok_or_else(|| ReactionError::Unanchored {
                    recipe: recipe.name.clone(),
                })?;
            ranked.push((index, recipe.name.as_str(), recipe));
        }
        Ok(ranked
            .into_iter()
            .min_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)))
            .map(|(_, _, recipe)| recipe))
    }

    fn rightmost_reagent(&self, recipe: &RecipeDefinition) -> Option<usize> {
        self.ledger
            .names()
            .enumerate()
            .rev()
            .find(|(_, name)| recipe.has_component(name))
            .map(|(index, _)| index)
    }

    /// Batches the scarcest reagent allows.
    fn limiting_ratio(&self, recipe: &RecipeDefinition) -> Result<u64, ReactionError> {
        let ratio = self
            .ledger
            .values()
            .filter_map(|reagent| recipe.ratio_for(reagent))
            .min()
            .ok_or_else(|| ReactionError::EmptyRatio {
                recipe: recipe.name.clone(),
            })?;

        if ratio == 0 {
            return Err(ReactionError::ZeroRatio {
                recipe: recipe.name.clone(),
            });
        }
        Ok(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(pairs: &[(&str, u64)]) -> QuantityLedger {
        QuantityLedger::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn reacted(outcome: StepOutcome) -> Reaction {
        match outcome {
            StepOutcome::Reacted(reaction) => reaction,
            StepOutcome::NoReaction => panic!("expected a reaction"),
        }
    }

    #[test]
    fn test_ammonia_ratio() {
        let catalog = RecipeCatalog::standard().unwrap();
        let mut sim = Simulator::new(&catalog, container(&[("hydrogen", 17), ("nitrogen", 4)]));

        let reaction = reacted(sim.step().unwrap());
        assert_eq!(reaction.recipe, "ammonia");
        assert_eq!(reaction.ratio, 4);
        assert_eq!(reaction.produced.amount, 12);
        assert_eq!(sim.ledger().to_string(), "hydrogen=5; ammonia=12");
    }

    #[test]
    fn test_full_container_scenario() {
        let catalog = RecipeCatalog::standard().unwrap();
        let mut sim = Simulator::new(
            &catalog,
            container(&[("hydrogen", 17), ("weldingfuel", 5), ("carbon", 5), ("nitrogen", 4)]),
        );

        // oil's last reagent (carbon, index 2) comes before ammonia's (nitrogen, index 3)
        let first = reacted(sim.step().unwrap());
        assert_eq!(first.recipe, "oil");
        assert_eq!(first.ratio, 5);
        assert_eq!(sim.ledger().to_string(), "hydrogen=12; nitrogen=4; oil=15");

        let second = reacted(sim.step().unwrap());
        assert_eq!(second.recipe, "ammonia");
        assert_eq!(second.ratio, 4);
        assert_eq!(sim.ledger().to_string(), "oil=15; ammonia=12");

        assert!(matches!(sim.step().unwrap(), StepOutcome::NoReaction));
    }

    #[test]
    fn test_settled_container_never_changes() {
        let catalog = RecipeCatalog::standard().unwrap();
        let mut sim = Simulator::new(&catalog, container(&[("hydrogen", 2), ("nitrogen", 9), ("oxygen", 1)]));
        for _ in 0..3 {
            assert!(matches!(sim.step().unwrap(), StepOutcome::NoReaction));
            assert_eq!(sim.ledger().to_string(), "hydrogen=2; nitrogen=9; oxygen=1");
        }
    }

    #[test]
    fn test_empty_container() {
        let catalog = RecipeCatalog::standard().unwrap();
        let mut sim = Simulator::new(&catalog, QuantityLedger::new());
        assert!(matches!(sim.step().unwrap(), StepOutcome::NoReaction));
    }

    #[test]
    fn test_run_until_settled() {
        let catalog = RecipeCatalog::standard().unwrap();
        let mut sim = Simulator::new(
            &catalog,
            container(&[("hydrogen", 17), ("weldingfuel", 5), ("carbon", 5), ("nitrogen", 4)]),
        );
        let applied = sim.run().unwrap();
        let names: Vec<_> = applied.iter().map(|r| r.recipe.as_str()).collect();
        assert_eq!(names, vec!["oil", "ammonia"]);
        assert_eq!(applied[1].after.to_string(), "oil=15; ammonia=12");
        assert_eq!(applied[0].to_string(), "oil x5: hydrogen=5 + weldingfuel=5 + carbon=5 -> oil=15");
    }

    #[test]
    fn test_run_respects_step_limit() {
        let catalog = RecipeCatalog::standard().unwrap();
        let config = SimulatorConfig {
            max_steps: 1,
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::with_config(
            &catalog,
            container(&[("hydrogen", 17), ("weldingfuel", 5), ("carbon", 5), ("nitrogen", 4)]),
            config,
        );
        assert_eq!(sim.run().unwrap().len(), 1);
        assert!(sim.ledger().contains_name("nitrogen"));
    }

    #[test]
    fn test_equal_positions_fall_back_to_name() {
        let mut catalog = RecipeCatalog::new();
        catalog
            .add_composite("xenolith", 1, [("basalt", 1)])
            .unwrap()
            .add_composite("wacke", 1, [("arkose", 1), ("basalt", 1)])
            .unwrap();
        let mut sim = Simulator::new(&catalog, container(&[("arkose", 1), ("basalt", 1)]));
        let reaction = reacted(sim.step().unwrap());
        assert_eq!(reaction.recipe, "wacke");
        assert_eq!(sim.ledger().to_string(), "wacke=1");
    }

    #[test]
    fn test_products_feed_later_steps() {
        let mut catalog = RecipeCatalog::new();
        catalog
            .add_base("hydrogen")
            .unwrap()
            .add_base("nitrogen")
            .unwrap()
            .add_base("oxygen")
            .unwrap()
            .add_composite("ammonia", 3, [("hydrogen", 3), ("nitrogen", 1)])
            .unwrap()
            .add_composite("fertilizer", 2, [("ammonia", 3), ("oxygen", 1)])
            .unwrap();
        let mut sim = Simulator::new(&catalog, container(&[("oxygen", 2), ("hydrogen", 6), ("nitrogen", 2)]));
        let applied = sim.run().unwrap();
        let names: Vec<_> = applied.iter().map(|r| r.recipe.as_str()).collect();
        assert_eq!(names, vec!["ammonia", "fertilizer"]);
        assert_eq!(sim.ledger().to_string(), "fertilizer=4");
    }

    #[test]
    fn test_ratio_guards() {
        let catalog = RecipeCatalog::standard().unwrap();
        let ammonia = catalog.get("ammonia").unwrap();

        let short = Simulator::new(&catalog, container(&[("hydrogen", 2), ("nitrogen", 5)]));
        let err = short.limiting_ratio(ammonia).unwrap_err();
        assert_eq!(
            err,
            ReactionError::ZeroRatio {
                recipe: "ammonia".to_string()
            }
        );

        let unrelated = Simulator::new(&catalog, container(&[("oxygen", 5)]));
        assert_eq!(
            unrelated.limiting_ratio(ammonia).unwrap_err(),
            ReactionError::EmptyRatio {
                recipe: "ammonia".to_string()
            }
        );
    }

    #[test]
    fn test_subsets_of_every_size_are_matched() {
        let mut catalog = RecipeCatalog::new();
        catalog
            .add_composite("pair", 1, [("b", 1), ("d", 1)])
            .unwrap()
            .add_composite("triple", 1, [("a", 1), ("c", 1), ("d", 1)])
            .unwrap();
        let sim = Simulator::new(&catalog, container(&[("a", 1), ("b", 1), ("c", 1), ("d", 1)]));
        let found: Vec<_> = sim
            .candidate_recipes()
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(found, vec!["pair", "triple"]);
    }

    #[test]
    fn test_product_overflow_leaves_container_untouched() {
        let mut catalog = RecipeCatalog::new();
        catalog.add_composite("plasma", 10, [("hydrogen", 1)]).unwrap();
        let start = container(&[("hydrogen", u64::MAX / 2)]);
        let mut sim = Simulator::new(&catalog, start.clone());

        let err = sim.step().unwrap_err();
        assert_eq!(
            err,
            ReactionError::Overflow {
                name: "plasma".to_string()
            }
        );
        assert_eq!(sim.ledger().to_string(), start.to_string());
    }

    #[test]
    fn test_product_merge_overflow_leaves_container_untouched() {
        let mut catalog = RecipeCatalog::new();
        catalog.add_composite("plasma", 1, [("hydrogen", 1)]).unwrap();
        let start = container(&[("plasma", u64::MAX), ("hydrogen", 1)]);
        let mut sim = Simulator::new(&catalog, start.clone());

        assert!(matches!(sim.step(), Err(ReactionError::Overflow { .. })));
        assert_eq!(sim.ledger().to_string(), start.to_string());
    }

    #[test]
    fn test_candidate_without_reagents_is_invalid_state() {
        let catalog = RecipeCatalog::standard().unwrap();
        let sim = Simulator::new(&catalog, container(&[("oxygen", 5)]));
        let ammonia = catalog.get("ammonia").unwrap();

        assert_eq!(
            sim.select(&[ammonia]).unwrap_err(),
            ReactionError::Unanchored {
                recipe: "ammonia".to_string()
            }
        );
        assert!(sim.select(&[]).unwrap().is_none());
    }
}
