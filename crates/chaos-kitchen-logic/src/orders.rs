//! Order engine: legal order generation, fulfilment tracking and scoring.
//!
//! Only one order is active at a time. Ban state is read through
//! [`RuleView`]; this module never mutates it.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{IngredientId, PrepState, Recipe, ToolId, RECIPES};
use crate::escalation::RuleView;
use crate::tuning::PerformanceTuning;

/// Guards `floor` against results like `111.99999` from float scaling.
const SCORE_EPSILON: f64 = 1e-9;

/// Recipes whose ingredients and implied tools are all currently allowed.
pub fn legal_recipes(rules: &impl RuleView) -> Vec<&'static Recipe> {
    RECIPES
        .iter()
        .filter(|recipe| {
            !recipe
                .ingredients
                .iter()
                .any(|&id| rules.is_ingredient_banned(id))
        })
        .filter(|recipe| {
            !recipe
                .required_tools()
                .into_iter()
                .any(|tool| rules.is_tool_banned(tool))
        })
        .collect()
}

/// Recipe used when nothing is legal: the first raw-only one, else the first.
pub fn fallback_recipe() -> &'static Recipe {
    RECIPES
        .iter()
        .find(|recipe| recipe.is_raw_only())
        .unwrap_or(&RECIPES[0])
}

/// Ban view used for picking things up while an order is active.
///
/// A fallback order only exists because every recipe needs something banned,
/// so its own ingredients and tools stay on offer until it is done.
pub struct OrderAllowance<'a, V: RuleView> {
    rules: &'a V,
    order: Option<&'a Order>,
}

impl<'a, V: RuleView> OrderAllowance<'a, V> {
    pub fn new(rules: &'a V, order: Option<&'a Order>) -> Self {
        Self { rules, order }
    }

    fn fallback_recipe(&self) -> Option<&'static Recipe> {
        self.order
            .filter(|order| order.is_fallback())
            .map(|order| order.recipe)
    }
}

impl<V: RuleView> RuleView for OrderAllowance<'_, V> {
    fn is_ingredient_banned(&self, ingredient: IngredientId) -> bool {
        self.rules.is_ingredient_banned(ingredient)
            && !self
                .fallback_recipe()
                .is_some_and(|recipe| recipe.requires(ingredient))
    }

    fn is_tool_banned(&self, tool: ToolId) -> bool {
        self.rules.is_tool_banned(tool)
            && !self
                .fallback_recipe()
                .is_some_and(|recipe| recipe.required_tools().contains(&tool))
    }

    fn escalation_level(&self) -> u32 {
        self.rules.escalation_level()
    }

    fn time_modifier(&self) -> f32 {
        self.rules.time_modifier()
    }
}

/// The active order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub recipe: &'static Recipe,
    progress: BTreeSet<(IngredientId, PrepState)>,
    pub time_remaining: f32,
    pub total_time: f32,
    pub mistakes: u32,
    fallback: bool,
}

impl Order {
    fn new(recipe: &'static Recipe, time_modifier: f32) -> Self {
        let total_time = recipe.base_time * time_modifier;
        Self {
            recipe,
            progress: BTreeSet::new(),
            time_remaining: total_time,
            total_time,
            mistakes: 0,
            fallback: false,
        }
    }

    /// Whether this order was generated because no recipe was legal.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn is_complete(&self) -> bool {
        self.recipe
            .ingredients
            .iter()
            .all(|&id| self.progress.contains(&(id, self.recipe.required_state(id))))
    }

    /// Whether the exact `(ingredient, state)` pair has been delivered.
    pub fn has_delivered(&self, ingredient: IngredientId, state: PrepState) -> bool {
        self.progress.contains(&(ingredient, state))
    }

    /// Remaining-time ratio in `[0, 1]`.
    pub fn time_percent(&self) -> f32 {
        if self.total_time <= 0.0 {
            return 0.0;
        }
        (self.time_remaining / self.total_time).clamp(0.0, 1.0)
    }
}

/// One required ingredient with its delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub ingredient: IngredientId,
    pub required_state: PrepState,
    pub delivered: bool,
}

/// Final tally of a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderResult {
    pub recipe: &'static str,
    pub score: u32,
    /// Clamped to zero when the order ran out.
    pub time_remaining: f32,
    pub total_time: f32,
    pub mistakes: u32,
    pub perfect: bool,
}

/// `floor(base * (1 + pct * bonus)) - penalty * mistakes`, never negative.
pub fn order_score(
    base_score: u32,
    time_percent: f64,
    mistakes: u32,
    tuning: &PerformanceTuning,
) -> u32 {
    let scaled = (base_score as f64 * (1.0 + time_percent * tuning.speed_bonus) + SCORE_EPSILON)
        .floor() as i64;
    let penalty = mistakes as i64 * tuning.mistake_penalty as i64;
    (scaled - penalty).max(0) as u32
}

pub struct OrderSystem {
    perf: PerformanceTuning,
    active: Option<Order>,
    orders_generated: u32,
}

impl OrderSystem {
    pub fn new(perf: &PerformanceTuning) -> Self {
        Self {
            perf: perf.clone(),
            active: None,
            orders_generated: 0,
        }
    }

    /// Start a new order from the recipes legal under the current bans.
    pub fn generate_order<R: Rng + ?Sized>(&mut self, rules: &impl RuleView, rng: &mut R) -> &Order {
        let legal = legal_recipes(rules);
        if legal.is_empty() {
            log::warn!("no legal recipe under current bans, falling back");
            return self.start(fallback_recipe(), rules.time_modifier(), true);
        }
        let recipe = legal[rng.gen_range(0..legal.len())];
        self.start(recipe, rules.time_modifier(), false)
    }

    /// Start an order for a specific recipe, replacing any active one.
    pub fn create_order(&mut self, recipe: &'static Recipe, time_modifier: f32) -> &Order {
        self.start(recipe, time_modifier, false)
    }

    fn start(&mut self, recipe: &'static Recipe, time_modifier: f32, fallback: bool) -> &Order {
        self.orders_generated += 1;
        let order = Order {
            fallback,
            ..Order::new(recipe, time_modifier)
        };
        log::info!(
            "order #{}: {} ({:.1}s)",
            self.orders_generated,
            recipe.name,
            order.total_time
        );
        self.active.insert(order)
    }

    /// Count down the active order. Returns `true` on the frame it runs out.
    ///
    /// The order is left in place so the caller can read it before clearing.
    pub fn update(&mut self, delta_seconds: f32) -> bool {
        let Some(order) = self.active.as_mut() else {
            return false;
        };
        let before = order.time_remaining;
        order.time_remaining -= delta_seconds;
        let timed_out = before > 0.0 && order.time_remaining <= 0.0;
        if timed_out {
            log::info!("order {} timed out", order.recipe.name);
        }
        timed_out
    }

    /// Check a delivery against the recipe, unlisted states counting as raw.
    /// Every rejected attempt counts as a mistake.
    pub fn can_add_ingredient(&mut self, ingredient: IngredientId, state: PrepState) -> bool {
        let Some(order) = self.active.as_mut() else {
            return false;
        };
        let wrong_ingredient = !order.recipe.requires(ingredient);
        let wrong_state = order.recipe.required_state(ingredient) != state;
        if wrong_ingredient || wrong_state {
            order.mistakes += 1;
            log::debug!(
                "rejected {} ({}) for {}, mistakes {}",
                ingredient.name(),
                state.label(),
                order.recipe.name,
                order.mistakes
            );
            return false;
        }
        true
    }

    /// Deliver an ingredient. Re-delivering an accepted pair changes nothing.
    pub fn add_ingredient(&mut self, ingredient: IngredientId, state: PrepState) -> bool {
        if !self.can_add_ingredient(ingredient, state) {
            return false;
        }
        if let Some(order) = self.active.as_mut() {
            order.progress.insert((ingredient, state));
        }
        true
    }

    pub fn is_order_complete(&self) -> bool {
        self.active.as_ref().is_some_and(Order::is_complete)
    }

    /// Score and clear the active order.
    pub fn complete_order(&mut self) -> Option<OrderResult> {
        let order = self.active.take()?;
        let score = order_score(
            order.recipe.base_score,
            order.time_percent() as f64,
            order.mistakes,
            &self.perf,
        );
        let result = OrderResult {
            recipe: order.recipe.name,
            score,
            time_remaining: order.time_remaining.max(0.0),
            total_time: order.total_time,
            mistakes: order.mistakes,
            perfect: order.mistakes == 0,
        };
        log::info!(
            "order {} done: score {} ({} mistakes)",
            result.recipe,
            result.score,
            result.mistakes
        );
        Some(result)
    }

    /// Drop the active order without scoring it.
    pub fn clear_order(&mut self) -> Option<Order> {
        self.active.take()
    }

    pub fn current_order(&self) -> Option<&Order> {
        self.active.as_ref()
    }

    pub fn progress(&self) -> Vec<ProgressEntry> {
        let Some(order) = &self.active else {
            return Vec::new();
        };
        order
            .recipe
            .ingredients
            .iter()
            .map(|&ingredient| {
                let required_state = order.recipe.required_state(ingredient);
                ProgressEntry {
                    ingredient,
                    required_state,
                    delivered: order.has_delivered(ingredient, required_state),
                }
            })
            .collect()
    }

    pub fn time_remaining(&self) -> f32 {
        self.active
            .as_ref()
            .map_or(0.0, |order| order.time_remaining.max(0.0))
    }

    pub fn time_percent(&self) -> f32 {
        self.active.as_ref().map_or(0.0, Order::time_percent)
    }

    pub fn orders_generated(&self) -> u32 {
        self.orders_generated
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.orders_generated = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{recipe_by_name, ToolId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Bans {
        ingredients: Vec<IngredientId>,
        tools: Vec<ToolId>,
        modifier: Option<f32>,
    }

    impl RuleView for Bans {
        fn is_ingredient_banned(&self, ingredient: IngredientId) -> bool {
            self.ingredients.contains(&ingredient)
        }
        fn is_tool_banned(&self, tool: ToolId) -> bool {
            self.tools.contains(&tool)
        }
        fn escalation_level(&self) -> u32 {
            0
        }
        fn time_modifier(&self) -> f32 {
            self.modifier.unwrap_or(1.0)
        }
    }

    fn system() -> OrderSystem {
        OrderSystem::new(&PerformanceTuning::default())
    }

    fn quick_snack() -> &'static Recipe {
        recipe_by_name("Quick Snack").unwrap()
    }

    #[test]
    fn test_legal_recipes_no_bans() {
        assert_eq!(legal_recipes(&Bans::default()).len(), RECIPES.len());
    }

    #[test]
    fn test_legal_recipes_respect_bans() {
        let bans = Bans {
            ingredients: vec![IngredientId::Bread],
            tools: vec![ToolId::Knife],
            ..Default::default()
        };
        let legal = legal_recipes(&bans);
        assert!(!legal.is_empty());
        for recipe in legal {
            assert!(!recipe.requires(IngredientId::Bread), "{}", recipe.name);
            assert!(!recipe.required_tools().contains(&ToolId::Knife));
        }
    }

    #[test]
    fn test_fallback_when_nothing_legal() {
        let bans = Bans {
            ingredients: vec![IngredientId::Bread, IngredientId::Lettuce],
            tools: vec![ToolId::Stove],
            ..Default::default()
        };
        assert!(legal_recipes(&bans).is_empty());
        let mut orders = system();
        let mut rng = StdRng::seed_from_u64(1);
        let order = orders.generate_order(&bans, &mut rng);
        assert_eq!(order.recipe.name, "Quick Snack");
        assert!(order.is_fallback());
        assert_eq!(fallback_recipe().name, "Quick Snack");
    }

    #[test]
    fn test_fallback_order_keeps_its_ingredients_on_offer() {
        let bans = Bans {
            ingredients: vec![IngredientId::Bread, IngredientId::Cheese],
            tools: vec![ToolId::Knife],
            ..Default::default()
        };
        let mut orders = system();
        let mut rng = StdRng::seed_from_u64(4);

        let order = orders.generate_order(&bans, &mut rng);
        assert!(order.is_fallback());
        let view = OrderAllowance::new(&bans, Some(order));
        assert!(!view.is_ingredient_banned(IngredientId::Bread));
        assert!(!view.is_ingredient_banned(IngredientId::Cheese));
        assert!(view.is_tool_banned(ToolId::Knife));

        // a regular order gets no exemption
        let order = orders.create_order(quick_snack(), 1.0);
        assert!(!order.is_fallback());
        let view = OrderAllowance::new(&bans, Some(order));
        assert!(view.is_ingredient_banned(IngredientId::Bread));
        assert!(OrderAllowance::new(&bans, None).is_ingredient_banned(IngredientId::Cheese));
    }

    #[test]
    fn test_time_modifier_applied() {
        let bans = Bans {
            modifier: Some(0.5),
            ..Default::default()
        };
        let mut orders = system();
        let mut rng = StdRng::seed_from_u64(2);
        let order = orders.generate_order(&bans, &mut rng);
        assert_eq!(order.total_time, order.recipe.base_time * 0.5);
        assert_eq!(order.time_remaining, order.total_time);
        assert_eq!(order.mistakes, 0);
    }

    #[test]
    fn test_perfect_fast_order_scores_112() {
        let mut orders = system();
        let order = orders.create_order(quick_snack(), 1.0);
        assert_eq!(order.total_time, 30.0);

        assert!(!orders.update(6.0));
        assert!(orders.add_ingredient(IngredientId::Bread, PrepState::Raw));
        assert!(!orders.is_order_complete());
        assert!(orders.add_ingredient(IngredientId::Cheese, PrepState::Raw));
        assert!(orders.is_order_complete());

        let result = orders.complete_order().unwrap();
        assert_eq!(result.score, 112);
        assert!(result.perfect);
        assert_eq!(result.time_remaining, 24.0);
        assert!(orders.current_order().is_none());
    }

    #[test]
    fn test_wrong_state_mistake_scores_73() {
        let mut orders = system();
        orders.create_order(quick_snack(), 1.0);

        assert!(!orders.add_ingredient(IngredientId::Cheese, PrepState::Cooked));
        assert!(orders.add_ingredient(IngredientId::Cheese, PrepState::Raw));
        assert!(orders.add_ingredient(IngredientId::Bread, PrepState::Raw));
        orders.update(20.0);

        let result = orders.complete_order().unwrap();
        assert_eq!(result.mistakes, 1);
        assert!(!result.perfect);
        assert_eq!(result.score, 73);
    }

    #[test]
    fn test_unlisted_ingredient_is_mistake() {
        let mut orders = system();
        orders.create_order(quick_snack(), 1.0);
        assert!(!orders.can_add_ingredient(IngredientId::Meat, PrepState::Raw));
        assert!(!orders.can_add_ingredient(IngredientId::Meat, PrepState::Raw));
        assert_eq!(orders.current_order().unwrap().mistakes, 2);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut orders = system();
        orders.create_order(quick_snack(), 1.0);
        orders.add_ingredient(IngredientId::Bread, PrepState::Raw);
        orders.add_ingredient(IngredientId::Cheese, PrepState::Raw);
        assert!(orders.is_order_complete());
        assert!(orders.add_ingredient(IngredientId::Cheese, PrepState::Raw));
        assert!(orders.is_order_complete());
        assert_eq!(orders.current_order().unwrap().mistakes, 0);
    }

    #[test]
    fn test_required_state_must_match() {
        let mut orders = system();
        orders.create_order(recipe_by_name("Grilled Cheese").unwrap(), 1.0);
        assert!(!orders.add_ingredient(IngredientId::Cheese, PrepState::Raw));
        assert!(orders.add_ingredient(IngredientId::Cheese, PrepState::Cooked));
        assert!(orders.add_ingredient(IngredientId::Bread, PrepState::Raw));
        assert!(orders.is_order_complete());
        let progress = orders.progress();
        assert!(progress.iter().all(|p| p.delivered));
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut orders = system();
        orders.create_order(quick_snack(), 1.0);
        assert!(!orders.update(29.0));
        assert!(orders.update(1.5));
        assert!(!orders.update(1.0));
        assert_eq!(orders.time_remaining(), 0.0);
        let result = orders.complete_order().unwrap();
        assert_eq!(result.time_remaining, 0.0);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_score_floored_at_zero() {
        let perf = PerformanceTuning::default();
        assert_eq!(order_score(80, 0.0, 10, &perf), 0);
        assert_eq!(order_score(200, 1.0, 0, &perf), 300);
    }

    #[test]
    fn test_no_active_order() {
        let mut orders = system();
        assert!(!orders.update(1.0));
        assert!(!orders.add_ingredient(IngredientId::Bread, PrepState::Raw));
        assert!(!orders.is_order_complete());
        assert!(orders.complete_order().is_none());
        assert!(orders.progress().is_empty());
    }
}
