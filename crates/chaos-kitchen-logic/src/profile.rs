//! Player behaviour profile, fed by the session and read by the report card.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{IngredientId, ToolId};
use crate::tuning::PerformanceTuning;

const MAX_SCORE: u32 = 100;
const MISTAKE_COST: u32 = 5;
const FAST_REWARD: u32 = 3;
const SLOW_STRESS: u32 = 10;
const FAST_RELIEF: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeKind {
    WrongIngredientOrState,
}

impl MistakeKind {
    pub fn label(self) -> &'static str {
        match self {
            MistakeKind::WrongIngredientOrState => "wrong_ingredient_or_state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    ingredient_uses: BTreeMap<IngredientId, u32>,
    tool_uses: BTreeMap<ToolId, u32>,
    mistakes: Vec<MistakeKind>,
    /// Running mean of the remaining-time ratio over completed orders.
    average_completion: f64,
    completions: u32,
    adaptability: u32,
    stress: u32,
    fast_threshold: f64,
    slow_threshold: f64,
}

impl PlayerProfile {
    pub fn new(perf: &PerformanceTuning) -> Self {
        Self {
            ingredient_uses: BTreeMap::new(),
            tool_uses: BTreeMap::new(),
            mistakes: Vec::new(),
            average_completion: 0.0,
            completions: 0,
            adaptability: MAX_SCORE,
            stress: 0,
            fast_threshold: perf.fast_completion,
            slow_threshold: perf.slow_completion,
        }
    }

    pub fn track_ingredient(&mut self, ingredient: IngredientId) {
        *self.ingredient_uses.entry(ingredient).or_insert(0) += 1;
    }

    pub fn track_tool(&mut self, tool: ToolId) {
        *self.tool_uses.entry(tool).or_insert(0) += 1;
    }

    pub fn track_mistake(&mut self, kind: MistakeKind) {
        self.mistakes.push(kind);
        self.adaptability = self.adaptability.saturating_sub(MISTAKE_COST);
    }

    /// Fold one completed order's remaining-time ratio into the profile.
    pub fn track_order_completion(&mut self, time_percent: f64) {
        self.completions += 1;
        let n = self.completions as f64;
        self.average_completion = (self.average_completion * (n - 1.0) + time_percent) / n;

        if time_percent < self.slow_threshold {
            self.stress = (self.stress + SLOW_STRESS).min(MAX_SCORE);
        } else if time_percent > self.fast_threshold {
            self.stress = self.stress.saturating_sub(FAST_RELIEF);
            self.adaptability = (self.adaptability + FAST_REWARD).min(MAX_SCORE);
        }
    }

    pub fn ingredient_uses(&self) -> &BTreeMap<IngredientId, u32> {
        &self.ingredient_uses
    }

    pub fn tool_uses(&self) -> &BTreeMap<ToolId, u32> {
        &self.tool_uses
    }

    pub fn mistakes(&self) -> &[MistakeKind] {
        &self.mistakes
    }

    pub fn average_completion(&self) -> f64 {
        self.average_completion
    }

    pub fn adaptability(&self) -> u32 {
        self.adaptability
    }

    pub fn stress(&self) -> u32 {
        self.stress
    }

    /// Most used ingredients, most first. Ties keep catalog order.
    pub fn top_ingredients(&self, count: usize) -> Vec<(IngredientId, u32)> {
        let mut uses: Vec<(IngredientId, u32)> =
            self.ingredient_uses.iter().map(|(&id, &n)| (id, n)).collect();
        uses.sort_by(|a, b| b.1.cmp(&a.1));
        uses.truncate(count);
        uses
    }

    pub fn total_ingredient_uses(&self) -> u32 {
        self.ingredient_uses.values().sum()
    }

    pub fn reset(&mut self) {
        self.ingredient_uses.clear();
        self.tool_uses.clear();
        self.mistakes.clear();
        self.average_completion = 0.0;
        self.completions = 0;
        self.adaptability = MAX_SCORE;
        self.stress = 0;
    }
}
