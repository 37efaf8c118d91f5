//! Tunable gameplay constants.
//!
//! Every balance number the engines read lives here, grouped by subsystem.
//! Sections use `#[serde(default)]` so a tuning document only has to name
//! the values it changes:
//!
//! ```
//! use chaos_kitchen_logic::tuning::Tuning;
//!
//! let tuning = Tuning::from_json(r#"{ "chef": { "initial_warning_time": 20.0 } }"#).unwrap();
//! assert_eq!(tuning.chef.initial_warning_time, 20.0);
//! assert_eq!(tuning.chef.min_warning_time, 10.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Context in which a chef rule becomes eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTrigger {
    Success,
    FastCompletion,
    MultipleSuccess,
}

/// Selection weight and trigger for one rule kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub weight: f64,
    pub trigger: RuleTrigger,
}

/// Per-rule configuration, one field per rule kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    pub ban_ingredient: RuleConfig,
    pub ban_tool: RuleConfig,
    pub reduce_time: RuleConfig,
    pub increase_complexity: RuleConfig,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            ban_ingredient: RuleConfig {
                weight: 0.3,
                trigger: RuleTrigger::Success,
            },
            ban_tool: RuleConfig {
                weight: 0.2,
                trigger: RuleTrigger::Success,
            },
            reduce_time: RuleConfig {
                weight: 0.3,
                trigger: RuleTrigger::FastCompletion,
            },
            increase_complexity: RuleConfig {
                weight: 0.2,
                trigger: RuleTrigger::MultipleSuccess,
            },
        }
    }
}

/// Escalation engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChefTuning {
    /// Seconds before the first escalation.
    pub initial_warning_time: f32,
    /// Multiplier applied to the warning timer after each rule (< 1).
    pub escalation_rate: f32,
    /// Floor for the warning timer.
    pub min_warning_time: f32,
    /// Seconds before an escalation at which the warning fires.
    pub warning_lead: f32,
    /// Chance that a timed escalation also applies a rule.
    pub escalate_rule_chance: f64,
    pub max_banned_ingredients: usize,
    pub max_banned_tools: usize,
    /// Time modifier lost per escalation level.
    pub time_step_per_level: f32,
    pub min_time_modifier: f32,
    /// Every n-th completed order triggers a `multiple_success` rule.
    pub multiple_success_every: u32,
    pub rules: RuleTable,
}

impl Default for ChefTuning {
    fn default() -> Self {
        Self {
            initial_warning_time: 30.0,
            escalation_rate: 0.85,
            min_warning_time: 10.0,
            warning_lead: 5.0,
            escalate_rule_chance: 0.4,
            max_banned_ingredients: 2,
            max_banned_tools: 1,
            time_step_per_level: 0.1,
            min_time_modifier: 0.5,
            multiple_success_every: 3,
            rules: RuleTable::default(),
        }
    }
}

/// Order scoring and performance thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceTuning {
    /// Remaining-time ratio at or above which a completion counts as fast.
    pub fast_completion: f64,
    /// Remaining-time ratio at or below which a completion counts as slow.
    pub slow_completion: f64,
    /// Score multiplier per unit of remaining-time ratio.
    pub speed_bonus: f64,
    pub mistake_penalty: u32,
    /// Mistakes on one order that earn a `MULTIPLE_MISTAKES` reaction.
    pub multiple_mistakes: u32,
}

impl Default for PerformanceTuning {
    fn default() -> Self {
        Self {
            fast_completion: 0.7,
            slow_completion: 0.3,
            speed_bonus: 0.5,
            mistake_penalty: 20,
            multiple_mistakes: 3,
        }
    }
}

/// Relative likelihood of each disaster kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisasterWeights {
    pub fire: f64,
    pub power_outage: f64,
    pub gas_leak: f64,
    pub flood: f64,
}

impl Default for DisasterWeights {
    fn default() -> Self {
        Self {
            fire: 0.35,
            power_outage: 0.30,
            gas_leak: 0.20,
            flood: 0.15,
        }
    }
}

/// Disaster scheduler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisasterTuning {
    /// Quiet seconds required after a disaster ends (or the session starts).
    pub min_time_between: f32,
    pub base_chance: f64,
    pub chance_per_level: f64,
    /// Seconds between random checks once the cooldown has passed.
    pub check_interval: f32,
    pub weights: DisasterWeights,
    /// Player must be closer than this to pick an emergency item up.
    pub pickup_radius: f32,
    /// Added to a disaster's danger zone to get the usable range.
    pub use_margin: f32,
}

impl Default for DisasterTuning {
    fn default() -> Self {
        Self {
            min_time_between: 45.0,
            base_chance: 0.05,
            chance_per_level: 0.02,
            check_interval: 10.0,
            weights: DisasterWeights::default(),
            pickup_radius: 2.0,
            use_margin: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    /// Minimum seconds between requests to a live agent.
    pub message_cooldown: f64,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            message_cooldown: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub target_orders: u32,
    /// Pause between one order ending and the next appearing.
    pub next_order_delay: f32,
    pub interact_radius: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            target_orders: 10,
            next_order_delay: 2.0,
            interact_radius: 2.5,
        }
    }
}

/// Complete tuning document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub chef: ChefTuning,
    pub performance: PerformanceTuning,
    pub disasters: DisasterTuning,
    pub agent: AgentTuning,
    pub session: SessionTuning,
}

/// Failure to load a tuning document.
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("cannot read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl Tuning {
    /// Parse and validate a JSON tuning document.
    pub fn from_json(text: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(text)?;
        let problems = tuning.validate();
        if problems.is_empty() {
            Ok(tuning)
        } else {
            Err(TuningError::Invalid(problems))
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check the document for values the engines cannot work with.
    /// Returns a list of problems (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let chef = &self.chef;

        if chef.min_warning_time <= 0.0 {
            errors.push("chef.min_warning_time must be positive".into());
        }
        if chef.initial_warning_time < chef.min_warning_time {
            errors.push("chef.initial_warning_time must be >= chef.min_warning_time".into());
        }
        if !(chef.escalation_rate > 0.0 && chef.escalation_rate < 1.0) {
            errors.push("chef.escalation_rate must be in (0, 1)".into());
        }
        if chef.warning_lead < 0.0 || chef.warning_lead >= chef.min_warning_time {
            errors.push("chef.warning_lead must be in [0, chef.min_warning_time)".into());
        }
        if !(0.0..=1.0).contains(&chef.escalate_rule_chance) {
            errors.push("chef.escalate_rule_chance must be in [0, 1]".into());
        }
        if !(chef.min_time_modifier > 0.0 && chef.min_time_modifier <= 1.0) {
            errors.push("chef.min_time_modifier must be in (0, 1]".into());
        }
        if chef.time_step_per_level < 0.0 {
            errors.push("chef.time_step_per_level must not be negative".into());
        }
        if chef.multiple_success_every == 0 {
            errors.push("chef.multiple_success_every must be at least 1".into());
        }
        let rules = &chef.rules;
        for (name, rule) in [
            ("ban_ingredient", &rules.ban_ingredient),
            ("ban_tool", &rules.ban_tool),
            ("reduce_time", &rules.reduce_time),
            ("increase_complexity", &rules.increase_complexity),
        ] {
            if rule.weight < 0.0 {
                errors.push(format!("chef.rules.{} weight must not be negative", name));
            }
        }

        let perf = &self.performance;
        if perf.slow_completion > perf.fast_completion {
            errors.push(
                "performance.slow_completion must not exceed performance.fast_completion".into(),
            );
        }
        if perf.speed_bonus < 0.0 {
            errors.push("performance.speed_bonus must not be negative".into());
        }

        let dis = &self.disasters;
        if dis.check_interval <= 0.0 {
            errors.push("disasters.check_interval must be positive".into());
        }
        if dis.min_time_between < 0.0 {
            errors.push("disasters.min_time_between must not be negative".into());
        }
        if dis.base_chance < 0.0 || dis.chance_per_level < 0.0 {
            errors.push("disaster chances must not be negative".into());
        }
        let w = &dis.weights;
        if [w.fire, w.power_outage, w.gas_leak, w.flood]
            .iter()
            .any(|&x| x < 0.0)
        {
            errors.push("disasters.weights must not be negative".into());
        }
        if w.fire + w.power_outage + w.gas_leak + w.flood <= 0.0 {
            errors.push("disasters.weights must not all be zero".into());
        }
        if dis.pickup_radius <= 0.0 {
            errors.push("disasters.pickup_radius must be positive".into());
        }

        if self.agent.message_cooldown < 0.0 {
            errors.push("agent.message_cooldown must not be negative".into());
        }
        if self.session.target_orders == 0 {
            errors.push("session.target_orders must be at least 1".into());
        }
        if self.session.next_order_delay < 0.0 {
            errors.push("session.next_order_delay must not be negative".into());
        }

        errors
    }
}
