//! Chef escalation engine.
//!
//! The head chef owns everything that makes the kitchen harder over time:
//! banned ingredients and tools, the escalation timer and level, and the
//! message on the board. Other engines only see it through [`RuleView`].
//!
//! Escalation happens two ways:
//! - **Timed**: every `warning_timer` seconds [`ChefAi::update`] escalates,
//!   which always produces a message and sometimes (40%) a random rule.
//! - **Performance**: [`ChefAi::on_order_completed`] triggers weighted rule
//!   selection for the `success`, `fast_completion` and `multiple_success`
//!   contexts.
//!
//! Every applied rule raises the escalation level by one and shrinks the
//! warning timer towards its floor.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentRequest, ChefAgent, ChefEvent, EventContext};
use crate::catalog::{IngredientId, ToolId};
use crate::tuning::{ChefTuning, PerformanceTuning, RuleConfig, RuleTable, RuleTrigger, Tuning};
use crate::weighted;

/// Read-only view of the chef's rules, for the order and disaster engines.
pub trait RuleView {
    fn is_ingredient_banned(&self, ingredient: IngredientId) -> bool;
    fn is_tool_banned(&self, tool: ToolId) -> bool;
    fn escalation_level(&self) -> u32;
    /// Multiplier applied to a recipe's base time for new orders.
    fn time_modifier(&self) -> f32;
}

/// Kinds of rule the chef can impose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    BanIngredient,
    BanTool,
    ReduceTime,
    IncreaseComplexity,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [
        RuleKind::BanIngredient,
        RuleKind::BanTool,
        RuleKind::ReduceTime,
        RuleKind::IncreaseComplexity,
    ];

    pub fn config(self, table: &RuleTable) -> RuleConfig {
        match self {
            RuleKind::BanIngredient => table.ban_ingredient,
            RuleKind::BanTool => table.ban_tool,
            RuleKind::ReduceTime => table.reduce_time,
            RuleKind::IncreaseComplexity => table.increase_complexity,
        }
    }
}

/// What applying a rule actually did. A ban at its cap becomes `TimeReduced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleEffect {
    IngredientBanned(IngredientId),
    ToolBanned(ToolId),
    TimeReduced,
    ComplexityIncreased,
}

/// Notifications delivered synchronously to registered listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ChefNotice {
    /// The next escalation is `seconds_remaining` away. Fires once per cycle.
    Warning { seconds_remaining: f32 },
    RuleApplied { rule: RuleKind, effect: RuleEffect },
    MessageChanged,
}

/// Text on the chef's board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefMessage {
    pub title: Option<String>,
    pub text: String,
}

impl ChefMessage {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for ChefMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} {}", title, self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Performance counters kept by the chef.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefStats {
    pub orders_completed: u32,
    pub fast_completions: u32,
    pub slow_completions: u32,
    pub perfect_orders: u32,
    pub timeouts: u32,
}

/// Display names of everything currently banned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BannedItems {
    pub ingredients: Vec<&'static str>,
    pub tools: Vec<&'static str>,
}

/// What happened during one [`ChefAi::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChefTick {
    pub warning: bool,
    pub escalated: bool,
}

const WELCOME: &str = "Welcome to my kitchen! Let's see if you can handle the heat...";

const ESCALATION_LINES: [(&str, &str); 4] = [
    ("SPEED IT UP!", "I don't have all day! Move faster!"),
    ("PERFECTION REQUIRED!", "Mistakes will NOT be tolerated!"),
    ("ADAPT OR LEAVE!", "A real chef adapts to ANY situation!"),
    (
        "STOP THINKING!",
        "Your hands should move faster than your brain!",
    ),
];

type Listener = Box<dyn FnMut(&ChefNotice)>;

/// The head chef.
pub struct ChefAi {
    chef: ChefTuning,
    perf: PerformanceTuning,

    banned_ingredients: BTreeSet<IngredientId>,
    banned_tools: BTreeSet<ToolId>,
    stats: ChefStats,

    warning_timer: f32,
    since_last_rule: f32,
    warning_armed: bool,
    escalation_level: u32,

    message: ChefMessage,
    clock: f64,
    agent: Box<dyn ChefAgent>,
    listeners: Vec<Listener>,
}

impl ChefAi {
    /// `tuning` must pass [`Tuning::validate`]; documents read through
    /// [`Tuning::from_json`] always do. Out-of-range chances or a zero
    /// `multiple_success_every` panic later during play.
    pub fn new(tuning: &Tuning, agent: Box<dyn ChefAgent>) -> Self {
        debug_assert!(
            tuning.validate().is_empty(),
            "invalid tuning: {:?}",
            tuning.validate()
        );
        Self {
            chef: tuning.chef.clone(),
            perf: tuning.performance.clone(),
            banned_ingredients: BTreeSet::new(),
            banned_tools: BTreeSet::new(),
            stats: ChefStats::default(),
            warning_timer: tuning.chef.initial_warning_time,
            since_last_rule: 0.0,
            warning_armed: true,
            escalation_level: 0,
            message: ChefMessage::plain(WELCOME),
            clock: 0.0,
            agent,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for rule, warning and message notices.
    pub fn on_notice(&mut self, listener: impl FnMut(&ChefNotice) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, notice: ChefNotice) {
        for listener in self.listeners.iter_mut() {
            listener(&notice);
        }
    }

    /// Advance the escalation timer.
    pub fn update<R: Rng + ?Sized>(&mut self, delta_seconds: f32, rng: &mut R) -> ChefTick {
        let mut tick = ChefTick::default();
        self.clock += delta_seconds as f64;
        self.since_last_rule += delta_seconds;

        if let Some(text) = self.agent.poll() {
            self.set_agent_message(text);
        }

        let until = self.warning_timer - self.since_last_rule;
        if self.warning_armed && until <= self.chef.warning_lead {
            self.warning_armed = false;
            tick.warning = true;
            self.notify(ChefNotice::Warning {
                seconds_remaining: until.max(0.0),
            });
        }

        if self.since_last_rule >= self.warning_timer {
            self.escalate(rng);
            self.since_last_rule = 0.0;
            self.warning_armed = true;
            tick.escalated = true;
        }
        tick
    }

    /// Timed escalation: a message, and with some probability a random rule.
    pub fn escalate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let context = EventContext {
            escalation_level: Some(self.escalation_level),
            banned_count: Some(self.banned_count()),
            total_orders: Some(self.stats.orders_completed),
            ..Default::default()
        };
        match self.ask_agent(ChefEvent::Escalation, context) {
            Some(text) => self.set_agent_message(text),
            None => {
                let (title, text) = ESCALATION_LINES[rng.gen_range(0..ESCALATION_LINES.len())];
                self.set_message(title, text);
            }
        }

        if rng.gen_bool(self.chef.escalate_rule_chance) {
            let rule = RuleKind::ALL[rng.gen_range(0..RuleKind::ALL.len())];
            self.apply_rule(rule, rng);
        }
    }

    /// React to a delivered order and escalate according to performance.
    pub fn on_order_completed<R: Rng + ?Sized>(
        &mut self,
        time_remaining: f32,
        total_time: f32,
        mistakes: u32,
        rng: &mut R,
    ) {
        self.stats.orders_completed += 1;
        let ratio = if total_time > 0.0 {
            time_remaining as f64 / total_time as f64
        } else {
            0.0
        };

        let reaction = if mistakes == 0 {
            ChefEvent::PerfectOrder
        } else if ratio >= self.perf.fast_completion {
            ChefEvent::FastCompletion
        } else if mistakes >= self.perf.multiple_mistakes {
            ChefEvent::MultipleMistakes
        } else {
            ChefEvent::OrderCompleted
        };
        let context = EventContext {
            time_percent: Some((ratio.max(0.0) * 100.0).round() as u32),
            mistakes: Some(mistakes),
            total_orders: Some(self.stats.orders_completed),
            ..Default::default()
        };
        if let Some(text) = self.ask_agent(reaction, context) {
            self.set_agent_message(text);
        }

        if ratio >= self.perf.fast_completion {
            self.stats.fast_completions += 1;
            self.trigger_rule(RuleTrigger::FastCompletion, rng);
        } else if ratio <= self.perf.slow_completion {
            self.stats.slow_completions += 1;
        }
        if mistakes == 0 {
            self.stats.perfect_orders += 1;
        }

        self.trigger_rule(RuleTrigger::Success, rng);

        if self.stats.orders_completed % self.chef.multiple_success_every == 0 {
            self.trigger_rule(RuleTrigger::MultipleSuccess, rng);
        }
    }

    pub fn on_order_timeout(&mut self) {
        self.stats.timeouts += 1;
        let context = EventContext {
            failure_count: Some(self.stats.timeouts),
            ..Default::default()
        };
        if let Some(text) = self.ask_agent(ChefEvent::Timeout, context) {
            self.set_agent_message(text);
        }
    }

    /// Weighted pick among rules eligible for `context`.
    ///
    /// Rules triggered by `success` are eligible in every context.
    pub fn trigger_rule<R: Rng + ?Sized>(
        &mut self,
        context: RuleTrigger,
        rng: &mut R,
    ) -> Option<RuleEffect> {
        let candidates: Vec<(RuleKind, f64)> = RuleKind::ALL
            .iter()
            .map(|&kind| (kind, kind.config(&self.chef.rules)))
            .filter(|(_, cfg)| cfg.trigger == context || cfg.trigger == RuleTrigger::Success)
            .map(|(kind, cfg)| (kind, cfg.weight))
            .collect();

        let rule = weighted::pick(&candidates, rng)?;
        Some(self.apply_rule(rule, rng))
    }

    /// Apply one rule and advance the escalation bookkeeping.
    pub fn apply_rule<R: Rng + ?Sized>(&mut self, rule: RuleKind, rng: &mut R) -> RuleEffect {
        let effect = match rule {
            RuleKind::BanIngredient => self.ban_random_ingredient(rng),
            RuleKind::BanTool => self.ban_random_tool(rng),
            RuleKind::ReduceTime => self.reduce_time_limit(),
            RuleKind::IncreaseComplexity => self.increase_complexity(),
        };

        self.escalation_level += 1;
        self.warning_timer =
            (self.warning_timer * self.chef.escalation_rate).max(self.chef.min_warning_time);
        log::info!(
            "chef rule {:?} -> {:?} (level {}, next escalation in {:.1}s)",
            rule,
            effect,
            self.escalation_level,
            self.warning_timer
        );
        self.notify(ChefNotice::RuleApplied { rule, effect });
        effect
    }

    fn ban_random_ingredient<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RuleEffect {
        if self.banned_ingredients.len() >= self.chef.max_banned_ingredients {
            return self.reduce_time_limit();
        }
        let available: Vec<IngredientId> = IngredientId::ALL
            .into_iter()
            .filter(|id| !self.banned_ingredients.contains(id))
            .collect();
        if available.is_empty() {
            return self.reduce_time_limit();
        }

        let banned = available[rng.gen_range(0..available.len())];
        self.banned_ingredients.insert(banned);

        let context = EventContext {
            ingredient: Some(banned),
            ..Default::default()
        };
        match self.ask_agent(ChefEvent::IngredientBanned, context) {
            Some(text) => self.set_agent_message(text),
            None => {
                let name = banned.name();
                self.set_message(
                    &format!("NO MORE {}!", name.to_uppercase()),
                    &format!(
                        "I'm TIRED of seeing {} in every dish! Find another way!",
                        name
                    ),
                );
            }
        }
        RuleEffect::IngredientBanned(banned)
    }

    fn ban_random_tool<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RuleEffect {
        if self.banned_tools.len() >= self.chef.max_banned_tools {
            return self.reduce_time_limit();
        }
        let available: Vec<ToolId> = ToolId::ALL
            .into_iter()
            .filter(|id| id.is_bannable() && !self.banned_tools.contains(id))
            .collect();
        if available.is_empty() {
            return self.reduce_time_limit();
        }

        let banned = available[rng.gen_range(0..available.len())];
        self.banned_tools.insert(banned);

        let context = EventContext {
            tool: Some(banned),
            ..Default::default()
        };
        match self.ask_agent(ChefEvent::ToolBanned, context) {
            Some(text) => self.set_agent_message(text),
            None => {
                let name = banned.name();
                self.set_message(
                    &format!("{} IS BROKEN!", name.to_uppercase()),
                    &format!("The {} is out of commission. Adapt or fail!", name),
                );
            }
        }
        RuleEffect::ToolBanned(banned)
    }

    fn reduce_time_limit(&mut self) -> RuleEffect {
        self.set_message(
            "TOO SLOW!",
            "You're moving like a snail! Time limits are now SHORTER!",
        );
        RuleEffect::TimeReduced
    }

    fn increase_complexity(&mut self) -> RuleEffect {
        self.set_message(
            "TOO EASY FOR YOU?",
            "Let's see how you handle MORE COMPLEX orders!",
        );
        RuleEffect::ComplexityIncreased
    }

    fn ask_agent(&mut self, event: ChefEvent, context: EventContext) -> Option<String> {
        let request = AgentRequest {
            event,
            context,
            now: self.clock,
        };
        let reply = self.agent.respond(&request);
        if reply.is_none() {
            log::debug!("chef agent gave no reply for {:?}", event);
        }
        reply
    }

    fn set_message(&mut self, title: &str, text: &str) {
        self.message = ChefMessage {
            title: Some(title.to_string()),
            text: text.to_string(),
        };
        self.notify(ChefNotice::MessageChanged);
    }

    fn set_agent_message(&mut self, text: String) {
        self.message = ChefMessage::plain(text);
        self.notify(ChefNotice::MessageChanged);
    }

    /// Post an out-of-band notice (disasters, verdicts) as the chef's message.
    pub fn announce(&mut self, text: impl Into<String>) {
        self.set_agent_message(text.into());
    }

    pub fn message(&self) -> &ChefMessage {
        &self.message
    }

    pub fn stats(&self) -> &ChefStats {
        &self.stats
    }

    pub fn banned_ingredients(&self) -> impl Iterator<Item = IngredientId> + '_ {
        self.banned_ingredients.iter().copied()
    }

    pub fn banned_tools(&self) -> impl Iterator<Item = ToolId> + '_ {
        self.banned_tools.iter().copied()
    }

    pub fn banned_count(&self) -> usize {
        self.banned_ingredients.len() + self.banned_tools.len()
    }

    pub fn banned_items(&self) -> BannedItems {
        BannedItems {
            ingredients: self.banned_ingredients().map(IngredientId::name).collect(),
            tools: self.banned_tools().map(ToolId::name).collect(),
        }
    }

    pub fn warning_timer(&self) -> f32 {
        self.warning_timer
    }

    pub fn time_until_escalation(&self) -> f32 {
        (self.warning_timer - self.since_last_rule).max(0.0)
    }

    /// Fraction of the current escalation cycle already elapsed, in `[0, 1]`.
    pub fn escalation_progress(&self) -> f32 {
        (self.since_last_rule / self.warning_timer).min(1.0)
    }

    /// Session clock in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Restore the start-of-session state. Listeners stay registered.
    pub fn reset(&mut self) {
        self.banned_ingredients.clear();
        self.banned_tools.clear();
        self.stats = ChefStats::default();
        self.warning_timer = self.chef.initial_warning_time;
        self.since_last_rule = 0.0;
        self.warning_armed = true;
        self.escalation_level = 0;
        self.message = ChefMessage::plain(WELCOME);
        self.clock = 0.0;
        self.agent.reset();
        self.notify(ChefNotice::MessageChanged);
    }
}

impl RuleView for ChefAi {
    fn is_ingredient_banned(&self, ingredient: IngredientId) -> bool {
        self.banned_ingredients.contains(&ingredient)
    }

    fn is_tool_banned(&self, tool: ToolId) -> bool {
        self.banned_tools.contains(&tool)
    }

    fn escalation_level(&self) -> u32 {
        self.escalation_level
    }

    fn time_modifier(&self) -> f32 {
        (1.0 - self.escalation_level as f32 * self.chef.time_step_per_level)
            .max(self.chef.min_time_modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{FallbackAgent, SilentAgent};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn chef() -> ChefAi {
        ChefAi::new(&Tuning::default(), Box::new(SilentAgent))
    }

    /// Tuning where timed escalations never add a rule.
    fn quiet_chef() -> ChefAi {
        let mut tuning = Tuning::default();
        tuning.chef.escalate_rule_chance = 0.0;
        ChefAi::new(&tuning, Box::new(SilentAgent))
    }

    fn record(chef: &mut ChefAi) -> Rc<RefCell<Vec<ChefNotice>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        chef.on_notice(move |n| sink.borrow_mut().push(n.clone()));
        log
    }

    #[test]
    fn test_initial_state() {
        let chef = chef();
        assert_eq!(chef.escalation_level(), 0);
        assert_eq!(chef.time_modifier(), 1.0);
        assert_eq!(chef.warning_timer(), 30.0);
        assert_eq!(chef.banned_count(), 0);
        assert_eq!(chef.message().text, WELCOME);
    }

    #[test]
    fn test_escalates_once_after_warning_timer() {
        let mut chef = quiet_chef();
        let notices = record(&mut chef);
        let mut rng = StdRng::seed_from_u64(1);

        let mut escalations = 0;
        let mut warnings = 0;
        for _ in 0..300 {
            let tick = chef.update(0.1, &mut rng);
            escalations += tick.escalated as u32;
            warnings += tick.warning as u32;
        }
        // 300 * 0.1 accumulates to just under or at 30s, one more frame settles it.
        let tick = chef.update(0.1, &mut rng);
        escalations += tick.escalated as u32;
        warnings += tick.warning as u32;

        assert_eq!(escalations, 1);
        assert_eq!(warnings, 1);
        assert!(chef.time_until_escalation() > 29.0);
        let warning_notices = notices
            .borrow()
            .iter()
            .filter(|n| matches!(n, ChefNotice::Warning { .. }))
            .count();
        assert_eq!(warning_notices, 1);
    }

    #[test]
    fn test_warning_rearms_each_cycle() {
        let mut chef = quiet_chef();
        let mut rng = StdRng::seed_from_u64(2);
        let mut warnings = 0;
        let mut escalations = 0;
        for _ in 0..610 {
            let tick = chef.update(0.1, &mut rng);
            warnings += tick.warning as u32;
            escalations += tick.escalated as u32;
        }
        assert_eq!(escalations, 2);
        assert_eq!(warnings, 2);
    }

    #[test]
    fn test_large_step_still_warns_before_escalating() {
        let mut chef = quiet_chef();
        let mut rng = StdRng::seed_from_u64(3);
        let tick = chef.update(31.0, &mut rng);
        assert!(tick.warning);
        assert!(tick.escalated);
    }

    #[test]
    fn test_escalate_always_sets_message() {
        let mut chef = quiet_chef();
        let mut rng = StdRng::seed_from_u64(4);
        chef.escalate(&mut rng);
        let title = chef.message().title.clone().unwrap();
        assert!(ESCALATION_LINES.iter().any(|(t, _)| *t == title));
        assert_eq!(chef.escalation_level(), 0);
    }

    #[test]
    fn test_escalate_rule_roll() {
        // StepRng(0, 0) makes every probability check pass.
        let mut chef = chef();
        chef.escalate(&mut StepRng::new(0, 0));
        assert_eq!(chef.escalation_level(), 1);
    }

    #[test]
    fn test_ingredient_ban_cap() {
        let mut chef = chef();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            chef.apply_rule(RuleKind::BanIngredient, &mut rng);
            assert!(chef.banned_ingredients().count() <= 2);
        }
        assert_eq!(chef.banned_ingredients().count(), 2);
        assert_eq!(chef.escalation_level(), 10);
        assert_eq!(
            chef.apply_rule(RuleKind::BanIngredient, &mut rng),
            RuleEffect::TimeReduced
        );
    }

    #[test]
    fn test_tool_ban_never_plate() {
        for seed in 0..50 {
            let mut chef = chef();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..5 {
                chef.apply_rule(RuleKind::BanTool, &mut rng);
            }
            assert!(!chef.is_tool_banned(ToolId::Plate));
            assert_eq!(chef.banned_tools().count(), 1);
        }
    }

    #[test]
    fn test_ban_pools_are_uniform_over_unbanned() {
        // every unbanned ingredient is a candidate, even one that leaves
        // no legal recipe behind
        let mut picks = BTreeMap::new();
        for seed in 0..400 {
            let mut chef = chef();
            chef.banned_tools.insert(ToolId::Knife);
            chef.banned_ingredients.insert(IngredientId::Bread);
            let effect = chef.apply_rule(RuleKind::BanIngredient, &mut StdRng::seed_from_u64(seed));
            let RuleEffect::IngredientBanned(id) = effect else {
                panic!("expected an ingredient ban, got {:?}", effect);
            };
            *picks.entry(id).or_insert(0u32) += 1;
        }
        assert!(!picks.contains_key(&IngredientId::Bread));
        assert_eq!(picks.len(), 4);
        for (id, count) in &picks {
            assert!((50..=150).contains(count), "{:?} picked {} times", id, count);
        }

        let mut knife = 0;
        for seed in 0..400 {
            let mut chef = chef();
            chef.banned_ingredients.insert(IngredientId::Bread);
            chef.banned_ingredients.insert(IngredientId::Cheese);
            match chef.apply_rule(RuleKind::BanTool, &mut StdRng::seed_from_u64(seed)) {
                RuleEffect::ToolBanned(ToolId::Knife) => knife += 1,
                RuleEffect::ToolBanned(ToolId::Stove) => {}
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!((140..=260).contains(&knife), "knife picked {} times", knife);
    }

    #[test]
    fn test_time_modifier_floor() {
        let mut chef = chef();
        let mut rng = StdRng::seed_from_u64(6);
        let mut last = chef.time_modifier();
        for _ in 0..12 {
            chef.apply_rule(RuleKind::ReduceTime, &mut rng);
            let now = chef.time_modifier();
            assert!(now <= last);
            assert!(now >= 0.5);
            last = now;
        }
        assert_eq!(chef.time_modifier(), 0.5);
    }

    #[test]
    fn test_warning_timer_shrinks_to_floor() {
        let mut chef = chef();
        let mut rng = StdRng::seed_from_u64(7);
        chef.apply_rule(RuleKind::IncreaseComplexity, &mut rng);
        assert!((chef.warning_timer() - 25.5).abs() < 1e-4);
        for _ in 0..20 {
            chef.apply_rule(RuleKind::IncreaseComplexity, &mut rng);
        }
        assert_eq!(chef.warning_timer(), 10.0);
    }

    #[test]
    fn test_order_completed_counters() {
        let mut chef = chef();
        let mut rng = StdRng::seed_from_u64(8);

        chef.on_order_completed(24.0, 30.0, 0, &mut rng);
        let stats = *chef.stats();
        assert_eq!(stats.orders_completed, 1);
        assert_eq!(stats.fast_completions, 1);
        assert_eq!(stats.perfect_orders, 1);
        // fast_completion and success contexts both apply a rule
        assert_eq!(chef.escalation_level(), 2);

        chef.on_order_completed(3.0, 30.0, 2, &mut rng);
        assert_eq!(chef.stats().slow_completions, 1);
        assert_eq!(chef.stats().perfect_orders, 1);
        assert_eq!(chef.escalation_level(), 3);

        // third order adds a multiple_success rule
        chef.on_order_completed(15.0, 30.0, 1, &mut rng);
        assert_eq!(chef.stats().orders_completed, 3);
        assert_eq!(chef.escalation_level(), 5);
    }

    #[test]
    fn test_success_rules_always_eligible() {
        let mut tuning = Tuning::default();
        tuning.chef.rules.reduce_time.weight = 0.0;
        tuning.chef.rules.increase_complexity.weight = 0.0;
        tuning.chef.rules.ban_tool.weight = 0.0;
        let mut chef = ChefAi::new(&tuning, Box::new(SilentAgent));
        let mut rng = StdRng::seed_from_u64(9);
        let effect = chef.trigger_rule(RuleTrigger::MultipleSuccess, &mut rng);
        assert!(matches!(effect, Some(RuleEffect::IngredientBanned(_))));
    }

    #[test]
    fn test_no_eligible_rule_is_noop() {
        let mut tuning = Tuning::default();
        tuning.chef.rules = RuleTable {
            ban_ingredient: RuleConfig {
                weight: 1.0,
                trigger: RuleTrigger::FastCompletion,
            },
            ban_tool: RuleConfig {
                weight: 1.0,
                trigger: RuleTrigger::FastCompletion,
            },
            reduce_time: RuleConfig {
                weight: 1.0,
                trigger: RuleTrigger::FastCompletion,
            },
            increase_complexity: RuleConfig {
                weight: 1.0,
                trigger: RuleTrigger::FastCompletion,
            },
        };
        let mut chef = ChefAi::new(&tuning, Box::new(SilentAgent));
        let mut rng = StdRng::seed_from_u64(10);
        assert_eq!(chef.trigger_rule(RuleTrigger::MultipleSuccess, &mut rng), None);
        assert_eq!(chef.escalation_level(), 0);
    }

    #[test]
    fn test_rule_notices() {
        let mut chef = chef();
        let notices = record(&mut chef);
        let mut rng = StdRng::seed_from_u64(11);
        let effect = chef.apply_rule(RuleKind::BanTool, &mut rng);
        let log = notices.borrow();
        assert!(log.contains(&ChefNotice::MessageChanged));
        assert!(log.contains(&ChefNotice::RuleApplied {
            rule: RuleKind::BanTool,
            effect
        }));
    }

    #[test]
    fn test_own_ban_message_without_agent() {
        let mut chef = chef();
        let mut rng = StdRng::seed_from_u64(12);
        let RuleEffect::IngredientBanned(id) = chef.apply_rule(RuleKind::BanIngredient, &mut rng)
        else {
            panic!("expected a ban");
        };
        let title = chef.message().title.clone().unwrap();
        assert_eq!(title, format!("NO MORE {}!", id.name().to_uppercase()));
    }

    #[test]
    fn test_agent_message_replaces_own_pool() {
        let mut chef = ChefAi::new(&Tuning::default(), Box::new(FallbackAgent::new()));
        chef.on_order_timeout();
        assert_eq!(chef.stats().timeouts, 1);
        assert_eq!(chef.message().title, None);
        assert_eq!(chef.message().text, "OUT OF TIME! This kitchen demands SPEED!");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid tuning")]
    fn test_unvalidated_tuning_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.chef.multiple_success_every = 0;
        ChefAi::new(&tuning, Box::new(SilentAgent));
    }

    #[test]
    fn test_reset() {
        let mut chef = chef();
        let mut rng = StdRng::seed_from_u64(13);
        chef.apply_rule(RuleKind::BanIngredient, &mut rng);
        chef.apply_rule(RuleKind::BanTool, &mut rng);
        chef.on_order_timeout();
        chef.update(3.0, &mut rng);
        chef.reset();
        assert_eq!(chef.banned_count(), 0);
        assert_eq!(chef.escalation_level(), 0);
        assert_eq!(*chef.stats(), ChefStats::default());
        assert_eq!(chef.warning_timer(), 30.0);
        assert_eq!(chef.time_until_escalation(), 30.0);
        assert_eq!(chef.message().text, WELCOME);
    }
}
