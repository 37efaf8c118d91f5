//! Session host: one game of Chaos Kitchen.
//!
//! Owns the chef, order and disaster engines plus the kitchen, the player's
//! hands and the score. The host feeds it player intents
//! ([`KitchenSession::interact`], [`KitchenSession::drop_item`]) and frame
//! time ([`KitchenSession::update`]); everything that happened comes back as
//! return values for the presentation layer.
//!
//! Intents should be applied before `update` in a frame so a disaster
//! resolved this frame is never also failed by its countdown.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::ChefAgent;
use crate::catalog::{IngredientId, PrepState, ToolId};
use crate::disaster::{
    DisasterEvent, DisasterKind, DisasterSystem, EmergencyItem, EmergencyItemKind, UseOutcome,
};
use crate::escalation::{BannedItems, ChefAi, ChefMessage, ChefNotice, RuleView};
use crate::kitchen::{Interactable, Kitchen, Vec3};
use crate::orders::{OrderAllowance, OrderResult, OrderSystem, ProgressEntry};
use crate::profile::{MistakeKind, PlayerProfile};
use crate::report::ReportCard;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Playing,
    Paused,
    /// Target order count reached.
    Won,
    Quit,
}

impl SessionState {
    pub fn is_over(self) -> bool {
        matches!(self, SessionState::Won | SessionState::Quit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldIngredient {
    pub ingredient: IngredientId,
    pub state: PrepState,
}

/// What an interaction did, for player feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractOutcome {
    /// The session is paused or over.
    Inactive,
    NothingNearby,
    PickedUpItem(EmergencyItemKind),
    ResolvedDisaster(DisasterKind),
    /// Carried item could not be used here.
    UseFailed(UseOutcome),
    PickedUpIngredient(IngredientId),
    HandsFull,
    NothingHeld,
    Processed(HeldIngredient),
    CannotProcess,
    Delivered(HeldIngredient),
    OrderCompleted { result: OrderResult, won: bool },
    /// Rejected by the order; counted as a mistake.
    WrongDelivery,
    /// Between orders.
    NoOrder,
}

impl InteractOutcome {
    /// Transient player message for failed interactions.
    pub fn feedback(&self) -> Option<&'static str> {
        match self {
            InteractOutcome::UseFailed(_) => Some("Get closer to the disaster!"),
            InteractOutcome::WrongDelivery => Some("Wrong ingredient or state!"),
            InteractOutcome::CannotProcess => Some("Cannot process this way!"),
            _ => None,
        }
    }
}

/// Things that happened during [`KitchenSession::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    EscalationWarning,
    Escalated,
    DisasterStarted(DisasterKind),
    DisasterEnded {
        kind: DisasterKind,
        success: bool,
        penalty: u32,
    },
    OrderTimedOut,
    NewOrder(&'static str),
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub recipe: &'static str,
    pub time_remaining: f32,
    pub total_time: f32,
    pub time_percent: f32,
    pub mistakes: u32,
    pub progress: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisasterView {
    pub kind: DisasterKind,
    pub name: &'static str,
    pub description: &'static str,
    pub time_remaining: f32,
    pub item: Option<EmergencyItem>,
    pub item_collected: bool,
}

/// Read-only view of the whole session for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub score: u32,
    pub orders_completed: u32,
    pub target_orders: u32,
    pub order: Option<OrderView>,
    pub next_order_in: Option<f32>,
    pub chef_message: ChefMessage,
    pub banned: BannedItems,
    pub escalation_level: u32,
    pub time_until_escalation: f32,
    pub escalation_progress: f32,
    pub time_modifier: f32,
    pub disaster: Option<DisasterView>,
    pub disabled_stations: Vec<ToolId>,
    pub held_ingredient: Option<HeldIngredient>,
    pub held_item: Option<EmergencyItemKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverStats {
    pub score: u32,
    pub orders_completed: u32,
    pub target_orders: u32,
    pub perfect_orders: u32,
    pub fast_completions: u32,
    pub timeouts: u32,
    pub banned_count: usize,
    pub escalation_level: u32,
}

pub struct KitchenSession<R: Rng> {
    tuning: Tuning,
    rng: R,
    chef: ChefAi,
    orders: OrderSystem,
    disasters: DisasterSystem,
    kitchen: Kitchen,
    profile: PlayerProfile,
    state: SessionState,
    score: u32,
    orders_completed: u32,
    held_ingredient: Option<HeldIngredient>,
    held_item: Option<EmergencyItemKind>,
    next_order_in: Option<f32>,
}

impl<R: Rng> KitchenSession<R> {
    /// Start a session with the first order already on the board.
    ///
    /// `tuning` must pass [`Tuning::validate`], as for [`ChefAi::new`].
    pub fn new(tuning: Tuning, agent: Box<dyn ChefAgent>, rng: R) -> Self {
        debug_assert!(
            tuning.validate().is_empty(),
            "invalid tuning: {:?}",
            tuning.validate()
        );
        let mut session = Self {
            chef: ChefAi::new(&tuning, agent),
            orders: OrderSystem::new(&tuning.performance),
            disasters: DisasterSystem::new(&tuning.disasters),
            kitchen: Kitchen::new(tuning.session.interact_radius),
            profile: PlayerProfile::new(&tuning.performance),
            tuning,
            rng,
            state: SessionState::Playing,
            score: 0,
            orders_completed: 0,
            held_ingredient: None,
            held_item: None,
            next_order_in: None,
        };
        session.start_new_order();
        log::info!(
            "session started, target {} orders",
            session.tuning.session.target_orders
        );
        session
    }

    pub fn on_chef_notice(&mut self, listener: impl FnMut(&ChefNotice) + 'static) {
        self.chef.on_notice(listener);
    }

    pub fn on_disaster_event(&mut self, listener: impl FnMut(&DisasterEvent) + 'static) {
        self.disasters.on_event(listener);
    }

    fn start_new_order(&mut self) -> &'static str {
        self.orders
            .generate_order(&self.chef, &mut self.rng)
            .recipe
            .name
    }

    /// Advance one frame: chef, disasters, order timer, then the delayed order.
    pub fn update(&mut self, delta_seconds: f32) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Playing {
            return events;
        }
        // A delay scheduled during this frame starts counting next frame.
        let order_pending = self.next_order_in.is_some();

        let tick = self.chef.update(delta_seconds, &mut self.rng);
        if tick.warning {
            events.push(SessionEvent::EscalationWarning);
        }
        if tick.escalated {
            events.push(SessionEvent::Escalated);
        }

        if let Some(event) =
            self.disasters
                .update(delta_seconds, &self.chef, &mut self.kitchen, &mut self.rng)
        {
            events.push(self.handle_disaster(event));
        }

        if self.orders.update(delta_seconds) {
            self.chef.on_order_timeout();
            self.orders.clear_order();
            self.next_order_in = Some(self.tuning.session.next_order_delay);
            events.push(SessionEvent::OrderTimedOut);
        }

        if let Some(remaining) = self.next_order_in.as_mut().filter(|_| order_pending) {
            *remaining -= delta_seconds;
            if *remaining <= 0.0 {
                self.next_order_in = None;
                let recipe = self.start_new_order();
                events.push(SessionEvent::NewOrder(recipe));
            }
        }
        events
    }

    fn handle_disaster(&mut self, event: DisasterEvent) -> SessionEvent {
        match event {
            DisasterEvent::Started { kind } => {
                self.held_ingredient = None;
                let config = kind.config();
                self.chef
                    .announce(format!("{} {}", config.name, config.description));
                SessionEvent::DisasterStarted(kind)
            }
            DisasterEvent::Resolved { kind } => self.end_disaster(kind, true, 0),
            DisasterEvent::Failed { kind, penalty } => self.end_disaster(kind, false, penalty),
        }
    }

    fn end_disaster(&mut self, kind: DisasterKind, success: bool, penalty: u32) -> SessionEvent {
        self.held_item = None;
        if success {
            self.chef
                .announce("Good work handling that disaster! Now back to cooking!");
        } else {
            self.score = self.score.saturating_sub(penalty);
            self.chef.announce(format!(
                "That disaster cost you {} points! Pay attention next time!",
                penalty
            ));
        }
        SessionEvent::DisasterEnded {
            kind,
            success,
            penalty,
        }
    }

    /// Act on whatever is in reach of `player_position`.
    ///
    /// Emergency items take priority: pick one up if not already carrying
    /// one, otherwise try to use the carried one. Then the nearest counter or
    /// station.
    pub fn interact(&mut self, player_position: Vec3) -> InteractOutcome {
        if self.state != SessionState::Playing {
            return InteractOutcome::Inactive;
        }

        if self.held_item.is_none() {
            if let Some(item) = self.disasters.nearest_item(player_position) {
                self.disasters.pick_up_item(item);
                self.held_item = Some(item);
                return InteractOutcome::PickedUpItem(item);
            }
        }

        if let Some(item) = self.held_item {
            let kind = self.disasters.active().map(|active| active.kind);
            let outcome =
                self.disasters
                    .use_emergency_item(item, player_position, &mut self.kitchen);
            return match (outcome, kind) {
                (UseOutcome::Resolved, Some(kind)) => {
                    self.end_disaster(kind, true, 0);
                    InteractOutcome::ResolvedDisaster(kind)
                }
                _ => InteractOutcome::UseFailed(outcome),
            };
        }

        let nearest = self
            .kitchen
            .find_nearest_interactable(player_position, &self.allowance());
        match nearest {
            None => InteractOutcome::NothingNearby,
            Some(Interactable::Counter(ingredient)) => {
                if self.held_ingredient.is_some() {
                    return InteractOutcome::HandsFull;
                }
                self.held_ingredient = Some(HeldIngredient {
                    ingredient,
                    state: PrepState::Raw,
                });
                self.profile.track_ingredient(ingredient);
                InteractOutcome::PickedUpIngredient(ingredient)
            }
            Some(Interactable::Station(station)) => {
                self.profile.track_tool(station);
                if station == ToolId::Plate {
                    self.deliver()
                } else {
                    self.process(station)
                }
            }
        }
    }

    fn process(&mut self, station: ToolId) -> InteractOutcome {
        let Some(held) = self.held_ingredient.as_mut() else {
            return InteractOutcome::NothingHeld;
        };
        let next = self.kitchen.process(held.ingredient, held.state, station);
        if next == held.state {
            return InteractOutcome::CannotProcess;
        }
        held.state = next;
        InteractOutcome::Processed(*held)
    }

    fn deliver(&mut self) -> InteractOutcome {
        let Some(held) = self.held_ingredient else {
            return InteractOutcome::NothingHeld;
        };
        if self.orders.current_order().is_none() {
            return InteractOutcome::NoOrder;
        }
        if !self.orders.add_ingredient(held.ingredient, held.state) {
            self.profile.track_mistake(MistakeKind::WrongIngredientOrState);
            return InteractOutcome::WrongDelivery;
        }
        self.held_ingredient = None;

        if !self.orders.is_order_complete() {
            return InteractOutcome::Delivered(held);
        }
        match self.orders.complete_order() {
            Some(result) => {
                let won = self.record_completion(&result);
                InteractOutcome::OrderCompleted { result, won }
            }
            None => InteractOutcome::Delivered(held),
        }
    }

    /// Score a completed order. Returns `true` if it won the game.
    fn record_completion(&mut self, result: &OrderResult) -> bool {
        self.score += result.score;
        self.orders_completed += 1;
        let ratio = if result.total_time > 0.0 {
            result.time_remaining as f64 / result.total_time as f64
        } else {
            0.0
        };
        self.profile.track_order_completion(ratio);
        self.chef.on_order_completed(
            result.time_remaining,
            result.total_time,
            result.mistakes,
            &mut self.rng,
        );

        if self.orders_completed >= self.tuning.session.target_orders {
            self.state = SessionState::Won;
            log::info!(
                "target reached with {} orders, score {}",
                self.orders_completed,
                self.score
            );
            return true;
        }
        self.next_order_in = Some(self.tuning.session.next_order_delay);
        false
    }

    /// Put down the held ingredient.
    pub fn drop_item(&mut self) -> Option<HeldIngredient> {
        self.held_ingredient.take()
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.state = SessionState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Playing;
        }
    }

    pub fn quit(&mut self) {
        if !self.state.is_over() {
            self.state = SessionState::Quit;
            log::info!("session quit with score {}", self.score);
        }
    }

    /// Start over with the same tuning, agent and random source.
    pub fn restart(&mut self) {
        self.chef.reset();
        self.orders.reset();
        self.disasters.reset(&mut self.kitchen);
        self.kitchen.reset();
        self.profile.reset();
        self.state = SessionState::Playing;
        self.score = 0;
        self.orders_completed = 0;
        self.held_ingredient = None;
        self.held_item = None;
        self.next_order_in = None;
        self.start_new_order();
        log::info!("session restarted");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            score: self.score,
            orders_completed: self.orders_completed,
            target_orders: self.tuning.session.target_orders,
            order: self.orders.current_order().map(|order| OrderView {
                recipe: order.recipe.name,
                time_remaining: order.time_remaining.max(0.0),
                total_time: order.total_time,
                time_percent: order.time_percent(),
                mistakes: order.mistakes,
                progress: self.orders.progress(),
            }),
            next_order_in: self.next_order_in,
            chef_message: self.chef.message().clone(),
            banned: self.chef.banned_items(),
            escalation_level: self.chef.escalation_level(),
            time_until_escalation: self.chef.time_until_escalation(),
            escalation_progress: self.chef.escalation_progress(),
            time_modifier: self.chef.time_modifier(),
            disaster: self.disasters.active().map(|active| {
                let config = active.config();
                DisasterView {
                    kind: active.kind,
                    name: config.name,
                    description: config.description,
                    time_remaining: self.disasters.time_remaining(),
                    item: self.disasters.world_item().copied(),
                    item_collected: active.item_collected,
                }
            }),
            disabled_stations: self.kitchen.disabled_stations().to_vec(),
            held_ingredient: self.held_ingredient,
            held_item: self.held_item,
        }
    }

    pub fn game_over_stats(&self) -> GameOverStats {
        let stats = self.chef.stats();
        GameOverStats {
            score: self.score,
            orders_completed: self.orders_completed,
            target_orders: self.tuning.session.target_orders,
            perfect_orders: stats.perfect_orders,
            fast_completions: stats.fast_completions,
            timeouts: stats.timeouts,
            banned_count: self.chef.banned_count(),
            escalation_level: self.chef.escalation_level(),
        }
    }

    pub fn report_card(&self) -> ReportCard {
        ReportCard::build(
            self.score,
            self.tuning.session.target_orders,
            &self.chef,
            &self.profile,
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn orders_completed(&self) -> u32 {
        self.orders_completed
    }

    pub fn held_ingredient(&self) -> Option<HeldIngredient> {
        self.held_ingredient
    }

    pub fn held_item(&self) -> Option<EmergencyItemKind> {
        self.held_item
    }

    fn allowance(&self) -> OrderAllowance<'_, ChefAi> {
        OrderAllowance::new(&self.chef, self.orders.current_order())
    }

    /// Whether the counter for `ingredient` can be used right now.
    pub fn is_ingredient_offered(&self, ingredient: IngredientId) -> bool {
        !self.allowance().is_ingredient_banned(ingredient)
    }

    /// Whether `station` is enabled and usable right now.
    pub fn is_station_usable(&self, station: ToolId) -> bool {
        self.kitchen.is_station_enabled(station) && !self.allowance().is_tool_banned(station)
    }

    pub fn chef(&self) -> &ChefAi {
        &self.chef
    }

    pub fn orders(&self) -> &OrderSystem {
        &self.orders
    }

    pub fn disasters(&self) -> &DisasterSystem {
        &self.disasters
    }

    pub fn kitchen(&self) -> &Kitchen {
        &self.kitchen
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Force a disaster now. Returns `false` if one is already active.
    pub fn trigger_disaster(&mut self, kind: DisasterKind) -> bool {
        match self
            .disasters
            .start_disaster(kind, &mut self.kitchen, &mut self.rng)
        {
            Some(event) => {
                self.handle_disaster(event);
                true
            }
            None => false,
        }
    }
}
