//! Kitchen disasters: scheduling, emergency items and resolution.
//!
//! At most one disaster is active. While it runs its stations are disabled
//! through [`StationControl`] and an emergency item waits somewhere in the
//! kitchen. The player must pick the item up and use it close enough to the
//! disaster before the countdown expires, or the disaster fails and costs its
//! penalty.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::ToolId;
use crate::escalation::RuleView;
use crate::kitchen::{StationControl, Vec3};
use crate::tuning::{DisasterTuning, DisasterWeights};
use crate::weighted;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisasterKind {
    Fire,
    PowerOutage,
    GasLeak,
    Flood,
}

impl DisasterKind {
    pub const ALL: [DisasterKind; 4] = [
        DisasterKind::Fire,
        DisasterKind::PowerOutage,
        DisasterKind::GasLeak,
        DisasterKind::Flood,
    ];

    pub fn config(self) -> &'static DisasterConfig {
        &DISASTERS[self as usize]
    }

    pub fn weight(self, weights: &DisasterWeights) -> f64 {
        match self {
            DisasterKind::Fire => weights.fire,
            DisasterKind::PowerOutage => weights.power_outage,
            DisasterKind::GasLeak => weights.gas_leak,
            DisasterKind::Flood => weights.flood,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyItemKind {
    FireExtinguisher,
    Generator,
    ValveWrench,
    PipeWrench,
}

impl EmergencyItemKind {
    pub fn name(self) -> &'static str {
        match self {
            EmergencyItemKind::FireExtinguisher => "Fire Extinguisher",
            EmergencyItemKind::Generator => "Generator",
            EmergencyItemKind::ValveWrench => "Valve Wrench",
            EmergencyItemKind::PipeWrench => "Pipe Wrench",
        }
    }
}

/// Static description of a disaster kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisasterConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub required_item: Option<EmergencyItemKind>,
    /// Seconds before the disaster fails on its own.
    pub time_limit: f32,
    pub disabled_stations: &'static [ToolId],
    pub penalty: u32,
    pub location: Vec3,
    /// Radius around `location` in which items are used.
    pub danger_zone: f32,
}

static DISASTERS: [DisasterConfig; 4] = [
    DisasterConfig {
        name: "Kitchen Fire!",
        description: "A fire has broken out near the stove! Find the fire extinguisher!",
        required_item: Some(EmergencyItemKind::FireExtinguisher),
        time_limit: 20.0,
        disabled_stations: &[ToolId::Stove],
        penalty: 200,
        location: Vec3::new(0.0, 0.0, -3.0),
        danger_zone: 3.0,
    },
    DisasterConfig {
        name: "Power Outage!",
        description: "The power is out! Find the backup generator!",
        required_item: Some(EmergencyItemKind::Generator),
        time_limit: 25.0,
        disabled_stations: &[ToolId::Stove],
        penalty: 150,
        location: Vec3::new(-6.0, 0.0, 2.0),
        danger_zone: 0.0,
    },
    DisasterConfig {
        name: "Gas Leak!",
        description: "Dangerous gas is leaking! Shut off the valve quickly!",
        required_item: Some(EmergencyItemKind::ValveWrench),
        time_limit: 15.0,
        disabled_stations: &[ToolId::Stove],
        penalty: 300,
        location: Vec3::new(0.0, 0.0, -3.0),
        danger_zone: 4.0,
    },
    DisasterConfig {
        name: "Pipe Burst!",
        description: "Water is flooding the kitchen! Find the shutoff valve!",
        required_item: Some(EmergencyItemKind::PipeWrench),
        time_limit: 20.0,
        disabled_stations: &[ToolId::Plate],
        penalty: 150,
        location: Vec3::new(6.0, 0.0, -3.0),
        danger_zone: 2.0,
    },
];

/// Where emergency items can appear.
pub const ITEM_SPAWN_POINTS: [Vec3; 4] = [
    Vec3::new(6.0, 0.0, 2.0),
    Vec3::new(-6.0, 0.0, 2.0),
    Vec3::new(3.0, 0.0, 5.0),
    Vec3::new(-3.0, 0.0, 5.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergencyItem {
    pub kind: EmergencyItemKind,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveDisaster {
    pub kind: DisasterKind,
    /// Engine clock at start, in seconds.
    pub started_at: f64,
    pub resolved: bool,
    /// The required item has been taken from the world.
    pub item_collected: bool,
    pub time_remaining: f32,
}

impl ActiveDisaster {
    pub fn config(&self) -> &'static DisasterConfig {
        self.kind.config()
    }
}

/// Start and end notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisasterEvent {
    Started { kind: DisasterKind },
    Resolved { kind: DisasterKind },
    Failed { kind: DisasterKind, penalty: u32 },
}

impl DisasterEvent {
    pub fn kind(self) -> DisasterKind {
        match self {
            DisasterEvent::Started { kind }
            | DisasterEvent::Resolved { kind }
            | DisasterEvent::Failed { kind, .. } => kind,
        }
    }

    /// Score lost, zero for anything but a failure.
    pub fn penalty(self) -> u32 {
        match self {
            DisasterEvent::Failed { penalty, .. } => penalty,
            _ => 0,
        }
    }
}

/// Result of trying to use an emergency item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseOutcome {
    Resolved,
    NoDisaster,
    WrongItem,
    /// The required item is still lying in the kitchen.
    NotCollected,
    TooFar,
}

impl UseOutcome {
    pub fn is_resolved(self) -> bool {
        self == UseOutcome::Resolved
    }
}

type Listener = Box<dyn FnMut(&DisasterEvent)>;

pub struct DisasterSystem {
    tuning: DisasterTuning,
    active: Option<ActiveDisaster>,
    item: Option<EmergencyItem>,
    /// Seconds since session start or the end of the last disaster.
    since_last: f32,
    /// Value of `since_last` at which the next random check happens.
    next_check: f32,
    triggered: u32,
    clock: f64,
    listeners: Vec<Listener>,
}

impl DisasterSystem {
    pub fn new(tuning: &DisasterTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            active: None,
            item: None,
            since_last: 0.0,
            next_check: tuning.min_time_between,
            triggered: 0,
            clock: 0.0,
            listeners: Vec::new(),
        }
    }

    pub fn on_event(&mut self, listener: impl FnMut(&DisasterEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: DisasterEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Probability of a disaster at one check for the given escalation level.
    pub fn trigger_chance(&self, escalation_level: u32) -> f64 {
        (self.tuning.base_chance + escalation_level as f64 * self.tuning.chance_per_level)
            .clamp(0.0, 1.0)
    }

    /// Advance the active countdown, or schedule the next disaster.
    ///
    /// Returns the start or failure that happened this tick, if any.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_seconds: f32,
        rules: &impl RuleView,
        stations: &mut impl StationControl,
        rng: &mut R,
    ) -> Option<DisasterEvent> {
        self.clock += delta_seconds as f64;

        if let Some(active) = self.active.as_mut() {
            active.time_remaining -= delta_seconds;
            if active.time_remaining <= 0.0 && !active.resolved {
                return self.finish(false, stations);
            }
            return None;
        }

        self.since_last += delta_seconds;
        if self.since_last < self.next_check {
            return None;
        }
        // One roll per tick, however many checks a long step skipped.
        let interval = self.tuning.check_interval;
        if interval > 0.0 {
            let missed = ((self.since_last - self.next_check) / interval).floor() + 1.0;
            self.next_check += missed * interval;
        } else {
            self.next_check = self.since_last;
        }

        let chance = self.trigger_chance(rules.escalation_level());
        if rng.gen::<f64>() >= chance {
            return None;
        }
        let candidates: Vec<(DisasterKind, f64)> = DisasterKind::ALL
            .iter()
            .map(|&kind| (kind, kind.weight(&self.tuning.weights)))
            .collect();
        let kind = weighted::pick(&candidates, rng)?;
        self.start_disaster(kind, stations, rng)
    }

    /// Start a specific disaster. Returns `None` if one is already active.
    pub fn start_disaster<R: Rng + ?Sized>(
        &mut self,
        kind: DisasterKind,
        stations: &mut impl StationControl,
        rng: &mut R,
    ) -> Option<DisasterEvent> {
        if self.active.is_some() {
            return None;
        }
        let config = kind.config();

        self.triggered += 1;
        self.active = Some(ActiveDisaster {
            kind,
            started_at: self.clock,
            resolved: false,
            item_collected: config.required_item.is_none(),
            time_remaining: config.time_limit,
        });
        self.item = config.required_item.map(|item_kind| EmergencyItem {
            kind: item_kind,
            position: spawn_point(config.location, rng),
        });
        for &station in config.disabled_stations {
            stations.disable_station(station);
        }
        log::info!(
            "disaster #{}: {} ({:.0}s to resolve)",
            self.triggered,
            config.name,
            config.time_limit
        );

        let event = DisasterEvent::Started { kind };
        self.notify(event);
        Some(event)
    }

    /// Use `item` at `player_position` against the active disaster.
    pub fn use_emergency_item(
        &mut self,
        item: EmergencyItemKind,
        player_position: Vec3,
        stations: &mut impl StationControl,
    ) -> UseOutcome {
        let Some(active) = self.active.as_mut() else {
            return UseOutcome::NoDisaster;
        };
        let config = active.kind.config();
        if config.required_item != Some(item) {
            return UseOutcome::WrongItem;
        }
        if !active.item_collected {
            return UseOutcome::NotCollected;
        }
        let distance = player_position.distance_to(config.location);
        if distance >= config.danger_zone + self.tuning.use_margin {
            return UseOutcome::TooFar;
        }

        active.resolved = true;
        self.finish(true, stations);
        UseOutcome::Resolved
    }

    fn finish(
        &mut self,
        success: bool,
        stations: &mut impl StationControl,
    ) -> Option<DisasterEvent> {
        let active = self.active.take()?;
        let config = active.kind.config();
        for &station in config.disabled_stations {
            stations.enable_station(station);
        }
        self.item = None;
        self.since_last = 0.0;
        self.next_check = self.tuning.min_time_between;

        let event = if success {
            log::info!("disaster {} resolved", config.name);
            DisasterEvent::Resolved { kind: active.kind }
        } else {
            log::info!(
                "disaster {} failed, penalty {}",
                config.name,
                config.penalty
            );
            DisasterEvent::Failed {
                kind: active.kind,
                penalty: config.penalty,
            }
        };
        self.notify(event);
        Some(event)
    }

    /// The item is lying in the kitchen and `position` is close enough to it.
    pub fn can_pick_up(&self, position: Vec3, item: EmergencyItemKind) -> bool {
        self.item.is_some_and(|world| {
            world.kind == item && position.distance_to(world.position) < self.tuning.pickup_radius
        })
    }

    /// Take the item out of the world. Does not resolve anything.
    pub fn pick_up_item(&mut self, item: EmergencyItemKind) -> bool {
        if !self.has_item(item) {
            return false;
        }
        self.item = None;
        if let Some(active) = self.active.as_mut() {
            if active.kind.config().required_item == Some(item) {
                active.item_collected = true;
            }
        }
        log::debug!("picked up {}", item.name());
        true
    }

    /// Item within pickup range of `position`.
    pub fn nearest_item(&self, position: Vec3) -> Option<EmergencyItemKind> {
        self.item
            .filter(|world| position.distance_to(world.position) < self.tuning.pickup_radius)
            .map(|world| world.kind)
    }

    /// Whether `item` is lying in the kitchen.
    pub fn has_item(&self, item: EmergencyItemKind) -> bool {
        self.item.is_some_and(|world| world.kind == item)
    }

    pub fn world_item(&self) -> Option<&EmergencyItem> {
        self.item.as_ref()
    }

    pub fn active(&self) -> Option<&ActiveDisaster> {
        self.active.as_ref()
    }

    pub fn time_remaining(&self) -> f32 {
        self.active
            .map_or(0.0, |active| active.time_remaining.max(0.0))
    }

    pub fn triggered_count(&self) -> u32 {
        self.triggered
    }

    /// Clear everything, re-enabling stations held by an active disaster.
    pub fn reset(&mut self, stations: &mut impl StationControl) {
        if let Some(active) = self.active.take() {
            for &station in active.kind.config().disabled_stations {
                stations.enable_station(station);
            }
        }
        self.item = None;
        self.since_last = 0.0;
        self.next_check = self.tuning.min_time_between;
        self.triggered = 0;
        self.clock = 0.0;
    }
}

/// Random spawn point other than the disaster's own location.
fn spawn_point<R: Rng + ?Sized>(location: Vec3, rng: &mut R) -> Vec3 {
    let points: Vec<Vec3> = ITEM_SPAWN_POINTS
        .iter()
        .copied()
        .filter(|point| point.distance_to(location) > 0.01)
        .collect();
    if points.is_empty() {
        return ITEM_SPAWN_POINTS[0];
    }
    points[rng.gen_range(0..points.len())]
}
