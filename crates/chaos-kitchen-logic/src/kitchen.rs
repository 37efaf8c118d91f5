//! Kitchen layout and station availability.
//!
//! The kitchen is the world the engines act on: fixed station and ingredient
//! counter positions on the floor plane, plus a per-station enabled flag that
//! disasters toggle through [`StationControl`]. Chef bans are not stored here;
//! they are read from a [`RuleView`] when looking for something to use.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, IngredientId, PrepState, ToolId};
use crate::escalation::RuleView;

/// World-space position. `y` is up; the kitchen floor is `y = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Station toggling used by the disaster engine.
pub trait StationControl {
    fn disable_station(&mut self, station: ToolId);
    fn enable_station(&mut self, station: ToolId);
}

/// Station positions along the back counter.
pub const STATION_POSITIONS: [(ToolId, Vec3); 3] = [
    (ToolId::Knife, Vec3::new(-6.0, 0.0, -5.0)),
    (ToolId::Stove, Vec3::new(0.0, 0.0, -5.0)),
    (ToolId::Plate, Vec3::new(6.0, 0.0, -5.0)),
];

/// Ingredient counter positions along the front counter.
pub const COUNTER_POSITIONS: [(IngredientId, Vec3); 5] = [
    (IngredientId::Tomato, Vec3::new(-6.0, 0.0, 1.0)),
    (IngredientId::Lettuce, Vec3::new(-3.0, 0.0, 1.0)),
    (IngredientId::Cheese, Vec3::new(0.0, 0.0, 1.0)),
    (IngredientId::Bread, Vec3::new(3.0, 0.0, 1.0)),
    (IngredientId::Meat, Vec3::new(6.0, 0.0, 1.0)),
];

pub fn station_position(station: ToolId) -> Vec3 {
    STATION_POSITIONS
        .iter()
        .find(|(id, _)| *id == station)
        .map(|(_, pos)| *pos)
        .unwrap_or_default()
}

pub fn counter_position(ingredient: IngredientId) -> Vec3 {
    COUNTER_POSITIONS
        .iter()
        .find(|(id, _)| *id == ingredient)
        .map(|(_, pos)| *pos)
        .unwrap_or_default()
}

/// Something the player can use from where they stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactable {
    Counter(IngredientId),
    Station(ToolId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kitchen {
    disabled: Vec<ToolId>,
    interact_radius: f32,
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new(2.5)
    }
}

impl Kitchen {
    pub fn new(interact_radius: f32) -> Self {
        Self {
            disabled: Vec::new(),
            interact_radius,
        }
    }

    pub fn is_station_enabled(&self, station: ToolId) -> bool {
        !self.disabled.contains(&station)
    }

    pub fn disabled_stations(&self) -> &[ToolId] {
        &self.disabled
    }

    /// Closest usable counter or station strictly inside the interact radius.
    ///
    /// Banned ingredients, banned tools and disabled stations are skipped.
    /// On equal distance the counter listed first wins, then stations.
    pub fn find_nearest_interactable(
        &self,
        position: Vec3,
        rules: &impl RuleView,
    ) -> Option<Interactable> {
        let mut nearest = None;
        let mut best = self.interact_radius;

        for &(ingredient, pos) in &COUNTER_POSITIONS {
            let dist = position.distance_to(pos);
            if dist < best && !rules.is_ingredient_banned(ingredient) {
                best = dist;
                nearest = Some(Interactable::Counter(ingredient));
            }
        }
        for &(station, pos) in &STATION_POSITIONS {
            let dist = position.distance_to(pos);
            if dist < best && !rules.is_tool_banned(station) && self.is_station_enabled(station) {
                best = dist;
                nearest = Some(Interactable::Station(station));
            }
        }
        nearest
    }

    /// Work an ingredient at a station. Disabled stations leave it unchanged.
    pub fn process(&self, ingredient: IngredientId, state: PrepState, station: ToolId) -> PrepState {
        if !self.is_station_enabled(station) {
            return state;
        }
        catalog::process(ingredient, state, station)
    }

    pub fn reset(&mut self) {
        self.disabled.clear();
    }
}

impl StationControl for Kitchen {
    fn disable_station(&mut self, station: ToolId) {
        if !self.disabled.contains(&station) {
            self.disabled.push(station);
        }
    }

    fn enable_station(&mut self, station: ToolId) {
        self.disabled.retain(|s| *s != station);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ban view with fixed sets.
    struct Bans {
        ingredients: Vec<IngredientId>,
        tools: Vec<ToolId>,
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
            1.0
        }
    }

    fn no_bans() -> Bans {
        Bans {
            ingredients: vec![],
            tools: vec![],
        }
    }

    #[test]
    fn test_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 0.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_counter_and_station() {
        let kitchen = Kitchen::default();
        let at_cheese = Vec3::new(0.2, 0.0, 1.5);
        assert_eq!(
            kitchen.find_nearest_interactable(at_cheese, &no_bans()),
            Some(Interactable::Counter(IngredientId::Cheese))
        );
        let at_stove = Vec3::new(0.0, 0.0, -4.0);
        assert_eq!(
            kitchen.find_nearest_interactable(at_stove, &no_bans()),
            Some(Interactable::Station(ToolId::Stove))
        );
        let nowhere = Vec3::new(0.0, 0.0, -2.0);
        assert_eq!(kitchen.find_nearest_interactable(nowhere, &no_bans()), None);
    }

    #[test]
    fn test_banned_and_disabled_are_skipped() {
        let mut kitchen = Kitchen::default();
        let bans = Bans {
            ingredients: vec![IngredientId::Cheese],
            tools: vec![ToolId::Knife],
        };
        assert_eq!(
            kitchen.find_nearest_interactable(Vec3::new(0.0, 0.0, 1.0), &bans),
            None
        );
        assert_eq!(
            kitchen.find_nearest_interactable(Vec3::new(-6.0, 0.0, -5.0), &bans),
            None
        );

        kitchen.disable_station(ToolId::Stove);
        kitchen.disable_station(ToolId::Stove);
        assert_eq!(kitchen.disabled_stations(), &[ToolId::Stove]);
        assert_eq!(
            kitchen.find_nearest_interactable(Vec3::new(0.0, 0.0, -5.0), &no_bans()),
            None
        );
        kitchen.enable_station(ToolId::Stove);
        assert!(kitchen.is_station_enabled(ToolId::Stove));
    }

    #[test]
    fn test_disabled_station_does_not_process() {
        let mut kitchen = Kitchen::default();
        kitchen.disable_station(ToolId::Stove);
        assert_eq!(
            kitchen.process(IngredientId::Meat, PrepState::Raw, ToolId::Stove),
            PrepState::Raw
        );
        kitchen.enable_station(ToolId::Stove);
        assert_eq!(
            kitchen.process(IngredientId::Meat, PrepState::Raw, ToolId::Stove),
            PrepState::Cooked
        );
    }
}
