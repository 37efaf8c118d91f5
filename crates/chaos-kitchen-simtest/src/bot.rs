//! Scripted cook used by the playthrough section.
//!
//! The cook walks towards its next target at a fixed speed and interacts once
//! in reach, the way a player would: disaster first, then the held
//! ingredient, then the next missing one.

use chaos_kitchen_logic::catalog::{self, IngredientId, ToolId};
use chaos_kitchen_logic::kitchen::{counter_position, station_position, Vec3};
use chaos_kitchen_logic::session::{InteractOutcome, KitchenSession};
use rand::Rng;

/// Metres per second.
const WALK_SPEED: f32 = 5.0;
/// Distance at which the cook stops walking and acts.
const REACH: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Goal {
    Interact(Vec3),
    Drop,
    Idle,
}

pub struct Cook {
    pub position: Vec3,
    pub interactions: u32,
    pub distance_walked: f32,
}

impl Default for Cook {
    fn default() -> Self {
        Self::new()
    }
}

impl Cook {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -2.0),
            interactions: 0,
            distance_walked: 0.0,
        }
    }

    /// Walk and possibly act for one frame. Returns the interaction, if any.
    pub fn step<R: Rng>(
        &mut self,
        session: &mut KitchenSession<R>,
        dt: f32,
    ) -> Option<InteractOutcome> {
        match goal(session) {
            Goal::Idle => None,
            Goal::Drop => {
                session.drop_item();
                None
            }
            Goal::Interact(target) => {
                if self.walk_towards(target, dt) {
                    self.interactions += 1;
                    Some(session.interact(self.position))
                } else {
                    None
                }
            }
        }
    }

    /// Returns `true` once within reach of `target`.
    fn walk_towards(&mut self, target: Vec3, dt: f32) -> bool {
        let dist = self.position.distance_to(target);
        if dist <= REACH {
            return true;
        }
        let step = (WALK_SPEED * dt).min(dist);
        let t = step / dist;
        self.position = Vec3::new(
            self.position.x + (target.x - self.position.x) * t,
            0.0,
            self.position.z + (target.z - self.position.z) * t,
        );
        self.distance_walked += step;
        self.position.distance_to(target) <= REACH
    }
}

fn in_front_of(pos: Vec3) -> Vec3 {
    Vec3::new(pos.x, 0.0, pos.z + 0.5)
}

fn goal<R: Rng>(session: &KitchenSession<R>) -> Goal {
    if let Some(active) = session.disasters().active() {
        if session.held_item().is_some() {
            return Goal::Interact(active.config().location);
        }
        return session
            .disasters()
            .world_item()
            .map_or(Goal::Idle, |item| Goal::Interact(item.position));
    }

    let Some(order) = session.orders().current_order() else {
        return Goal::Idle;
    };
    let recipe = order.recipe;

    if let Some(held) = session.held_ingredient() {
        let required = recipe.required_state(held.ingredient);
        if !recipe.requires(held.ingredient) || order.has_delivered(held.ingredient, required) {
            return Goal::Drop;
        }
        if held.state == required {
            return Goal::Interact(in_front_of(station_position(ToolId::Plate)));
        }
        return match required.required_tool() {
            Some(tool)
                if session.is_station_usable(tool)
                    && catalog::process(held.ingredient, held.state, tool) == required =>
            {
                Goal::Interact(in_front_of(station_position(tool)))
            }
            _ => Goal::Drop,
        };
    }

    let wanted = |id: IngredientId| {
        let required = recipe.required_state(id);
        !order.has_delivered(id, required)
            && session.is_ingredient_offered(id)
            && required
                .required_tool()
                .map_or(true, |tool| session.is_station_usable(tool))
    };
    recipe
        .ingredients
        .iter()
        .copied()
        .find(|&id| wanted(id))
        .map_or(Goal::Idle, |id| {
            Goal::Interact(in_front_of(counter_position(id)))
        })
}
