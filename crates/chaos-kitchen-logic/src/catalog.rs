//! Static kitchen catalog: ingredients, tools, preparation states and recipes.
//!
//! Everything here is immutable for the lifetime of a session. Identifiers are
//! closed enums so every lookup is exhaustive at compile time; the display data
//! lives in `&'static` tables next to them.

use serde::{Deserialize, Serialize};

/// Ingredient identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngredientId {
    Tomato,
    Lettuce,
    Cheese,
    Bread,
    Meat,
}

/// Catalog entry for an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: &'static str,
    pub can_chop: bool,
    pub can_cook: bool,
}

static INGREDIENTS: [Ingredient; 5] = [
    Ingredient {
        id: IngredientId::Tomato,
        name: "Tomato",
        can_chop: true,
        can_cook: true,
    },
    Ingredient {
        id: IngredientId::Lettuce,
        name: "Lettuce",
        can_chop: true,
        can_cook: false,
    },
    Ingredient {
        id: IngredientId::Cheese,
        name: "Cheese",
        can_chop: false,
        can_cook: true,
    },
    Ingredient {
        id: IngredientId::Bread,
        name: "Bread",
        can_chop: false,
        can_cook: true,
    },
    Ingredient {
        id: IngredientId::Meat,
        name: "Meat",
        can_chop: false,
        can_cook: true,
    },
];

impl IngredientId {
    /// All ingredients in catalog order.
    pub const ALL: [IngredientId; 5] = [
        IngredientId::Tomato,
        IngredientId::Lettuce,
        IngredientId::Cheese,
        IngredientId::Bread,
        IngredientId::Meat,
    ];

    pub fn info(self) -> &'static Ingredient {
        &INGREDIENTS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

/// What a tool does to an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAction {
    Chop,
    Cook,
    Assemble,
}

/// Tool (and station) identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolId {
    Knife,
    Stove,
    Plate,
}

/// Catalog entry for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub id: ToolId,
    pub name: &'static str,
    pub action: ToolAction,
}

static TOOLS: [Tool; 3] = [
    Tool {
        id: ToolId::Knife,
        name: "Knife",
        action: ToolAction::Chop,
    },
    Tool {
        id: ToolId::Stove,
        name: "Stove",
        action: ToolAction::Cook,
    },
    Tool {
        id: ToolId::Plate,
        name: "Plate",
        action: ToolAction::Assemble,
    },
];

impl ToolId {
    pub const ALL: [ToolId; 3] = [ToolId::Knife, ToolId::Stove, ToolId::Plate];

    pub fn info(self) -> &'static Tool {
        &TOOLS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn action(self) -> ToolAction {
        self.info().action
    }

    /// The assemble station is needed by every order and can never be banned.
    pub fn is_bannable(self) -> bool {
        self.action() != ToolAction::Assemble
    }
}

/// Processing stage of an ingredient.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PrepState {
    #[default]
    Raw,
    Chopped,
    Cooked,
}

impl PrepState {
    /// Tool that produces this state, if any.
    pub fn required_tool(self) -> Option<ToolId> {
        match self {
            PrepState::Raw => None,
            PrepState::Chopped => Some(ToolId::Knife),
            PrepState::Cooked => Some(ToolId::Stove),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrepState::Raw => "raw",
            PrepState::Chopped => "chopped",
            PrepState::Cooked => "cooked",
        }
    }
}

/// Catalog entry for a recipe.
///
/// `ingredients` lists each ingredient at most once. Ingredients missing from
/// `required_states` are expected raw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    pub name: &'static str,
    pub ingredients: &'static [IngredientId],
    pub required_states: &'static [(IngredientId, PrepState)],
    pub base_score: u32,
    /// Seconds allotted before the chef's time modifier.
    pub base_time: f32,
}

impl Recipe {
    pub fn requires(&self, ingredient: IngredientId) -> bool {
        self.ingredients.contains(&ingredient)
    }

    /// Mandated state for an ingredient, if the recipe names one.
    pub fn explicit_state(&self, ingredient: IngredientId) -> Option<PrepState> {
        self.required_states
            .iter()
            .find(|(id, _)| *id == ingredient)
            .map(|(_, state)| *state)
    }

    /// State an ingredient must be delivered in (raw unless stated).
    pub fn required_state(&self, ingredient: IngredientId) -> PrepState {
        self.explicit_state(ingredient).unwrap_or_default()
    }

    /// Tools implied by the processed states, deduplicated.
    pub fn required_tools(&self) -> Vec<ToolId> {
        let mut tools: Vec<ToolId> = self
            .required_states
            .iter()
            .filter_map(|(_, state)| state.required_tool())
            .collect();
        tools.sort();
        tools.dedup();
        tools
    }

    /// True when nothing needs chopping or cooking.
    pub fn is_raw_only(&self) -> bool {
        self.required_states.is_empty()
    }
}

use IngredientId::{Bread, Cheese, Lettuce, Meat, Tomato};
use PrepState::{Chopped, Cooked};

/// The recipe book, simplest first.
pub static RECIPES: [Recipe; 10] = [
    // Raw only
    Recipe {
        name: "Quick Snack",
        ingredients: &[Bread, Cheese],
        required_states: &[],
        base_score: 80,
        base_time: 30.0,
    },
    Recipe {
        name: "Simple Platter",
        ingredients: &[Bread, Lettuce, Tomato],
        required_states: &[],
        base_score: 90,
        base_time: 35.0,
    },
    Recipe {
        name: "Raw Special",
        ingredients: &[Lettuce, Tomato, Cheese],
        required_states: &[],
        base_score: 85,
        base_time: 35.0,
    },
    // Knife
    Recipe {
        name: "Fresh Salad",
        ingredients: &[Lettuce, Tomato],
        required_states: &[(Lettuce, Chopped), (Tomato, Chopped)],
        base_score: 100,
        base_time: 40.0,
    },
    Recipe {
        name: "Chopped Sandwich",
        ingredients: &[Bread, Lettuce, Tomato],
        required_states: &[(Lettuce, Chopped), (Tomato, Chopped)],
        base_score: 110,
        base_time: 45.0,
    },
    // Stove
    Recipe {
        name: "Grilled Cheese",
        ingredients: &[Bread, Cheese],
        required_states: &[(Cheese, Cooked)],
        base_score: 120,
        base_time: 45.0,
    },
    Recipe {
        name: "Hot Meal",
        ingredients: &[Bread, Meat],
        required_states: &[(Meat, Cooked)],
        base_score: 140,
        base_time: 50.0,
    },
    // Knife and stove
    Recipe {
        name: "Cheese Sandwich",
        ingredients: &[Bread, Cheese, Lettuce],
        required_states: &[(Cheese, Cooked), (Lettuce, Chopped)],
        base_score: 130,
        base_time: 50.0,
    },
    Recipe {
        name: "Meat Sandwich",
        ingredients: &[Bread, Meat, Tomato],
        required_states: &[(Meat, Cooked), (Tomato, Chopped)],
        base_score: 160,
        base_time: 55.0,
    },
    Recipe {
        name: "Deluxe Sandwich",
        ingredients: &[Bread, Meat, Cheese, Lettuce],
        required_states: &[(Meat, Cooked), (Cheese, Cooked), (Lettuce, Chopped)],
        base_score: 200,
        base_time: 60.0,
    },
];

pub fn recipe_by_name(name: &str) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| r.name == name)
}

/// Result of working an ingredient at a station.
///
/// The knife chops raw choppable ingredients; the stove cooks raw or chopped
/// cookable ones. Any other combination returns `state` unchanged.
pub fn process(ingredient: IngredientId, state: PrepState, station: ToolId) -> PrepState {
    let info = ingredient.info();
    match station.action() {
        ToolAction::Chop if info.can_chop && state == PrepState::Raw => PrepState::Chopped,
        ToolAction::Cook
            if info.can_cook && matches!(state, PrepState::Raw | PrepState::Chopped) =>
        {
            PrepState::Cooked
        }
        _ => state,
    }
}
