//! Rules engine for Chaos Kitchen.
//!
//! This crate contains the gameplay rules that are independent of rendering,
//! audio, input and UI: a head chef that escalates difficulty, orders that
//! must be cooked under the chef's bans, and kitchen disasters that take
//! stations offline. Engines are driven by a per-frame `dt`, take their
//! randomness as `&mut impl Rng`, and report what happened as return values
//! or through registered listeners.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`agent`] | Chef dialogue providers (silent, fallback pools, channel-backed live agent) |
//! | [`catalog`] | Ingredients, tools, preparation states, the recipe book |
//! | [`disaster`] | Disaster scheduling, emergency items, resolution and penalties |
//! | [`escalation`] | Chef bans, escalation timer and weighted rule selection |
//! | [`kitchen`] | Station/counter layout, station availability, nearest interactable |
//! | [`orders`] | Legal order generation, delivery checks, scoring |
//! | [`profile`] | Player behaviour tracking (usage, mistakes, stress) |
//! | [`report`] | Report card stats, letter grades, text summary |
//! | [`session`] | One game: engines wired together behind player intents |
//! | [`tuning`] | Tunable constants, JSON loading and validation |
//! | [`weighted`] | Cumulative-subtraction weighted choice |

pub mod agent;
pub mod catalog;
pub mod disaster;
pub mod escalation;
pub mod kitchen;
pub mod orders;
pub mod profile;
pub mod report;
pub mod session;
pub mod tuning;
pub mod weighted;
