//! Decision layer - turns fetched posts into an ordered list of actions
//!
//! Strategies are injected into the agent, so a different policy can be
//! swapped in without touching the scheduler.

pub mod persona;
pub mod strategy;

pub use persona::{CommunicationStyle, Persona, PersonaStrategy, PersonaTraits, PoliticalOrientation};
pub use strategy::{DecisionError, DecisionStrategy, FnStrategy};
