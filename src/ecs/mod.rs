//! Reference host world

pub mod world;

pub use world::{Creature, SimWorld};
