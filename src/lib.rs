//! Traffic Jam Simulation Library
//!
//! A single-lane ring-road cellular automaton with optional terminal rendering.

pub mod display;
pub mod simulation;
