//! calcdeck: a four-function, scientific and programmer calculator engine.
//!
//! [`calculator::Calculator`] is the engine. The other modules wrap it:
//! [`history`] keeps finished calculations, [`keyboard`] maps key presses to
//! engine actions, [`script`] drives the engine from text, and [`config`]
//! loads user preferences.

pub mod calculator;
pub mod config;
pub mod history;
pub mod keyboard;
pub mod script;
