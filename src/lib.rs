//! Tetra Duel (workspace facade crate).
//!
//! The engine lives in dedicated crates under `crates/`; this package
//! re-exports them as `tetra_duel::{core, types}` and adds the placement
//! autoplayer used by the headless `tetra-duel` runner.

pub use tetra_duel_core as core;
pub use tetra_duel_types as types;

pub mod autoplay;
