//! Continuous cellular automaton engine: Conway, SmoothLife, and the two
//! Lenia variants over a toroidal double-buffered scalar field.

pub mod automaton;
pub mod convolve;
pub mod dispatch;
pub mod field;
pub mod geometry;
pub mod growth;
pub mod params;

pub use automaton::{Automaton, AutomatonConfig};
pub use convolve::Counter;
pub use field::{Field, SeedPolicy};
pub use geometry::LineTable;
pub use growth::{RaflerTransition, Transition};
pub use params::{AutomatonError, ParameterSet, RuleKind, MAX_RADIUS};
