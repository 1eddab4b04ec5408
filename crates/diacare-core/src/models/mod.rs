//! Domain models for the diacare engine.

mod document;
mod food;
mod health;
mod meal;
mod prediction;

pub use document::*;
pub use food::*;
pub use health::*;
pub use meal::*;
pub use prediction::*;
