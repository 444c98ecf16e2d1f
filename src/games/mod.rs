//! Content built on the engine.
//!
//! - `thrones`: a standard round structure and a handful of scripted cards
//!   used by the tests and as examples of the binding API.

pub mod thrones;
