//! Demo collaborators for running the engine outside a browser: a search
//! provider backed by lodging fixtures, a stub lead converter and a map
//! surface that logs every call.
pub mod console_map;
pub mod fixture_provider;

pub use console_map::ConsoleMap;
pub use fixture_provider::{FixtureSearchProvider, StubConverter};
