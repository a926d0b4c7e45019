//! The engine controller: position lifecycle, search-thread spawning
//! and the state (TT, history, PV) that persists across one game
//! (`spec.md` §6.1, §5).

mod controller;

pub use controller::{EngineController, InfoCallback, SearchJob, SearchParams, SearchResult};
