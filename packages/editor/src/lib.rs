//! # Itinera Editor
//!
//! Document state orchestration.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ generation service: upload → raw structure  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: state + guarded, ordered mutations  │
//! │  - migrate legacy structures on load        │
//! │  - dispatch actions strictly in order       │
//! │  - all-or-nothing state transitions         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: locate / decode / mutate source     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! This crate is the only caller of the engine's locator and codec;
//! UI-facing code dispatches [`Action`]s and reads the resulting
//! [`EditorState`]. Each action either fully succeeds, producing a new
//! state, or fully fails with the state unchanged; readers never observe
//! a partially applied mutation.

mod actions;
mod errors;
mod reducer;
mod state;

pub use actions::Action;
pub use errors::EditorError;
pub use reducer::{reduce, Editor};
pub use state::EditorState;

// Re-export the types callers need to build actions.
pub use itinera_engine::{AttrValue, Record, RecordValue};
pub use itinera_model::{Block, SeparatedStructure, UserElement, UserElementKind};
