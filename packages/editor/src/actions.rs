//! User edit actions.
//!
//! Actions are the wire format between UI-facing code and the reducer;
//! they serialize to JSON so edits can be queued, logged, or replayed.

use itinera_engine::{AttrValue, Record};
use itinera_model::UserElementKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Load a structure of either vintage (legacy structures are migrated
    /// on the way in) together with its generated template source.
    LoadStructure { structure: Value, source: String },

    /// Create a user element: registers it in the structure and layout and
    /// appends a freshly rendered region to the source.
    AddUserElement {
        kind: UserElementKind,
        id: String,
        records: Vec<Record>,
    },

    /// Append a record to the element's array.
    AppendRecord { id: String, record: Record },

    /// Replace the record at `index`.
    UpdateRecord {
        id: String,
        index: usize,
        record: Record,
    },

    /// Remove the record at `index`.
    RemoveRecord { id: String, index: usize },

    /// Set scalar attributes on the element's opening tag.
    UpdateAttributes {
        id: String,
        attrs: Vec<(String, AttrValue)>,
    },

    /// Delete a user element: its region, its structure entry, and its
    /// layout slot.
    RemoveElement { id: String },

    /// Reorder the display-block view. The authoritative structure is
    /// untouched.
    MoveBlock { id: String, index: usize },
}
