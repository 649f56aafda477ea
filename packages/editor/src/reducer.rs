//! State transitions.
//!
//! `reduce` is a pure function from a state and an action to the next
//! state; [`Editor`] is the thin dispatch loop around it. Guards run
//! before any text scanning, and a failing action leaves the previous
//! state untouched.

use itinera_engine::{
    append_record, family_for_id, family_for_kind, new_region, remove_record,
    remove_tagged_region, update_attributes, update_record,
};
use itinera_model::{guard_generated_content, migrate_value, UserElement};
use tracing::debug;

use crate::actions::Action;
use crate::errors::EditorError;
use crate::state::EditorState;

/// Compute the next state for one action. Pure: neither input is
/// modified, and on error the caller's state is still the current one.
pub fn reduce(state: &EditorState, action: &Action) -> Result<EditorState, EditorError> {
    match action {
        Action::LoadStructure { structure, source } => {
            let structure = migrate_value(structure.clone())?;
            let mut next = EditorState::new(structure, source.clone());
            next.version = state.version + 1;
            Ok(next)
        }

        Action::AddUserElement { kind, id, records } => {
            guard_generated_content(id, "add_user_element")?;
            if !id.starts_with(&kind.id_prefix()) {
                return Err(EditorError::UnknownTagFamily(id.clone()));
            }
            if state.structure.find_user_element(id).is_some() {
                return Err(EditorError::DuplicateElement(id.clone()));
            }

            let family = family_for_kind(*kind);
            let region = new_region(family, id, records);

            let mut source = state.source.trim_end().to_string();
            if !source.is_empty() {
                source.push_str("\n\n");
            }
            source.push_str(&region);
            source.push('\n');

            let mut structure = state.structure.clone();
            structure.push_user_element(UserElement {
                id: id.clone(),
                kind: *kind,
                data: serde_json::to_value(records).unwrap_or(serde_json::Value::Null),
            });

            Ok(state.with_structure(structure, source))
        }

        Action::AppendRecord { id, record } => {
            guard_generated_content(id, "append_record")?;
            let family =
                family_for_id(id).ok_or_else(|| EditorError::UnknownTagFamily(id.clone()))?;
            let source = append_record(&state.source, family, id, record.clone())?;
            Ok(state.with_source(source))
        }

        Action::UpdateRecord { id, index, record } => {
            guard_generated_content(id, "update_record")?;
            let family =
                family_for_id(id).ok_or_else(|| EditorError::UnknownTagFamily(id.clone()))?;
            let source = update_record(&state.source, family, id, *index, record.clone())?;
            Ok(state.with_source(source))
        }

        Action::RemoveRecord { id, index } => {
            guard_generated_content(id, "remove_record")?;
            let family =
                family_for_id(id).ok_or_else(|| EditorError::UnknownTagFamily(id.clone()))?;
            let source = remove_record(&state.source, family, id, *index)?;
            Ok(state.with_source(source))
        }

        Action::UpdateAttributes { id, attrs } => {
            guard_generated_content(id, "update_attributes")?;
            let family =
                family_for_id(id).ok_or_else(|| EditorError::UnknownTagFamily(id.clone()))?;
            let source = update_attributes(&state.source, family, id, attrs)?;
            Ok(state.with_source(source))
        }

        Action::RemoveElement { id } => {
            guard_generated_content(id, "remove_element")?;
            let family =
                family_for_id(id).ok_or_else(|| EditorError::UnknownTagFamily(id.clone()))?;
            if state.structure.find_user_element(id).is_none() {
                return Err(EditorError::UnknownElement(id.clone()));
            }

            let source = remove_tagged_region(&state.source, family.tag_name, id)?;
            let mut structure = state.structure.clone();
            structure.remove_user_element(id);
            Ok(state.with_structure(structure, source))
        }

        Action::MoveBlock { id, index } => {
            let mut blocks = state.blocks.clone();
            let pos = blocks
                .iter()
                .position(|b| &b.id == id)
                .ok_or_else(|| EditorError::UnknownElement(id.clone()))?;
            let block = blocks.remove(pos);
            let target = (*index).min(blocks.len());
            blocks.insert(target, block);
            Ok(state.with_blocks(blocks))
        }
    }
}

/// Holds the current state and applies actions strictly one at a time, in
/// dispatch order. The state cell is replaced only on full success.
#[derive(Debug)]
pub struct Editor {
    state: EditorState,
}

impl Editor {
    pub fn new(state: EditorState) -> Self {
        Self { state }
    }

    /// Bootstrap from raw structure JSON (legacy or current) plus the
    /// generated template source.
    pub fn load(structure: serde_json::Value, source: String) -> Result<Self, EditorError> {
        let structure = migrate_value(structure)?;
        Ok(Self {
            state: EditorState::new(structure, source),
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Apply one action. On failure the held state is unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<&EditorState, EditorError> {
        let next = reduce(&self.state, &action)?;
        debug!(version = next.version, "applied action");
        self.state = next;
        Ok(&self.state)
    }
}
