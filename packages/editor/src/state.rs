//! Editor state.

use itinera_model::{Block, BlockKind, SeparatedStructure};
use serde_json::Value;

/// Immutable snapshot of the edited document: the authoritative separated
/// structure, the derived display-block view, the current template
/// source, and a version that increments on every applied action.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub structure: SeparatedStructure,
    pub blocks: Vec<Block>,
    pub source: String,
    pub version: u64,
}

impl EditorState {
    pub fn new(structure: SeparatedStructure, source: String) -> Self {
        let blocks = derive_blocks(&structure);
        Self {
            structure,
            blocks,
            source,
            version: 0,
        }
    }

    /// Next state with a new structure: the block view is re-derived.
    pub(crate) fn with_structure(&self, structure: SeparatedStructure, source: String) -> Self {
        let blocks = derive_blocks(&structure);
        Self {
            structure,
            blocks,
            source,
            version: self.version + 1,
        }
    }

    /// Next state with only the source changed.
    pub(crate) fn with_source(&self, source: String) -> Self {
        Self {
            structure: self.structure.clone(),
            blocks: self.blocks.clone(),
            source,
            version: self.version + 1,
        }
    }

    /// Next state with only the block view reordered.
    pub(crate) fn with_blocks(&self, blocks: Vec<Block>) -> Self {
        Self {
            structure: self.structure.clone(),
            blocks,
            source: self.source.clone(),
            version: self.version + 1,
        }
    }
}

/// Build the display-block view for the generated content, in layout
/// order. User elements render through the template source directly and
/// have no block.
pub(crate) fn derive_blocks(structure: &SeparatedStructure) -> Vec<Block> {
    let mut blocks = Vec::new();
    for id in &structure.layout {
        if let Some(section) = structure.generated.sections.iter().find(|s| &s.id == id) {
            blocks.push(Block {
                id: section.id.clone(),
                kind: BlockKind::Section,
                page: section.page.unwrap_or(0),
                bbox: section.bbox.clone(),
                data: serde_json::to_value(section).unwrap_or(Value::Null),
            });
        } else if let Some(table) = structure.generated.tables.iter().find(|t| &t.id == id) {
            blocks.push(Block {
                id: table.id.clone(),
                kind: BlockKind::Table,
                page: 0,
                bbox: None,
                data: serde_json::to_value(table).unwrap_or(Value::Null),
            });
        }
    }
    blocks
}
