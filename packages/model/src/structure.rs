//! Document structure types.
//!
//! These are plain serde-backed records; the aggregate formats here are a
//! JSON wire contract shared with the generation service and document
//! history storage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provenance::{is_generated_id, is_user_id};

/// Bounding box in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One extracted textual block. `parent_id` forms an optional tree;
/// `order` is the stable render sequence among siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub content: String,
    pub order: i64,
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

/// An extracted table. Row widths are not trusted: the generation step
/// sometimes emits ragged rows, so consumers go through
/// [`Table::normalized_rows`] instead of indexing `rows` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Rows padded or truncated to exactly `columns.len()` cells.
    pub fn normalized_rows(&self) -> Vec<Vec<String>> {
        let width = self.columns.len();
        self.rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, String::new());
                row
            })
            .collect()
    }
}

/// An extracted image; `src` holds inline-encoded bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub src: String,
    pub bbox: BBox,
    pub page: u32,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

/// Component family of a user-owned element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserElementKind {
    Airplane,
    Hotel,
}

impl UserElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserElementKind::Airplane => "airplane",
            UserElementKind::Hotel => "hotel",
        }
    }

    /// Id prefix for elements of this kind, e.g. `user_airplane_`.
    pub fn id_prefix(&self) -> String {
        format!("user_{}_", self.as_str())
    }
}

/// A user-owned element. The payload is opaque to the model; the engine
/// reads and writes it through the template source text, not through
/// `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: UserElementKind,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Section,
    Table,
    Image,
}

/// Rendering-oriented wrapper for ordered, reorderable display. Blocks are
/// a derived view; the authoritative content lives in the structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    pub data: Value,
}

/// Legacy flat aggregate as emitted by older generation runs: no
/// provenance separation, no explicit render order, unprefixed ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub sections: Vec<Section>,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// Machine-generated half of the current aggregate. Read-only after
/// generation; replaced wholesale on re-generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub sections: Vec<Section>,
    pub tables: Vec<Table>,
}

/// User-owned half of the current aggregate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserContent {
    pub elements: Vec<UserElement>,
}

/// A violation of the layout/provenance invariants, reported by
/// [`SeparatedStructure::validate_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    /// An id present in a content half is missing from `layout`.
    MissingFromLayout(String),
    /// `layout` names an id absent from both halves.
    UnknownLayoutId(String),
    /// An id occurs more than once in `layout`.
    DuplicateLayoutId(String),
    /// An id's prefix disagrees with the half it lives in.
    PrefixMismatch(String),
}

/// Current aggregate: provenance-separated content plus the authoritative
/// render order.
///
/// Invariant: every id in `generated` or `user` appears exactly once in
/// `layout`, and `layout` contains no id absent from both halves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatedStructure {
    pub generated: GeneratedContent,
    pub user: UserContent,
    pub layout: Vec<String>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl SeparatedStructure {
    /// All content ids, generated halves first, in array order.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.generated
            .sections
            .iter()
            .map(|s| s.id.as_str())
            .chain(self.generated.tables.iter().map(|t| t.id.as_str()))
            .chain(self.user.elements.iter().map(|e| e.id.as_str()))
    }

    /// Check the layout-permutation and prefix/half invariants. An empty
    /// result means the structure is well formed.
    pub fn validate_layout(&self) -> Vec<LayoutViolation> {
        let mut violations = Vec::new();

        for section in &self.generated.sections {
            if !is_generated_id(&section.id) {
                violations.push(LayoutViolation::PrefixMismatch(section.id.clone()));
            }
        }
        for table in &self.generated.tables {
            if !is_generated_id(&table.id) {
                violations.push(LayoutViolation::PrefixMismatch(table.id.clone()));
            }
        }
        for element in &self.user.elements {
            if !is_user_id(&element.id) {
                violations.push(LayoutViolation::PrefixMismatch(element.id.clone()));
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for id in &self.layout {
            if seen.contains(&id.as_str()) {
                violations.push(LayoutViolation::DuplicateLayoutId(id.clone()));
            }
            seen.push(id.as_str());
            if !self.all_ids().any(|known| known == id) {
                violations.push(LayoutViolation::UnknownLayoutId(id.clone()));
            }
        }
        for id in self.all_ids() {
            if !self.layout.iter().any(|l| l == id) {
                violations.push(LayoutViolation::MissingFromLayout(id.to_string()));
            }
        }

        violations
    }

    pub fn find_user_element(&self, id: &str) -> Option<&UserElement> {
        self.user.elements.iter().find(|e| e.id == id)
    }

    /// Add a user element and register it in the render order.
    pub fn push_user_element(&mut self, element: UserElement) {
        self.layout.push(element.id.clone());
        self.user.elements.push(element);
    }

    /// Remove a user element, keeping `layout` consistent. Returns the
    /// removed element, or `None` if the id is not present.
    pub fn remove_user_element(&mut self, id: &str) -> Option<UserElement> {
        let pos = self.user.elements.iter().position(|e| e.id == id)?;
        let element = self.user.elements.remove(pos);
        self.layout.retain(|l| l != id);
        Some(element)
    }
}
