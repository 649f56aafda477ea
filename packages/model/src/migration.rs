//! Legacy-structure migration.
//!
//! Older generation runs emitted the flat [`Structure`] aggregate with
//! unprefixed ids (`section_1`, `table_2`) and no render order. This
//! module rewrites that shape into the current [`SeparatedStructure`]:
//! prefixed ids, cross-references kept consistent, explicit layout, empty
//! user half.
//!
//! The discriminators are structural (shape-based), not tagged unions:
//! callers hand us a raw JSON value and we decide which format it is, so
//! an already-current structure is never migrated twice.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::provenance::{GENERATED_SECTION_PREFIX, GENERATED_TABLE_PREFIX};
use crate::structure::{GeneratedContent, SeparatedStructure, Structure, UserContent};

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("value is neither a legacy nor a separated structure")]
    UnrecognizedShape,

    #[error("structure deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Shape check for the legacy flat aggregate: top-level `sections` array
/// and no `generated`/`layout` keys.
pub fn is_legacy_structure(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    obj.get("sections").is_some_and(Value::is_array)
        && !obj.contains_key("generated")
        && !obj.contains_key("layout")
}

/// Shape check for the current aggregate: `generated` object plus `layout`
/// array. Mutually exclusive with [`is_legacy_structure`] on well-formed
/// input.
pub fn is_separated_structure(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    obj.get("generated").is_some_and(Value::is_object)
        && obj.get("layout").is_some_and(Value::is_array)
}

/// Normalize a section id to the prefixed scheme. Already-prefixed ids
/// pass through unchanged, so normalization is idempotent.
fn normalize_section_id(id: &str) -> String {
    if id.starts_with(GENERATED_SECTION_PREFIX) {
        return id.to_string();
    }
    if let Some(n) = id.strip_prefix("section_") {
        if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) {
            return format!("{GENERATED_SECTION_PREFIX}{n}");
        }
    }
    warn!(id, "unexpected section id scheme, re-prefixing");
    format!("{GENERATED_SECTION_PREFIX}{id}")
}

fn normalize_table_id(id: &str) -> String {
    if id.starts_with(GENERATED_TABLE_PREFIX) {
        return id.to_string();
    }
    if let Some(n) = id.strip_prefix("table_") {
        if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) {
            return format!("{GENERATED_TABLE_PREFIX}{n}");
        }
    }
    warn!(id, "unexpected table id scheme, re-prefixing");
    format!("{GENERATED_TABLE_PREFIX}{id}")
}

/// Rewrite a legacy aggregate into the current separated form.
///
/// Ids are normalized in place, cross-references (`parent_id` on sections,
/// `section_id` on tables) are rewritten through the same normalization,
/// and `layout` is built as all section ids in array order followed by all
/// table ids in array order. The user half starts empty: the legacy format
/// carried no user content.
pub fn migrate_to_separated_structure(legacy: Structure) -> SeparatedStructure {
    let Structure {
        mut sections,
        mut tables,
        images: _,
        mut meta,
    } = legacy;

    for section in &mut sections {
        section.id = normalize_section_id(&section.id);
        if let Some(parent) = section.parent_id.take() {
            section.parent_id = Some(normalize_section_id(&parent));
        }
    }
    for table in &mut tables {
        table.id = normalize_table_id(&table.id);
        if let Some(section_id) = table.section_id.take() {
            table.section_id = Some(normalize_section_id(&section_id));
        }
    }

    let layout = sections
        .iter()
        .map(|s| s.id.clone())
        .chain(tables.iter().map(|t| t.id.clone()))
        .collect();

    meta.insert("structure_version".to_string(), Value::from(2));
    meta.insert("migrated_from_legacy".to_string(), Value::from(true));

    SeparatedStructure {
        generated: GeneratedContent { sections, tables },
        user: UserContent::default(),
        layout,
        meta,
    }
}

/// Entry point for raw structure JSON of either vintage.
///
/// Already-current structures deserialize directly (no re-migration);
/// legacy structures are migrated; anything else is rejected.
pub fn migrate_value(value: Value) -> Result<SeparatedStructure, MigrationError> {
    if is_separated_structure(&value) {
        return Ok(serde_json::from_value(value)?);
    }
    if is_legacy_structure(&value) {
        let legacy: Structure = serde_json::from_value(value)?;
        return Ok(migrate_to_separated_structure(legacy));
    }
    Err(MigrationError::UnrecognizedShape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Section, Table};
    use serde_json::{json, Map};

    fn legacy() -> Structure {
        Structure {
            sections: vec![Section {
                id: "section_1".to_string(),
                title: "Itinerary".to_string(),
                content: "Outbound".to_string(),
                order: 0,
                parent_id: None,
                bbox: None,
                direction: None,
                page: Some(1),
                font_size: None,
            }],
            tables: vec![Table {
                id: "table_1".to_string(),
                order: 1,
                section_id: Some("section_1".to_string()),
                columns: vec!["From".to_string(), "To".to_string()],
                rows: vec![vec!["AMS".to_string(), "LIS".to_string()]],
            }],
            images: vec![],
            meta: Map::new(),
        }
    }

    #[test]
    fn test_migrates_ids_references_and_layout() {
        let separated = migrate_to_separated_structure(legacy());

        assert_eq!(separated.generated.sections[0].id, "gen_sec_1");
        assert_eq!(separated.generated.tables[0].id, "gen_tbl_1");
        assert_eq!(
            separated.generated.tables[0].section_id.as_deref(),
            Some("gen_sec_1")
        );
        assert_eq!(separated.layout, vec!["gen_sec_1", "gen_tbl_1"]);
        assert!(separated.user.elements.is_empty());
        assert_eq!(separated.meta.get("structure_version"), Some(&json!(2)));
        assert_eq!(separated.meta.get("migrated_from_legacy"), Some(&json!(true)));
    }

    #[test]
    fn test_migration_is_idempotent_on_ids() {
        let once = migrate_to_separated_structure(legacy());

        // Re-wrap the output as a legacy shape and migrate again.
        let rewrapped = Structure {
            sections: once.generated.sections.clone(),
            tables: once.generated.tables.clone(),
            images: vec![],
            meta: Map::new(),
        };
        let twice = migrate_to_separated_structure(rewrapped);

        assert_eq!(once.generated, twice.generated);
        assert_eq!(once.layout, twice.layout);
    }

    #[test]
    fn test_unknown_ids_are_defensively_prefixed() {
        let mut structure = legacy();
        structure.sections[0].id = "weird-id".to_string();

        let separated = migrate_to_separated_structure(structure);
        assert_eq!(separated.generated.sections[0].id, "gen_sec_weird-id");
    }

    #[test]
    fn test_discriminators_are_mutually_exclusive() {
        let legacy_value = serde_json::to_value(legacy()).unwrap();
        assert!(is_legacy_structure(&legacy_value));
        assert!(!is_separated_structure(&legacy_value));

        let separated = migrate_to_separated_structure(legacy());
        let separated_value = serde_json::to_value(&separated).unwrap();
        assert!(is_separated_structure(&separated_value));
        assert!(!is_legacy_structure(&separated_value));
    }

    #[test]
    fn test_migrate_value_never_remigrates_current() {
        let separated = migrate_to_separated_structure(legacy());
        let value = serde_json::to_value(&separated).unwrap();

        let back = migrate_value(value).unwrap();
        assert_eq!(back, separated);
    }

    #[test]
    fn test_migrate_value_rejects_unrecognized() {
        let err = migrate_value(json!({"foo": 1})).unwrap_err();
        assert!(matches!(err, MigrationError::UnrecognizedShape));
    }

    #[test]
    fn test_migrate_value_accepts_legacy_json() {
        let value = json!({
            "sections": [{
                "id": "section_1",
                "title": "A",
                "content": "B",
                "order": 0,
                "parent_id": null
            }],
            "tables": [],
            "meta": {}
        });

        let separated = migrate_value(value).unwrap();
        assert_eq!(separated.generated.sections[0].id, "gen_sec_1");
        assert_eq!(separated.layout, vec!["gen_sec_1"]);
    }
}
