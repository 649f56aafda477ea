//! End-to-end reducer tests: migration on load, layout invariants, and
//! guarded edits over the template source.

use itinera_editor::{Action, Editor, EditorError, Record, UserElementKind};
use itinera_engine::{decode_records, find_tagged_region, EngineError};
use itinera_model::ProvenanceError;
use serde_json::json;

fn legacy_structure() -> serde_json::Value {
    json!({
        "sections": [{
            "id": "section_1",
            "title": "Itinerary",
            "content": "Outbound flights",
            "order": 0,
            "parent_id": null,
            "page": 1
        }],
        "tables": [{
            "id": "table_1",
            "order": 1,
            "section_id": "section_1",
            "columns": ["From", "To"],
            "rows": [["AMS", "LIS"]]
        }],
        "meta": {}
    })
}

fn flight(airline: &str, number: i64) -> Record {
    Record::new()
        .with_str("airline", airline)
        .with_int("flightNumber", number)
}

#[test]
fn test_load_migrates_legacy_structure() {
    let editor = Editor::load(legacy_structure(), String::new()).unwrap();
    let structure = &editor.state().structure;

    assert_eq!(structure.generated.sections[0].id, "gen_sec_1");
    assert_eq!(structure.generated.tables[0].id, "gen_tbl_1");
    assert_eq!(
        structure.generated.tables[0].section_id.as_deref(),
        Some("gen_sec_1")
    );
    assert_eq!(structure.layout, vec!["gen_sec_1", "gen_tbl_1"]);
    assert!(structure.validate_layout().is_empty());
}

#[test]
fn test_load_derives_blocks_in_layout_order() {
    let editor = Editor::load(legacy_structure(), String::new()).unwrap();
    let blocks = &editor.state().blocks;

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].id, "gen_sec_1");
    assert_eq!(blocks[1].id, "gen_tbl_1");
}

#[test]
fn test_add_user_element_keeps_layout_complete() {
    let mut editor = Editor::load(legacy_structure(), String::new()).unwrap();
    editor
        .dispatch(Action::AddUserElement {
            kind: UserElementKind::Airplane,
            id: "user_airplane_1".to_string(),
            records: vec![flight("KLM", 1601)],
        })
        .unwrap();

    let state = editor.state();
    assert!(state.structure.validate_layout().is_empty());
    assert_eq!(
        state.structure.layout,
        vec!["gen_sec_1", "gen_tbl_1", "user_airplane_1"]
    );

    let region = find_tagged_region(&state.source, "AirplaneSection", "user_airplane_1")
        .unwrap()
        .unwrap();
    let records = decode_records(&region.text, "flights");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].str_field("airline"), Some("KLM"));
}

#[test]
fn test_append_update_remove_record_through_dispatch() {
    let mut editor = Editor::load(legacy_structure(), String::new()).unwrap();
    let id = "user_airplane_1".to_string();

    editor
        .dispatch(Action::AddUserElement {
            kind: UserElementKind::Airplane,
            id: id.clone(),
            records: vec![flight("KLM", 1601)],
        })
        .unwrap();
    editor
        .dispatch(Action::AppendRecord {
            id: id.clone(),
            record: flight("TAP", 665),
        })
        .unwrap();
    editor
        .dispatch(Action::UpdateRecord {
            id: id.clone(),
            index: 1,
            record: flight("LH", 992),
        })
        .unwrap();

    let region = find_tagged_region(&editor.state().source, "AirplaneSection", &id)
        .unwrap()
        .unwrap();
    let records = decode_records(&region.text, "flights");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].str_field("airline"), Some("LH"));

    editor
        .dispatch(Action::RemoveRecord {
            id: id.clone(),
            index: 0,
        })
        .unwrap();

    let err = editor
        .dispatch(Action::RemoveRecord { id, index: 0 })
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Engine(EngineError::LastRecordViolation)
    ));
}

#[test]
fn test_remove_element_cleans_structure_layout_and_source() {
    let mut editor = Editor::load(legacy_structure(), String::new()).unwrap();
    editor
        .dispatch(Action::AddUserElement {
            kind: UserElementKind::Hotel,
            id: "user_hotel_1".to_string(),
            records: vec![Record::new()
                .with_str("name", "Hotel Avenida")
                .with_str("checkIn", "2026-09-01")],
        })
        .unwrap();

    editor
        .dispatch(Action::RemoveElement {
            id: "user_hotel_1".to_string(),
        })
        .unwrap();

    let state = editor.state();
    assert!(state.structure.user.elements.is_empty());
    assert_eq!(state.structure.layout, vec!["gen_sec_1", "gen_tbl_1"]);
    assert!(!state.source.contains("HotelSection"));
    assert!(state.structure.validate_layout().is_empty());
}

#[test]
fn test_generated_content_is_guarded() {
    let mut editor = Editor::load(legacy_structure(), String::new()).unwrap();
    let source_before = editor.state().source.clone();

    let err = editor
        .dispatch(Action::AppendRecord {
            id: "gen_sec_1".to_string(),
            record: flight("KLM", 1),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Provenance(ProvenanceError::ProvenanceViolation { .. })
    ));

    let err = editor
        .dispatch(Action::RemoveElement {
            id: "gen_tbl_1".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Provenance(ProvenanceError::ProvenanceViolation { .. })
    ));

    // Source is byte-for-byte unchanged after the rejected edits.
    assert_eq!(editor.state().source, source_before);
    assert_eq!(editor.state().version, 0);
}

#[test]
fn test_duplicate_user_element_rejected() {
    let mut editor = Editor::load(legacy_structure(), String::new()).unwrap();
    let add = Action::AddUserElement {
        kind: UserElementKind::Airplane,
        id: "user_airplane_1".to_string(),
        records: vec![flight("KLM", 1601)],
    };

    editor.dispatch(add.clone()).unwrap();
    let err = editor.dispatch(add).unwrap_err();
    assert!(matches!(err, EditorError::DuplicateElement(_)));
}

#[test]
fn test_move_block_reorders_view_only() {
    let mut editor = Editor::load(legacy_structure(), String::new()).unwrap();
    editor
        .dispatch(Action::MoveBlock {
            id: "gen_tbl_1".to_string(),
            index: 0,
        })
        .unwrap();

    let state = editor.state();
    assert_eq!(state.blocks[0].id, "gen_tbl_1");
    assert_eq!(state.blocks[1].id, "gen_sec_1");
    // Layout (the authoritative order) is untouched.
    assert_eq!(state.structure.layout, vec!["gen_sec_1", "gen_tbl_1"]);
}

#[test]
fn test_load_current_structure_is_not_remigrated() -> anyhow::Result<()> {
    let editor = Editor::load(legacy_structure(), String::new())?;
    let current = serde_json::to_value(&editor.state().structure)?;

    let reloaded = Editor::load(current, String::new())?;
    assert_eq!(reloaded.state().structure, editor.state().structure);
    Ok(())
}
