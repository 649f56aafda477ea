//! Mutation operations over template source text.
//!
//! Each operation is a pure function over the full source string: it
//! guards provenance first, locates the target region, edits it through
//! the codec, and splices the result back internally, returning a
//! complete new source text. On any error the caller simply keeps the
//! original string; no half-spliced output is ever produced.

use itinera_model::guard_generated_content;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::locator::{find_tagged_region, TaggedRegion};
use crate::records::{
    decode_records, encode_records, escape_string_value, replace_records, Record,
};
use crate::tags::TagFamily;

/// Scalar attribute value for [`update_attributes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    fn render(&self) -> String {
        match self {
            AttrValue::Str(s) => format!("\"{}\"", escape_string_value(s)),
            AttrValue::Int(n) => format!("{{{n}}}"),
            AttrValue::Bool(b) => format!("{{{b}}}"),
        }
    }
}

fn require_region(source: &str, family: &TagFamily, id: &str) -> EngineResult<TaggedRegion> {
    find_tagged_region(source, family.tag_name, id)?.ok_or_else(|| EngineError::NotFound {
        tag: family.tag_name.to_string(),
        id: id.to_string(),
    })
}

fn splice(source: &str, region: &TaggedRegion, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() + replacement.len());
    out.push_str(&source[..region.start]);
    out.push_str(replacement);
    out.push_str(&source[region.end..]);
    out
}

/// Append a record to the end of the family's array, preserving the
/// user-perceived ordering of the existing records.
pub fn append_record(
    source: &str,
    family: &TagFamily,
    id: &str,
    record: Record,
) -> EngineResult<String> {
    guard_generated_content(id, "append_record")?;
    let region = require_region(source, family, id)?;

    // Unfiltered decode: a record the read path would skip as incomplete
    // still belongs to the user and must survive the re-encode.
    let mut records = decode_records(&region.text, family.records_attribute);
    records.push(record);

    let new_region = replace_records(&region.text, family.records_attribute, &records)?;
    Ok(splice(source, &region, &new_region))
}

/// Replace the record at `index`.
pub fn update_record(
    source: &str,
    family: &TagFamily,
    id: &str,
    index: usize,
    record: Record,
) -> EngineResult<String> {
    guard_generated_content(id, "update_record")?;
    let region = require_region(source, family, id)?;

    let mut records = decode_records(&region.text, family.records_attribute);
    if index >= records.len() {
        return Err(EngineError::IndexOutOfRange {
            index,
            len: records.len(),
        });
    }
    records[index] = record;

    let new_region = replace_records(&region.text, family.records_attribute, &records)?;
    Ok(splice(source, &region, &new_region))
}

/// Remove the record at `index`. Refuses to empty the array: an empty
/// required array is an invalid document state for these component
/// families, so the caller must remove the whole region instead.
pub fn remove_record(
    source: &str,
    family: &TagFamily,
    id: &str,
    index: usize,
) -> EngineResult<String> {
    guard_generated_content(id, "remove_record")?;
    let region = require_region(source, family, id)?;

    let mut records = decode_records(&region.text, family.records_attribute);
    if index >= records.len() {
        return Err(EngineError::IndexOutOfRange {
            index,
            len: records.len(),
        });
    }
    if records.len() == 1 {
        return Err(EngineError::LastRecordViolation);
    }
    records.remove(index);

    let new_region = replace_records(&region.text, family.records_attribute, &records)?;
    Ok(splice(source, &region, &new_region))
}

/// Set scalar attributes on the region's opening tag. An existing
/// `name=value` occurrence is replaced; an absent attribute is inserted
/// just before the `id` anchor. Calling twice with the same values is a
/// no-op, never a duplicate.
pub fn update_attributes(
    source: &str,
    family: &TagFamily,
    id: &str,
    attrs: &[(String, AttrValue)],
) -> EngineResult<String> {
    guard_generated_content(id, "update_attributes")?;
    let region = require_region(source, family, id)?;

    // Only the opening tag is eligible; for a paired region everything
    // past the first `>` belongs to the children.
    let open_end = region
        .text
        .find('>')
        .map(|i| i + 1)
        .unwrap_or(region.text.len());
    let mut opening = region.text[..open_end].to_string();
    let rest = &region.text[open_end..];

    for (name, value) in attrs {
        let rendered = value.render();
        // Scalar values only: a quoted string or a simple braced literal.
        let pattern = format!(
            r#"(\s){name}=("(?:[^"\\]|\\.)*"|\{{[^{{}}\[\]]*\}})"#,
            name = regex::escape(name)
        );
        let attr_re = regex::Regex::new(&pattern).expect("escaped attribute pattern");

        if let Some(caps) = attr_re.captures(&opening) {
            let (Some(whole), Some(ws)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // Keep whatever whitespace preceded the attribute so an
            // attribute on its own line stays there.
            let replacement = format!("{}{name}={rendered}", ws.as_str());
            let range = whole.range();
            opening.replace_range(range, &replacement);
        } else if let Some(anchor) = opening.find(" id=\"") {
            opening.insert_str(anchor, &format!(" {name}={rendered}"));
        } else {
            debug!(%name, "no id anchor in opening tag, appending before tag end");
            let insert_at = opening
                .rfind("/>")
                .or_else(|| opening.rfind('>'))
                .unwrap_or(opening.len());
            opening.insert_str(insert_at, &format!(" {name}={rendered} "));
        }
    }

    let new_region = format!("{opening}{rest}");
    Ok(splice(source, &region, &new_region))
}

/// Delete the whole tagged region from the source, collapsing the
/// surrounding whitespace to at most one newline so repeated removals do
/// not accumulate blank lines.
pub fn remove_tagged_region(source: &str, tag_name: &str, id: &str) -> EngineResult<String> {
    guard_generated_content(id, "remove_tagged_region")?;
    let region =
        find_tagged_region(source, tag_name, id)?.ok_or_else(|| EngineError::NotFound {
            tag: tag_name.to_string(),
            id: id.to_string(),
        })?;

    let bytes = source.as_bytes();
    let mut start = region.start;
    while start > 0 && bytes[start - 1].is_ascii_whitespace() {
        start -= 1;
    }
    let mut end = region.end;
    while end < source.len() && bytes[end].is_ascii_whitespace() {
        end += 1;
    }

    let mut out = String::with_capacity(source.len());
    out.push_str(&source[..start]);
    if start > 0 && end < source.len() {
        out.push('\n');
    }
    out.push_str(&source[end..]);
    Ok(out)
}

/// Render a fresh self-closing region for a newly created user element.
pub fn new_region(family: &TagFamily, id: &str, records: &[Record]) -> String {
    let body = if records.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", encode_records(records))
    };
    format!(
        "<{tag} id=\"{id}\" {attr}={{[{body}]}} />",
        tag = family.tag_name,
        attr = family.records_attribute,
    )
}
