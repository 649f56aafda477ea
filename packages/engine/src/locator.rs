//! Tagged-region location.
//!
//! Finds the exact substring of one markup element by tag name and id,
//! handling both self-closing and paired forms. The paired form uses a
//! nearest-closing-tag scan, not a nesting-aware one: the upstream
//! generator never nests components of the same family inside one
//! another, and that precondition is enforced only by the balance recount
//! before returning.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// One complete tagged element located in source text. `text` is exactly
/// `source[start..end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRegion {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

static TAG_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap());

/// Opening tag of `tag_name` carrying `id="<id>"`, terminated by either
/// `/>` or the end of the opening tag. Both interpolations go through
/// `regex::escape`, so the pattern is always valid.
fn open_tag_regex(tag_name: &str, id: &str) -> Regex {
    let pattern = format!(
        r#"<{tag}\b[^>]*?\sid="{id}"[^>]*?(?:/>|>)"#,
        tag = regex::escape(tag_name),
        id = regex::escape(id)
    );
    Regex::new(&pattern).expect("escaped tag pattern")
}

fn any_open_tag_regex(tag_name: &str) -> Regex {
    let pattern = format!(r"<{}\b", regex::escape(tag_name));
    Regex::new(&pattern).expect("escaped tag pattern")
}

/// Locate the single `<tag_name ... id="<id>" ...>` region in `source`.
///
/// Returns `Ok(None)` when the id is simply not present, so read paths
/// stay non-throwing; mutation paths convert that into
/// [`EngineError::NotFound`]. Returns [`EngineError::TagImbalance`] when
/// the extracted region does not contain exactly one opening and (for the
/// paired form) one closing tag.
pub fn find_tagged_region(
    source: &str,
    tag_name: &str,
    id: &str,
) -> EngineResult<Option<TaggedRegion>> {
    if !TAG_NAME_RE.is_match(tag_name) {
        debug!(tag_name, "rejecting non-tag-shaped name");
        return Ok(None);
    }

    let Some(open) = open_tag_regex(tag_name, id).find(source) else {
        return Ok(None);
    };

    // Defend against attribute values that coincidentally contain another
    // tag's text, and against greedy over-matches past the target id.
    let open_text = open.as_str();
    if !open_text.starts_with(&format!("<{tag_name}"))
        || !open_text.contains(&format!("\"{id}\""))
    {
        debug!(tag_name, id, "opening-tag match failed sanity checks");
        return Ok(None);
    }

    let self_closing = open_text.ends_with("/>");
    let (start, end) = if self_closing {
        (open.start(), open.end())
    } else {
        // Nearest matching closing tag; same-family tags are never nested.
        let close_marker = format!("</{tag_name}>");
        let Some(rel) = source[open.end()..].find(&close_marker) else {
            return Err(EngineError::TagImbalance {
                tag: tag_name.to_string(),
                id: id.to_string(),
            });
        };
        (open.start(), open.end() + rel + close_marker.len())
    };

    let region = &source[start..end];

    let opens = any_open_tag_regex(tag_name).find_iter(region).count();
    let closes = region.matches(&format!("</{tag_name}>")).count();
    let expected_closes = usize::from(!self_closing);
    if opens != 1 || closes != expected_closes {
        return Err(EngineError::TagImbalance {
            tag: tag_name.to_string(),
            id: id.to_string(),
        });
    }

    Ok(Some(TaggedRegion {
        text: region.to_string(),
        start,
        end,
    }))
}
