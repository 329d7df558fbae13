//! Metadata line rewriting
//!
//! An entry is rewritten through its attribute map: the old `group-title` is
//! removed, the resolved category goes directly after the duration token, and
//! every other attribute is serialized back in source order. Running the
//! rewrite over its own output yields the same line.

use std::borrow::Cow;

use crate::models::*;

/// Display name of an entry: the title, or `tvg-name` when the title is empty
pub fn derived_display_name(entry: &Entry) -> &str {
    let title = entry.title.trim();
    if !title.is_empty() {
        return title;
    }
    entry
        .attributes
        .get_non_empty(TVG_NAME)
        .map(str::trim)
        .unwrap_or("")
}

/// Text made safe to write inside a quoted attribute value.
///
/// Quoted values end at the first `"`, so double quotes become single quotes.
pub fn attribute_value(text: &str) -> Cow<'_, str> {
    if text.contains('"') {
        Cow::Owned(text.replace('"', "'"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Serialize the canonical metadata line for `entry`, with `category` as its
/// `group-title` or no category attribute at all when `None`.
pub fn render_extinf(entry: &Entry, category: Option<&str>) -> String {
    let mut attributes = entry.attributes.clone();
    attributes.remove(GROUP_TITLE);

    let display_name = derived_display_name(entry);
    if attributes.get_non_empty(TVG_NAME).is_none() {
        attributes.set(TVG_NAME, attribute_value(display_name).as_ref());
    }

    let duration = entry
        .duration
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DURATION);

    let mut line = format!("{}:{}", EXTINF_DIRECTIVE, duration);
    if let Some(category) = category {
        line.push_str(&format!(" {}=\"{}\"", GROUP_TITLE, category));
    }
    for (key, value) in attributes.iter() {
        line.push_str(&format!(" {}=\"{}\"", key, attribute_value(value)));
    }
    line.push(',');
    line.push_str(display_name);
    line
}

/// Rewrite a classified entry. Returns `None` when nothing claimed it;
/// the unmatched policy is the caller's decision.
pub fn rewrite(entry: &Entry, classification: &ClassificationResult<'_>) -> Option<String> {
    classification
        .category_name()
        .map(|category| render_extinf(entry, Some(category)))
}
