//! Field limits shared by every write path.

use crate::error::{AppError, Result};

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_SEGMENTS: usize = 20;
pub const MAX_SEGMENT_LENGTH: usize = 2_000;
pub const MAX_TAGS: usize = 5;
pub const MAX_COLLECTION_NAME_LENGTH: usize = 50;
pub const MAX_COLLECTION_DESCRIPTION_LENGTH: usize = 500;

pub fn normalize_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::validation(format!(
            "title exceeds max length of {MAX_TITLE_LENGTH}"
        )));
    }
    Ok(title.to_string())
}

/// Segment content is opaque markup; it is length-checked but never rewritten.
pub fn validate_segment_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("segment content is required"));
    }
    if content.chars().count() > MAX_SEGMENT_LENGTH {
        return Err(AppError::validation(format!(
            "segment content exceeds max length of {MAX_SEGMENT_LENGTH}"
        )));
    }
    Ok(())
}

pub fn validate_segment_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(AppError::validation("a thread needs at least one segment"));
    }
    if count > MAX_SEGMENTS {
        return Err(AppError::validation(format!(
            "segments exceed max of {MAX_SEGMENTS}"
        )));
    }
    Ok(())
}

/// Trims tags, drops blanks and duplicates (first occurrence wins), then enforces the cap.
pub fn normalize_tags(raw: &[String]) -> Result<Vec<String>> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() || tags.iter().any(|existing| existing == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    if tags.len() > MAX_TAGS {
        return Err(AppError::validation(format!("tags exceed max of {MAX_TAGS}")));
    }
    Ok(tags)
}

pub fn normalize_collection_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("collection name is required"));
    }
    if name.chars().count() > MAX_COLLECTION_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "collection name exceeds max length of {MAX_COLLECTION_NAME_LENGTH}"
        )));
    }
    Ok(name.to_string())
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(raw: Option<&str>) -> Result<Option<String>> {
    let Some(description) = raw.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_COLLECTION_DESCRIPTION_LENGTH {
        return Err(AppError::validation(format!(
            "description exceeds max length of {MAX_COLLECTION_DESCRIPTION_LENGTH}"
        )));
    }
    Ok(Some(description.to_string()))
}
