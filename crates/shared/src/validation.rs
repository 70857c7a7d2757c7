use crate::constants::*;

/// A message must carry text, an attachment, or both.
pub fn validate_message_body(text: &str, attachment_url: Option<&str>) -> Result<(), String> {
    let has_attachment = attachment_url.is_some_and(|url| !url.trim().is_empty());
    if text.trim().is_empty() && !has_attachment {
        return Err("Message must have text or an attachment".into());
    }
    if text.len() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LENGTH
        ));
    }
    if let Some(url) = attachment_url {
        if url.len() > MAX_ATTACHMENT_URL_LENGTH {
            return Err("Attachment URL too long".into());
        }
    }
    Ok(())
}

pub fn validate_group_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Group name is required".into());
    }
    if trimmed.len() > MAX_GROUP_NAME_LENGTH {
        return Err(format!(
            "Group name must be at most {} characters",
            MAX_GROUP_NAME_LENGTH
        ));
    }
    Ok(())
}

/// Non-zero ids only; 0 is what an omitted JSON field decodes to.
pub fn require_id(field: &str, id: i64) -> Result<(), String> {
    if id <= 0 {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// Falls back to the default for missing or non-positive values.
pub fn normalize_page(page: Option<i64>) -> i64 {
    match page {
        Some(p) if p > 0 => p,
        _ => DEFAULT_PAGE,
    }
}

pub fn normalize_page_size(page_size: Option<i64>) -> i64 {
    match page_size {
        Some(s) if s > 0 => s,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Parses a raw query value, treating anything unparsable as absent.
pub fn parse_page_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
}
