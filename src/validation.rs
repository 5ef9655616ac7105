//! Shared input validation and handle derivation.

const MAX_NAME_LEN: usize = 120;

/// Validate an operator-supplied display name (category, attribute, product
/// title, bundle name).
pub fn validate_display_name(name: &str, entity: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(format!("{entity} name cannot exceed {MAX_NAME_LEN} characters"));
    }
    Ok(())
}

fn slugify(name: &str, separator: char) -> String {
    let mut handle = String::with_capacity(name.len());
    let mut previous_was_separator = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            handle.push(c.to_ascii_lowercase());
            previous_was_separator = false;
        } else if !previous_was_separator {
            handle.push(separator);
            previous_was_separator = true;
        }
    }
    while handle.ends_with(separator) {
        handle.pop();
    }
    handle
}

/// URL-safe handle for categories, products and bundles (`"Face Serum"` →
/// `"face-serum"`).
pub fn handle_from_name(name: &str) -> String {
    slugify(name, '-')
}

/// Snake-case handle for attributes and their options (`"Skin Concerns"` →
/// `"skin_concerns"`).
pub fn attribute_handle_from_name(name: &str) -> String {
    slugify(name, '_')
}
