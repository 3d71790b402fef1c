//! Media type normalization

/// Strip `;` parameters, trim and lower-case: `Application/JSON; charset=utf-8` → `application/json`.
pub(crate) fn normalize_media_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `application/json` or any structured `+json` suffix. Expects a normalized type.
pub(crate) fn is_json_media_type(normalized: &str) -> bool {
    normalized == "application/json" || normalized.ends_with("+json")
}
