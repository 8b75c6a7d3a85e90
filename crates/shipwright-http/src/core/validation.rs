use crate::data::Headers;

/// Any `Content-Type` value mentioning json.
pub fn is_json_content(headers: &Headers) -> bool {
    headers
        .get_all("content-type")
        .any(|value| value.to_ascii_lowercase().contains("json"))
}

/// Path (query stripped) ends in `.json`.
pub fn is_json_path(path: &str) -> bool {
    path.split(['?', '#'])
        .next()
        .is_some_and(|path| path.ends_with(".json"))
}
