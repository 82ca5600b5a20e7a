//! URL query-string codec for the active-state list.
//!
//! The query has no key: `?screen:home,menu`. An absent query means "no
//! override"; a bare `?` is an explicit empty list.

/// Render full names as a query string, including the leading `?`.
///
/// ```rust
/// use clickthrough::history::to_query;
///
/// assert_eq!(to_query(["screen:login", "menu"]), "?screen:login,menu");
/// ```
pub fn to_query<'a>(states: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = states.into_iter().collect();
    format!("?{}", names.join(","))
}

/// Parse a location search string into full names.
///
/// Returns `None` when there is no query at all. A trailing slash, which some
/// static hosts append, is ignored.
///
/// ```rust
/// use clickthrough::history::parse_query;
///
/// assert_eq!(parse_query("?screen:home"), Some(vec!["screen:home".to_string()]));
/// assert_eq!(parse_query(""), None);
/// ```
pub fn parse_query(search: &str) -> Option<Vec<String>> {
    let search = search.trim();
    if search.is_empty() {
        return None;
    }
    let list = search.strip_prefix('?').unwrap_or(search);
    let list = list.strip_suffix('/').unwrap_or(list);
    Some(
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
