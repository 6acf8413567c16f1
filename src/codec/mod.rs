//! URL query-string codec for filter/sort/page state.
//!
//! Sole owner of the `q` / `categoryId` / `sortBy` / `page` URL contract.
//! Parsing is total: malformed state always resolves to defaults so a bad or
//! shared link degrades gracefully instead of erroring.

use url::form_urlencoded;

use crate::models::{FilterDescriptor, SortOption};

/// Query keys owned by this codec.
const KEY_QUERY: &str = "q";
const KEY_CATEGORY: &str = "categoryId";
const KEY_SORT: &str = "sortBy";
const KEY_PAGE: &str = "page";

/// Default value of the forward-compat `sortDir` key (not produced here, but
/// recognized by [`active_filter_count`]).
const DEFAULT_SORT_DIR: &str = "desc";

/// Parse a query string into a validated filter descriptor.
///
/// Never fails: unknown `sortBy` values fall back to newest, non-positive or
/// non-numeric `page` values fall back to 1, absent text fields become
/// empty/None. Accepts an optional leading `?`. When a key repeats, the last
/// occurrence wins.
pub fn parse(query: &str) -> FilterDescriptor {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut descriptor = FilterDescriptor::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            KEY_QUERY => descriptor.search_query = value.into_owned(),
            KEY_CATEGORY => {
                descriptor.category_id = if value.is_empty() {
                    None
                } else {
                    Some(value.into_owned())
                };
            }
            KEY_SORT => {
                descriptor.sort = SortOption::from_str(&value).unwrap_or_default();
            }
            KEY_PAGE => {
                descriptor.page = match value.parse::<u32>() {
                    Ok(p) if p >= 1 => p,
                    _ => 1,
                };
            }
            _ => {}
        }
    }

    descriptor
}

/// Serialize a descriptor back into a query string, merged over `existing`.
///
/// Keys not owned by the codec are preserved in their original order
/// (forward-compatibility with other page state). Owned keys at their default
/// value are removed so the URL stays canonical and minimal. Changing any of
/// `q`/`categoryId`/`sortBy` relative to `existing` clears `page`: filter
/// changes invalidate position.
pub fn serialize(descriptor: &FilterDescriptor, existing: &str) -> String {
    let previous = parse(existing);

    // A filter change makes any carried page number stale.
    let page = if descriptor.filters_changed(&previous) {
        1
    } else {
        descriptor.page
    };

    let owned_value = |key: &str| -> Option<String> {
        match key {
            KEY_QUERY if !descriptor.search_query.is_empty() => {
                Some(descriptor.search_query.clone())
            }
            KEY_CATEGORY => descriptor.category_id.clone(),
            KEY_SORT if descriptor.sort != SortOption::default() => {
                Some(descriptor.sort.as_str().to_string())
            }
            KEY_PAGE if page > 1 => Some(page.to_string()),
            _ => None,
        }
    };

    let existing = existing.strip_prefix('?').unwrap_or(existing);
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut emitted: Vec<&str> = Vec::new();

    for (key, value) in form_urlencoded::parse(existing.as_bytes()) {
        if is_owned_key(&key) {
            // Replace in place, once; drop keys back at their default.
            if emitted.contains(&key.as_ref()) {
                continue;
            }
            if let Some(new_value) = owned_value(&key) {
                serializer.append_pair(&key, &new_value);
            }
            emitted.push(match key.as_ref() {
                KEY_QUERY => KEY_QUERY,
                KEY_CATEGORY => KEY_CATEGORY,
                KEY_SORT => KEY_SORT,
                _ => KEY_PAGE,
            });
        } else {
            serializer.append_pair(&key, &value);
        }
    }

    for key in [KEY_QUERY, KEY_CATEGORY, KEY_SORT, KEY_PAGE] {
        if !emitted.contains(&key) {
            if let Some(value) = owned_value(key) {
                serializer.append_pair(key, &value);
            }
        }
    }

    serializer.finish()
}

/// Count the active (non-default) filters in a query string.
///
/// Pure function of the query; used as a UI affordance (filter badge count).
pub fn active_filter_count(query: &str) -> usize {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut count = 0;

    let descriptor = parse(query);
    if !descriptor.search_query.is_empty() {
        count += 1;
    }
    if descriptor.category_id.is_some() {
        count += 1;
    }
    if descriptor.sort != SortOption::default() {
        count += 1;
    }

    // Forward-compat: a sortDir key some surfaces still emit.
    let sort_dir_active = form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == "sortDir")
        .last()
        .map(|(_, v)| !v.is_empty() && !v.eq_ignore_ascii_case(DEFAULT_SORT_DIR))
        .unwrap_or(false);
    if sort_dir_active {
        count += 1;
    }

    count
}

fn is_owned_key(key: &str) -> bool {
    matches!(key, KEY_QUERY | KEY_CATEGORY | KEY_SORT | KEY_PAGE)
}
