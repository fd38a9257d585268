use std::borrow::Cow;

/// Records that take part in the free-text filter.
///
/// `search_fields` projects the designated searchable fields (names,
/// documents, emails, status labels, formatted dates). A record matches a
/// term when any projected field contains it, ignoring case.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// `term` must already be lower-cased; an empty term matches everything.
    fn matches(&self, term: &str) -> bool {
        term.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(term))
    }
}

/// Lower-cases and trims a user-typed search term. Whitespace-only input
/// normalizes to the empty string (no filter).
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}
