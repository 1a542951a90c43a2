//! Search helpers shared by the registries.
//!
//! The registries standardize on store-backed search: results come from a
//! fresh query, which stays authoritative when the store is mutated behind
//! the cache's back. [`filter`] is the cache-local variant, kept public for
//! consumers narrowing an already-rendered snapshot without a round-trip.

/// Case-insensitive substring filter over a snapshot.
///
/// Returns entries where any extracted field contains `term`. An empty term
/// matches everything.
pub fn filter<T: Clone>(snapshot: &[T], term: &str, fields: &[fn(&T) -> &str]) -> Vec<T> {
    if term.is_empty() {
        return snapshot.to_vec();
    }
    let term = term.to_lowercase();
    snapshot
        .iter()
        .filter(|entry| {
            fields
                .iter()
                .any(|field| field(entry).to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Build the parameter for a case-insensitive substring `LIKE` query.
///
/// `%`, `_` and the escape character itself are escaped; queries using the
/// pattern must append `ESCAPE '\'` and compare against a `LOWER(...)`
/// column.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
