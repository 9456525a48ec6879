/// Fills unresolved slots so a batch keeps one result per input entry.
///
/// Resolved slots are kept as-is. The k-th empty slot receives the
/// `k mod resolved.len()`-th resolved value, cycling through the resolved results in
/// order. Duplicates are accepted in exchange for a fixed-size output. When nothing
/// resolved at all, the empty slots stay empty; the length is always unchanged.
pub fn backfill<T: Clone>(results: Vec<Option<T>>) -> Vec<Option<T>> {
    let resolved: Vec<T> = results.iter().flatten().cloned().collect();
    if resolved.is_empty() {
        return results;
    }

    let mut gaps = 0;
    results
        .into_iter()
        .map(|slot| {
            slot.or_else(|| {
                let fill = resolved[gaps % resolved.len()].clone();
                gaps += 1;
                Some(fill)
            })
        })
        .collect()
}
