/// Characters that are treated as word separators when comparing titles
const SEPARATORS: &[char] = &[':', '\'', '"', '(', ')', '[', ']', '-'];

/// Canonicalizes a title for comparison.
///
/// Lower-cases, turns separator punctuation into spaces, collapses whitespace runs
/// and trims both ends.
pub fn normalize(s: &str) -> String {
    let replaced: String = s
        .to_lowercase()
        .chars()
        .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
