//! Edit-distance string similarity for the fuzzy matching tier

/// Normalization applied before fuzzy comparison
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Standard dynamic-programming edit distance (insert/delete/substitute, cost 1)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row DP: prev[j] is the distance between a[..i] and b[..j]
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut corner = prev[0];
        prev[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let next = (corner + cost).min(prev[j + 1] + 1).min(prev[j] + 1);
            corner = prev[j + 1];
            prev[j + 1] = next;
        }
    }
    prev[b.len()]
}

/// Normalized similarity: `round(100 * (max_len - distance) / max_len)`.
/// Two empty strings are identical (100).
pub fn similarity_pct(a: &str, b: &str) -> u8 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let dist = levenshtein(a, b);
    let pct = 100.0 * (max_len - dist) as f64 / max_len as f64;
    pct.round() as u8
}
