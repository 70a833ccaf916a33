/// Insertion/deletion edit distance (Levenshtein with substitution cost 2),
/// using the two-row O(min(m,n)) space algorithm over chars.
pub fn indel_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Keep the shorter string in the outer loop.
    let (a, b, m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 2 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Similarity in [0, 100] derived from the indel distance, normalised by the
/// combined length. Two empty strings are identical.
pub fn ratio(s1: &str, s2: &str) -> u8 {
    let total = s1.chars().count() + s2.chars().count();
    if total == 0 {
        return 100;
    }
    let similarity = 1.0 - indel_distance(s1, s2) as f64 / total as f64;
    (similarity * 100.0).round() as u8
}

/// Lowercases, replaces every non-alphanumeric char with a space and trims.
pub fn preprocess(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}
