/// Word boundaries earlier than this share of the target fall back to a hard cut
const MIN_BOUNDARY_RATIO: f64 = 0.7;

/// Adjust `passage` to at most `target` characters.
///
/// Short passages are repeated (joined by a single space) until they reach the
/// target; long ones are cut at the last word boundary at or before the target.
/// The result never carries trailing whitespace.
pub fn fit_to_length(passage: &str, target: usize) -> String {
    let base = passage.trim();
    if base.is_empty() || target == 0 {
        return String::new();
    }

    let base_len = base.chars().count();
    let mut text = base.to_string();
    let mut len = base_len;
    while len < target {
        text.push(' ');
        text.push_str(base);
        len += base_len + 1;
    }

    truncate_at_boundary(&text, target)
}

fn truncate_at_boundary(text: &str, target: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= target {
        return text.trim_end().to_string();
    }

    let floor = (target as f64 * MIN_BOUNDARY_RATIO).ceil() as usize;
    let cut = (floor..=target)
        .rev()
        .find(|&i| chars[i].is_whitespace())
        .unwrap_or(target);

    chars[..cut]
        .iter()
        .collect::<String>()
        .trim_end()
        .to_string()
}
