//! Pure arithmetic behind the live and final metrics.

/// Characters per standardized word
const CHARS_PER_WORD: f64 = 5.0;

/// Whitespace-delimited, non-empty tokens
pub fn word_count(input: &[char]) -> usize {
    input
        .split(|c| c.is_whitespace())
        .filter(|word| !word.is_empty())
        .count()
}

/// Positions within the overlap where the input differs from the reference
pub fn mismatches(input: &[char], reference: &[char]) -> usize {
    input
        .iter()
        .zip(reference)
        .filter(|(typed, expected)| typed != expected)
        .count()
}

/// `count` per elapsed minute, or `None` before any time has passed
pub fn per_minute(count: f64, elapsed_secs: f64) -> Option<f64> {
    if elapsed_secs > 0.0 {
        Some(count / (elapsed_secs / 60.0))
    } else {
        None
    }
}

/// Live raw speed from whitespace tokens
pub fn token_wpm(words: usize, elapsed_secs: f64) -> u32 {
    per_minute(words as f64, elapsed_secs).map_or(0, |wpm| wpm.round() as u32)
}

/// Speed from the characters/5 word estimate, never counting fewer than one word
pub fn char_wpm(chars: usize, elapsed_secs: f64) -> u32 {
    let words = (chars as f64 / CHARS_PER_WORD).round().max(1.0);
    per_minute(words, elapsed_secs).map_or(0, |wpm| wpm.round() as u32)
}

/// Share of typed characters that are correct; empty input counts as perfect
pub fn accuracy(typed: usize, errors: usize) -> u32 {
    if typed == 0 {
        return 100;
    }
    let pct = (typed as f64 - errors as f64) / typed as f64 * 100.0;
    pct.round().max(0.0) as u32
}

/// Live net speed: every error costs one word per minute
pub fn subtractive_net_wpm(raw_wpm: u32, errors: usize, elapsed_secs: f64) -> u32 {
    per_minute(errors as f64, elapsed_secs).map_or(0, |error_rate| {
        (raw_wpm as f64 - error_rate).max(0.0).round() as u32
    })
}

/// Final net speed: raw speed scaled by accuracy
pub fn scaled_net_wpm(raw_wpm: u32, accuracy: u32) -> u32 {
    (raw_wpm as f64 * accuracy as f64 / 100.0).round() as u32
}
