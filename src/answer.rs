/// Maps a single letter A-D (any case, surrounding whitespace ignored) to 0-3.
pub fn letter_index(s: &str) -> Option<usize> {
    let mut chars = s.trim().chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c.to_ascii_uppercase() {
        c @ 'A'..='D' => Some(c as usize - 'A' as usize),
        _ => None,
    }
}

/// Resolves a stored answer to a zero-based option index.
///
/// A bare run of digits is taken as the index itself; otherwise a single
/// letter A-D is accepted. Anything else means no usable answer is set.
pub fn normalize_answer(stored: &str) -> Option<usize> {
    if !stored.is_empty() && stored.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(idx) = stored.parse::<usize>() {
            return Some(idx);
        }
    }
    letter_index(stored)
}

/// Option label shown next to an index: 0 -> A, 1 -> B, ...
pub fn option_label(idx: usize) -> char {
    u8::try_from(idx)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(|b| b.is_ascii_uppercase())
        .map(char::from)
        .unwrap_or('?')
}
