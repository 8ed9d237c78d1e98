use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Statistical best guess for the whole buffer.
pub(crate) fn guess_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Pick the encoding to read the file with.
///
/// A byte-order mark wins outright. Otherwise the first line is decoded
/// strictly with the guess (or `assumed`, when the caller knows better), then
/// with each fallback in order; the first that decodes cleanly is used.
/// Returns the encoding and the number of BOM bytes to skip, or `None` when no
/// candidate can decode the first line.
pub(crate) fn detect_encoding(
    bytes: &[u8],
    assumed: Option<&'static Encoding>,
    fallbacks: &[&'static Encoding],
) -> Option<(&'static Encoding, usize)> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return Some((encoding, bom_len));
    }

    let guess = assumed.unwrap_or_else(|| guess_encoding(bytes));
    let line = first_line_bytes(bytes);

    std::iter::once(guess)
        .chain(fallbacks.iter().copied())
        .find(|encoding| {
            encoding
                .decode_without_bom_handling_and_without_replacement(line)
                .is_some()
        })
        .map(|encoding| (encoding, 0))
}

/// First candidate that appears in the header line, or a comma.
pub(crate) fn detect_delimiter(first_line: &str, candidates: &[u8]) -> u8 {
    candidates
        .iter()
        .copied()
        .find(|&c| first_line.contains(char::from(c)))
        .unwrap_or(b',')
}

pub(crate) fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn first_line_bytes(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(bytes.len());
    let line = &bytes[..end];
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
