//! Recover message text from `attributedBody` blobs in Messages.db.
//!
//! On macOS Ventura and later the `text` column is frequently NULL and the
//! body only lives in `attributedBody`, usually as a typedstream archive
//! (`streamtyped` header), occasionally as an NSKeyedArchiver bplist.
//!
//! CHANGELOG:
//! - 10/18/2026 - Length-prefixed typedstream strings (CJK safe)
//! - 10/18/2026 - Initial blob parsing

use plist::Value;

/// Extract the message body from an attributedBody blob.
///
/// Tries the typedstream string first, then a bplist, then a plain scan for
/// printable text. Returns `None` when nothing usable is found.
pub fn extract_text_from_blob(blob: &[u8]) -> Option<String> {
    if blob.is_empty() {
        return None;
    }

    if let Some(text) = parse_streamtyped(blob) {
        return Some(text);
    }

    if let Some(start) = find_subsequence(blob, b"bplist") {
        if let Some(text) = parse_bplist(&blob[start..]) {
            return Some(text);
        }
    }

    extract_printable_text(blob)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Typedstream layout after the class marker:
/// `... NSString <class bytes> '+' <len> <utf8 bytes>`
///
/// `<len>` is one byte below 0x81, or 0x81 followed by a little-endian u16,
/// or 0x82 followed by a little-endian u32.
fn parse_streamtyped(blob: &[u8]) -> Option<String> {
    let marker = find_subsequence(blob, b"NSString")
        .map(|idx| idx + b"NSString".len())
        .or_else(|| find_subsequence(blob, b"NSMutableString").map(|idx| idx + b"NSMutableString".len()))?;

    let rest = &blob[marker..];
    let plus = rest.iter().take(20).position(|&b| b == b'+')?;
    let (len, body) = read_length(&rest[plus + 1..])?;

    let bytes = if len <= body.len() {
        &body[..len]
    } else {
        // Truncated blob: take what is there up to the first terminator.
        let end = body
            .iter()
            .position(|&b| b == 0x86 || b == 0x00)
            .unwrap_or(body.len());
        &body[..end]
    };

    decode_text(bytes)
}

fn read_length(bytes: &[u8]) -> Option<(usize, &[u8])> {
    let (&first, rest) = bytes.split_first()?;
    match first {
        0x81 if rest.len() >= 2 => {
            let len = u16::from_le_bytes([rest[0], rest[1]]) as usize;
            Some((len, &rest[2..]))
        }
        0x82 if rest.len() >= 4 => {
            let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
            Some((len, &rest[4..]))
        }
        0x81 | 0x82 => None,
        n => Some((n as usize, rest)),
    }
}

fn decode_text(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// NSKeyedArchiver keeps values in the `$objects` array; the body is the
/// first string that is not a class name or archiver metadata.
fn parse_bplist(blob: &[u8]) -> Option<String> {
    let plist: Value = plist::from_bytes(blob).ok()?;
    let objects = plist
        .as_dictionary()?
        .get("$objects")?
        .as_array()?;

    objects.iter().find_map(|obj| match obj {
        Value::String(s) if !s.starts_with("NS") && !s.starts_with('$') => decode_text(s.as_bytes()),
        Value::Dictionary(d) => match d.get("NS.string") {
            Some(Value::String(s)) => decode_text(s.as_bytes()),
            _ => match d.get("NS.bytes") {
                Some(Value::Data(data)) => decode_text(data),
                _ => None,
            },
        },
        _ => None,
    })
}

/// Last resort: the longest run of printable characters that is not archive
/// metadata. Keeps non-ASCII characters so CJK bodies survive.
fn extract_printable_text(blob: &[u8]) -> Option<String> {
    const METADATA: [&str; 8] = [
        "NSString",
        "NSObject",
        "NSMutable",
        "NSDictionary",
        "NSAttributed",
        "streamtyped",
        "__kIM",
        "NSNumber",
    ];

    let text = String::from_utf8_lossy(blob);
    text.split(|c: char| c.is_control() || c == char::REPLACEMENT_CHARACTER)
        .map(|run| run.trim_matches('+').trim())
        .filter(|run| run.chars().count() >= 2)
        .filter(|run| !METADATA.iter().any(|m| run.contains(m)))
        .max_by_key(|run| run.chars().count())
        .map(str::to_string)
}
