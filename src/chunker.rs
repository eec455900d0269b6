//! Splitting long replies into platform-safe message chunks.

/// Discord caps a message at 2000 characters; stay under it.
pub const MAX_CHUNK_LEN: usize = 1900;

/// Split `text` into sendable chunks of at most `max_len` bytes.
///
/// The text is split on `.`, with the consumed `.` reattached to every
/// fragment except the last so that concatenating the fragments reproduces
/// the input. Fragments are packed greedily; each flushed chunk is trimmed of
/// surrounding whitespace. A single fragment longer than `max_len` is split
/// at char boundaries so no chunk ever exceeds the limit.
pub fn split_chunks(text: &str, max_len: usize) -> Vec<String> {
    let parts: Vec<&str> = text.split('.').collect();
    let last = parts.len() - 1;

    let mut chunks = Vec::new();
    let mut current = String::new();

    for (i, part) in parts.iter().enumerate() {
        let mut fragment = (*part).to_string();
        if i < last {
            fragment.push('.');
        }
        if fragment.is_empty() {
            continue;
        }

        if current.len() + fragment.len() > max_len {
            flush(&mut chunks, &mut current);
        }

        if fragment.len() > max_len {
            hard_split(&fragment, max_len, &mut chunks, &mut current);
        } else {
            current.push_str(&fragment);
        }
    }

    flush(&mut chunks, &mut current);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Split one oversized fragment at char boundaries; the final piece becomes
/// the new working chunk so following fragments can still pack onto it.
fn hard_split(fragment: &str, max_len: usize, chunks: &mut Vec<String>, current: &mut String) {
    let mut rest = fragment;
    while rest.len() > max_len {
        let mut split_at = max_len;
        while !rest.is_char_boundary(split_at) {
            split_at -= 1;
        }
        let (head, tail) = rest.split_at(split_at);
        chunks.push(head.trim().to_string());
        rest = tail;
    }
    current.push_str(rest);
}
