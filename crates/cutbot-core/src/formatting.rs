//! Formatting utilities for Telegram HTML replies.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// First `max_chars` characters of `s`, with `...` appended when cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    format!("{}...", s.chars().take(max_chars).collect::<String>())
}

/// Split a reply into chunks of at most `limit` bytes, breaking on line
/// boundaries. A single line longer than `limit` is cut on a char boundary.
/// Joining the chunks with `\n` restores any text without over-long lines,
/// blank lines included, so a chunk may be empty.
///
/// Replies built by this crate close inline tags on the line that opens them;
/// the only multi-line block (`<pre>`) stays far below the configured limit.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();
    // A chunk holding only blank lines is still a chunk.
    let mut open = false;

    for line in text.split('\n') {
        let mut line = line;
        loop {
            let sep = usize::from(open);
            if chunk.len() + sep + line.len() <= limit {
                if open {
                    chunk.push('\n');
                }
                chunk.push_str(line);
                open = true;
                break;
            }

            if open {
                out.push(std::mem::take(&mut chunk));
                open = false;
                continue;
            }

            // Line alone is too long.
            let (head, tail) = split_utf8_prefix(line, limit);
            out.push(head.to_string());
            line = tail;
            if line.is_empty() {
                break;
            }
        }
    }

    if open {
        out.push(chunk);
    }
    out
}

fn split_utf8_prefix(s: &str, max_bytes: usize) -> (&str, &str) {
    if s.len() <= max_bytes {
        return (s, "");
    }
    let mut idx = 0usize;
    for (i, _) in s.char_indices() {
        if i > max_bytes {
            break;
        }
        idx = i;
    }
    if idx == 0 {
        // First char is wider than the limit; emit it anyway to make progress.
        let next = s.char_indices().nth(1).map(|(i, _)| i).unwrap_or(s.len());
        return (&s[..next], &s[next..]);
    }
    (&s[..idx], &s[idx..])
}
