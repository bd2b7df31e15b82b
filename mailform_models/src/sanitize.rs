//! Neutralizes markup before user input reaches an html email body.

/// Replaces every markup-significant character with its html entity.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cuts `input` down to at most `max_chars` characters and drops trailing
/// whitespace. Returns `None` if nothing had to be removed.
pub fn truncate(input: &str, max_chars: usize) -> Option<&str> {
    let (end, _) = input.char_indices().nth(max_chars)?;
    Some(input[..end].trim_end())
}
