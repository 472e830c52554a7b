pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for char in text.chars() {
        match char {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// Keeps the first `visible` characters of a secret for log output.
pub(crate) fn mask_secret(secret: &str, visible: usize) -> String {
    let prefix: String = secret.chars().take(visible).collect();

    format!("{}...", prefix)
}
