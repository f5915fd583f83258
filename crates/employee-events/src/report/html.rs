const STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@1/css/pico.min.css";
const HTMX: &str = "https://unpkg.com/htmx.org@1.9.12";

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
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

/// Wraps a rendered body in a standalone page.
pub fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="{STYLESHEET}">
<script src="{HTMX}"></script>
</head>
<body>
<main class="container">
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}
