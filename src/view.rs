const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

pub fn render_index(prediction_text: Option<&str>) -> String {
    INDEX_TEMPLATE.replace(
        "{{prediction_text}}",
        &escape_html(prediction_text.unwrap_or_default()),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
