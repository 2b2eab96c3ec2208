const MAX_VISIBLE_CHARS: usize = 80;

const SECRET_MARKERS: [&str; 6] = [
    "Bearer ",
    "password=",
    "token=",
    "sk_live_",
    "sk_test_",
    "whsec_",
];

/// Shortens free text from customers and masks anything that looks like a
/// credential before it reaches the logs.
pub fn redact_for_log(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total = trimmed.chars().count();
    let visible: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
    let shortened = if total > MAX_VISIBLE_CHARS {
        format!("{}... ({} chars total)", visible, total)
    } else {
        visible
    };

    SECRET_MARKERS
        .iter()
        .fold(shortened, |acc, marker| mask_after(&acc, marker))
}

fn mask_after(text: &str, marker: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(marker) {
        let value_start = idx + marker.len();
        let value_end = rest[value_start..]
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\'' | ','))
            .map(|i| value_start + i)
            .unwrap_or(rest.len());

        result.push_str(&rest[..value_start]);
        result.push_str("[REDACTED]");
        rest = &rest[value_end..];
    }

    result.push_str(rest);
    result
}
