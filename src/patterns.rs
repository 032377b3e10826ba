use once_cell::sync::Lazy;
use regex::Regex;

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>\s]+>").unwrap());

static RE_TIME_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<NUM>:<NUM>:<NUM>(?:\.<NUM>)?").unwrap());

static RE_DATE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<NUM>-<NUM>-<NUM>").unwrap());

static RE_BRACKETED_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[<DATE>T<TIME>[+-]<NUM>:<NUM>\]").unwrap());

static RE_BRACKETED_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[<DATE> <TIME>\]").unwrap());

/// Cosmetic cleanup of a cluster template for reports.
///
/// Numeric runs fold into `<TIME>`, `<DATE>` and `[<TIMESTAMP>]`, then repeated
/// adjacent placeholders collapse into one. Folding goes first so the space inside
/// `[<DATE> <TIME>]` is never mistaken for a repeat. Passes repeat until nothing
/// changes, so `postprocess_template(postprocess_template(t))` equals
/// `postprocess_template(t)`.
pub fn postprocess_template(template: &str) -> String {
    let mut current = template.to_string();
    loop {
        let next = collapse_repeated_placeholders(&fold_placeholders(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

fn fold_placeholders(template: &str) -> String {
    let s = RE_TIME_RUN.replace_all(template, "<TIME>");
    let s = RE_DATE_RUN.replace_all(&s, "<DATE>");
    let s = RE_BRACKETED_ISO.replace_all(&s, "[<TIMESTAMP>]");
    RE_BRACKETED_SPACE.replace_all(&s, "[<TIMESTAMP>]").into_owned()
}

/// `<NUM> <NUM>  <NUM>` -> `<NUM>`; only whitespace may separate the repeats.
fn collapse_repeated_placeholders(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    let mut previous: Option<(&str, usize)> = None;
    for m in RE_PLACEHOLDER.find_iter(template) {
        if let Some((prev, prev_end)) = previous {
            let gap = &template[prev_end..m.start()];
            if prev == m.as_str() && gap.chars().all(char::is_whitespace) {
                copied = m.end();
                previous = Some((prev, m.end()));
                continue;
            }
        }
        out.push_str(&template[copied..m.end()]);
        copied = m.end();
        previous = Some((m.as_str(), m.end()));
    }
    out.push_str(&template[copied..]);
    out
}
