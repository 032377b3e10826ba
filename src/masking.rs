use crate::json_masking;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const NUM: &str = "<NUM>";
pub const IP: &str = "<IP>";

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").unwrap()
});

// Bracketed timestamps keep their brackets so `[TIMESTAMP]` stays distinguishable
// from an inline one.
static RE_TS_BRACKET_ISO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?\]").unwrap()
});

static RE_TS_BRACKET_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)?\]").unwrap()
});

static RE_TS_ISO: Lazy<Regex> = Lazy::new(|| {
    // 2025-03-05T10:57:14.135052+00:00, 2025-03-05T10:57:14Z, 2025-03-05T10:57:14
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?").unwrap()
});

static RE_TS_CLF: Lazy<Regex> = Lazy::new(|| {
    // Apache/nginx access logs: 05/Mar/2025:10:57:14 +0000
    Regex::new(r"\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4}").unwrap()
});

static RE_TS_SYSLOG: Lazy<Regex> = Lazy::new(|| {
    // Mar  5 10:57:14
    Regex::new(r"\b[A-Z][a-z]{2} +\d{1,2} \d{2}:\d{2}:\d{2}").unwrap()
});

static RE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

static RE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}(?:\.\d+)?").unwrap());

static RE_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b").unwrap()
});

static RE_HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9a-fA-F]{16,}\b").unwrap());

static RE_PID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

// File path + line number shapes. Only the number is masked; the path is part of
// the pattern's identity.
static RE_PATH_ON_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(in\s+)(/[^\s:]+)(\s+on\s+line\s+)\d+").unwrap()
});

static RE_PATH_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(at\s+)(/[^\s:]+):\d+").unwrap());

static RE_PATH_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\s)(/[^\s:]+):\d+(\s|$)").unwrap()
});

static RE_TRACE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bline:? \d+").unwrap());

static RE_TRACE_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d+\)").unwrap());

static RE_HTTP_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS) (\S+) HTTP/\d+\.\d+").unwrap()
});

static RE_QUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\?[^"'<>\s]+"#).unwrap());

static RE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Rewrites a raw log message into its canonical form.
///
/// Rules run in a fixed order: embedded JSON first, then addresses, timestamps,
/// identifiers, path/line shapes, HTTP request lines, query strings and finally
/// any standalone number. The function is total and idempotent on its own output.
pub fn mask_text(input: &str) -> String {
    let s = json_masking::mask_embedded_json(input);
    let s = RE_IPV4.replace_all(&s, IP);
    let s = mask_timestamps(&s);
    let s = RE_UUID.replace_all(&s, "UUID");
    let s = RE_HEX.replace_all(&s, "HEX");
    let s = RE_PID.replace_all(&s, "[PID]");
    // Path shapes must see the raw line numbers before the trace rules do.
    let s = mask_path_line_numbers(&s);
    let s = RE_TRACE_LINE.replace_all(&s, "line: <NUM>");
    let s = RE_TRACE_PAREN.replace_all(&s, ":<NUM>)");
    let s = RE_HTTP_REQUEST.replace_all(&s, mask_http_request);
    let s = RE_QUERY.replace_all(&s, "?PARAMS");
    mask_standalone_numbers(&s)
}

fn mask_timestamps(input: &str) -> String {
    let s = RE_TS_BRACKET_ISO.replace_all(input, "[TIMESTAMP]");
    let s = RE_TS_BRACKET_SPACE.replace_all(&s, "[TIMESTAMP]");
    let s = RE_TS_ISO.replace_all(&s, "TIMESTAMP");
    let s = RE_TS_CLF.replace_all(&s, "TIMESTAMP");
    let s = RE_TS_SYSLOG.replace_all(&s, "TIMESTAMP");
    let s = RE_DATE.replace_all(&s, "DATE");
    RE_TIME.replace_all(&s, "TIME").into_owned()
}

fn mask_path_line_numbers(input: &str) -> String {
    let s = RE_PATH_ON_LINE.replace_all(input, "${1}${2}${3}<NUM>");
    let s = RE_PATH_AT.replace_all(&s, "${1}${2}:<NUM>");
    RE_PATH_COLON.replace_all(&s, "${1}${2}:<NUM>${3}").into_owned()
}

fn mask_http_request(caps: &Captures) -> String {
    let verb = &caps[1];
    let target = &caps[2];
    match target.split_once('?') {
        Some((path, _)) => format!("{verb} {path}?PARAMS HTTP/<NUM>.<NUM>"),
        None => format!("{verb} {target} HTTP/<NUM>.<NUM>"),
    }
}

fn is_number_neighbour(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '/' | '-' | '.')
}

/// Masks integers and decimals that are not glued to a word, path, version or
/// another number. `abc123`, `/v2/`, `1.2.3` and `-5` stay literal.
fn mask_standalone_numbers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for m in RE_NUMBER.find_iter(input) {
        let before = input[..m.start()].chars().next_back();
        let after = input[m.end()..].chars().next();
        if before.is_some_and(is_number_neighbour) || after.is_some_and(is_number_neighbour) {
            continue;
        }
        out.push_str(&input[last..m.start()]);
        out.push_str(NUM);
        last = m.end();
    }
    out.push_str(&input[last..]);
    out
}
