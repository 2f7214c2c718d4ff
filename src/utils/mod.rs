//! Helpers for writing Python source text.

use std::sync::OnceLock;

use regex::Regex;

/// Python spelling of a boolean.
pub fn py_bool(v: bool) -> &'static str {
    if v { "True" } else { "False" }
}

/// Python `repr` of a float: `8.0`, not `8`.
pub fn py_float(v: f64) -> String {
    format!("{:?}", v)
}

/// Body of a single-quoted Python string literal.
pub fn py_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Python list literal of integers, `[0, 2, 3]`.
pub fn py_int_list(values: &[usize]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Python list literal of strings, `['a', 'b']`.
pub fn py_str_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("'{}'", py_quote(v))).collect();
    format!("[{}]", items.join(", "))
}

/// Turn a column label into a usable Python identifier.
pub fn sanitize_identifier(name: &str) -> String {
    static NON_IDENT: OnceLock<Regex> = OnceLock::new();
    let re = NON_IDENT.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]").expect("static pattern"));
    re.replace_all(name, "_").into_owned()
}

/// Undo the escaping a single-line form field applies to multi-line code.
/// Only kicks in when a literal `\n` is present.
pub fn decode_escapes(code: &str) -> String {
    if !code.contains("\\n") {
        return code.to_string();
    }
    code.replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\r", "\r")
        .replace("\\'", "'")
        .replace("\\\"", "\"")
}
