//! JSON adapter.
//!
//! String escaping intentionally does *not* follow RFC 8259: backslash is
//! doubled and CR/LF/BS are replaced with `_`; no other character (including a
//! literal quote) is escaped. This matches the reference C implementation's
//! `output_json` escaper exactly rather than reaching for a general-purpose
//! escaper, since §6 pins this behavior down as part of the external contract.

use crate::config::OwnerMode;
use crate::coordinator::RunOutcome;

use super::owner_keyed_pairs;

pub fn render(outcome: &RunOutcome, owner_mode: OwnerMode, resolve_names: bool) -> String {
    let Some(tree) = &outcome.tree else {
        return render_failure(&outcome.errors);
    };

    let mut out = String::from("{\"errors\":[");
    push_error_list(&mut out, &outcome.errors);
    out.push_str("],\"subdirs\":{");

    for (i, sub) in tree.subdirs.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_quoted(&mut out, &sub.path);
        out.push(':');
        push_pairs_object(&mut out, sub, owner_mode, resolve_names);
    }

    out.push_str("},\"summary\":");
    push_pairs_object(&mut out, &tree.summary, owner_mode, resolve_names);
    out.push_str(",\"total\":");
    out.push_str(&tree.total().to_string());
    out.push('}');
    out
}

fn render_failure(errors: &[String]) -> String {
    let mut out = String::from("{\"failure\":true,\"errors\":[");
    push_error_list(&mut out, errors);
    out.push_str("]}");
    out
}

fn push_error_list(out: &mut String, errors: &[String]) {
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_quoted(out, e);
    }
}

fn push_pairs_object(out: &mut String, entry: &crate::result_tree::ResultEntry, owner_mode: OwnerMode, resolve_names: bool) {
    out.push('{');
    for (i, (key, bytes)) in owner_keyed_pairs(entry, owner_mode, resolve_names).into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_quoted(out, &key);
        out.push(':');
        out.push_str(&bytes.to_string());
    }
    out.push('}');
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape(s));
    out.push('"');
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\r' | '\n' | '\u{8}' => escaped.push('_'),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_doubles_backslashes() {
        assert_eq!(escape(r"a\b"), r"a\\b");
    }

    #[test]
    fn escape_replaces_control_characters_with_underscore() {
        assert_eq!(escape("a\r\nb\u{8}c"), "a__b_c");
    }

    #[test]
    fn escape_leaves_quotes_untouched() {
        assert_eq!(escape("a\"b"), "a\"b");
    }

    #[test]
    fn failure_shape_has_failure_true() {
        let rendered = render_failure(&["/x: boom".to_string()]);
        assert!(rendered.contains("\"failure\":true"));
        assert!(rendered.contains("/x: boom"));
    }
}
