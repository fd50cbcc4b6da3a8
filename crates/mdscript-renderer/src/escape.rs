//! JavaScript string literal escaping.

use std::fmt::Write;

/// Quote a string as a single-quoted JavaScript literal.
///
/// Escapes backslashes, quotes, line terminators (including U+2028/U+2029),
/// `</` and `<!` so the literal can be embedded in a `<script>` element.
///
/// # Examples
///
/// ```
/// use mdscript_renderer::js_string;
///
/// assert_eq!(js_string("it's"), r"'it\'s'");
/// assert_eq!(js_string("a\nb"), r"'a\nb'");
/// ```
#[must_use]
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '/' if prev == '<' => out.push_str("\\/"),
            '!' if prev == '<' => out.push_str("\\!"),
            c if c.is_control() => {
                for unit in c.encode_utf16(&mut [0; 2]) {
                    write!(out, "\\u{unit:04x}").unwrap();
                }
            }
            c => out.push(c),
        }
        prev = c;
    }
    out.push('\'');
    out
}

/// Make text safe for a single-line `//` comment.
pub(crate) fn comment_text(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(js_string("hello world"), "'hello world'");
        assert_eq!(js_string(""), "''");
    }

    #[test]
    fn test_quotes_and_backslashes() {
        assert_eq!(js_string(r#"a'b"c\d"#), r#"'a\'b"c\\d'"#);
    }

    #[test]
    fn test_template_syntax_is_inert() {
        assert_eq!(js_string("`${x}`"), "'`${x}`'");
    }

    #[test]
    fn test_line_terminators() {
        assert_eq!(js_string("a\r\nb\tc"), r"'a\r\nb\tc'");
        assert_eq!(js_string("x\u{2028}y\u{2029}"), r"'x\u2028y\u2029'");
    }

    #[test]
    fn test_script_close_tag() {
        assert_eq!(js_string("</script>"), r"'<\/script>'");
        assert_eq!(js_string("a/b"), "'a/b'");
    }

    #[test]
    fn test_html_comment_open() {
        assert_eq!(js_string("<!--<script>"), r"'<\!--<script>'");
        assert_eq!(js_string("hi!"), "'hi!'");
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(js_string("\u{0}\u{7}"), r"'\u0000\u0007'");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_eq!(js_string("日本語 ✓"), "'日本語 ✓'");
    }

    #[test]
    fn test_comment_text() {
        assert_eq!(comment_text("a\nb\r\nc"), "a b  c");
    }
}
