//! Quote- and comment-aware splitting of a single CIF line.
//!
//! CIF quoting is context-sensitive: a `'` or `"` opens or closes a quoted
//! region only when it is flanked by whitespace or a line boundary, which
//! permits apostrophes inside unquoted tokens (`O5'`, `don't`). That rule
//! cannot be expressed as a regular token grammar, so this is a plain
//! character scanner.

/// One token produced by [`split_fields`].
///
/// `quoted` records whether the token's characters came from inside a
/// quoted region. The state machine uses it to tell a quoted literal
/// `"loop_"` (a value) from the actual directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub text: String,
    pub quoted: bool,
}

impl Field {
    #[cfg(test)]
    fn new(text: &str, quoted: bool) -> Self {
        Field {
            text: text.to_string(),
            quoted,
        }
    }
}

fn is_ws(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Splits one line into whitespace-separated fields.
///
/// Rules:
/// - a run of non-whitespace characters is one token;
/// - `'` or `"` toggles quoting only when flanked by whitespace or a line
///   boundary, and only the matching character closes an open region;
/// - whitespace inside quotes is preserved, outside it separates tokens;
/// - a `#` outside quotes that begins a fresh token truncates the rest of
///   the line;
/// - an empty trailing token is discarded.
pub fn split_fields(line: &str) -> Vec<Field> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();

    let mut out: Vec<Field> = vec![Field {
        text: String::new(),
        quoted: false,
    }];
    let mut quote = false;
    let mut qtype = ' ';

    for i in 0..len {
        let c = chars[i];
        let ws = is_ws(c);
        let flanked = i == 0
            || is_ws(chars[i - 1])
            || i == len - 1
            || is_ws(chars[i + 1]);

        if (c == '\'' || c == '"') && flanked && (!quote || c == qtype) {
            quote = !quote;
            qtype = c;
        } else if !quote && ws && !out.last().unwrap().text.is_empty() {
            out.push(Field {
                text: String::new(),
                quoted: false,
            });
        } else if !quote && c == '#' && out.last().unwrap().text.is_empty() {
            break;
        } else if !ws || quote {
            let last = out.last_mut().unwrap();
            last.text.push(c);
            last.quoted = quote;
        }
    }

    if out.last().unwrap().text.is_empty() {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_bare_tokens() {
        assert_eq!(
            split_fields("  'foo bar' baz  "),
            vec![Field::new("foo bar", true), Field::new("baz", false)]
        );
    }

    #[test]
    fn comment_truncates_at_fresh_token() {
        assert_eq!(
            split_fields("abc #comment more"),
            vec![Field::new("abc", false)]
        );
    }

    #[test]
    fn hash_inside_token_is_kept() {
        // `#` only starts a comment when it begins a fresh token
        assert_eq!(
            split_fields("abc#comment"),
            vec![Field::new("abc#comment", false)]
        );
    }

    #[test]
    fn hash_inside_quotes_is_kept() {
        assert_eq!(
            split_fields("'a # b' c"),
            vec![Field::new("a # b", true), Field::new("c", false)]
        );
    }

    #[test]
    fn apostrophe_inside_bare_token() {
        assert_eq!(
            split_fields("O5' don't"),
            vec![Field::new("O5'", false), Field::new("don't", false)]
        );
    }

    #[test]
    fn mismatched_quote_does_not_close() {
        // A double quote cannot close a single-quoted region
        assert_eq!(
            split_fields("'a \" b' c"),
            vec![Field::new("a \" b", true), Field::new("c", false)]
        );
    }

    #[test]
    fn double_quoted_token() {
        assert_eq!(
            split_fields("\"another value\""),
            vec![Field::new("another value", true)]
        );
    }

    #[test]
    fn quoted_reserved_word_is_flagged() {
        let fields = split_fields("'loop_'");
        assert_eq!(fields, vec![Field::new("loop_", true)]);
    }

    #[test]
    fn blank_and_comment_only_lines() {
        assert!(split_fields("").is_empty());
        assert!(split_fields("   \t ").is_empty());
        assert!(split_fields("  # just a comment").is_empty());
    }

    #[test]
    fn tabs_separate_tokens() {
        assert_eq!(
            split_fields("a\tb"),
            vec![Field::new("a", false), Field::new("b", false)]
        );
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_line() {
        assert_eq!(split_fields("'a b c"), vec![Field::new("a b c", true)]);
    }
}
