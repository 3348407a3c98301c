//! Shell wildcard patterns for module names
//!
//! Semantics follow `fnmatch(3)` without flags: `*` and `?` also match `/` and a
//! leading `.`, brackets support ranges, `!`/`^` negation and `[:class:]` names,
//! and a backslash quotes the next character. An unterminated `[` is literal.
use crate::error::ModinfoError;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self, ModinfoError> {
        let invalid = |reason: String| ModinfoError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        let translated = translate(pattern).map_err(invalid)?;
        let regex = Regex::new(&translated).map_err(|e| invalid(e.to_string()))?;
        Ok(GlobPattern { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

const CLASSES: [&str; 12] = [
    "alnum", "alpha", "blank", "cntrl", "digit", "graph", "lower", "print", "punct", "space",
    "upper", "xdigit",
];

fn translate(pattern: &str) -> Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^(?s:");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                push_literal(&mut out, chars[i]);
            }
            '[' => {
                if let Some((class, next)) = bracket(&chars, i)? {
                    out.push_str(&class);
                    i = next;
                    continue;
                }
                push_literal(&mut out, '[');
            }
            c => push_literal(&mut out, c),
        }
        i += 1;
    }

    out.push_str(")$");
    Ok(out)
}

/// Translate the bracket expression opening at `start`. Returns the regex
/// and the index just past the closing `]`, or None when it is never closed.
/// A reversed range such as `z-a` contributes no members.
fn bracket(chars: &[char], start: usize) -> Result<Option<(String, usize)>, String> {
    let mut i = start + 1;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }
    let first = i;
    let mut members = String::new();

    while i < chars.len() {
        let c = chars[i];
        // A `]` right after the opening (or the negation) is a member.
        if c == ']' && i > first {
            let class = match (members.is_empty(), negated) {
                (false, false) => format!("[{}]", members),
                (false, true) => format!("[^{}]", members),
                // Empty set: matches no character, or any character when negated.
                (true, false) => String::from(r"\b\B"),
                (true, true) => String::from("."),
            };
            return Ok(Some((class, i + 1)));
        }

        if c == '[' && chars.get(i + 1) == Some(&':') {
            let end = (i + 2..chars.len().saturating_sub(1))
                .find(|&j| chars[j] == ':' && chars[j + 1] == ']');
            if let Some(end) = end {
                let name: String = chars[i + 2..end].iter().collect();
                if !CLASSES.contains(&name.as_str()) {
                    return Err(format!("unknown character class [:{}:]", name));
                }
                members.push_str("[:");
                members.push_str(&name);
                members.push_str(":]");
                i = end + 2;
                continue;
            }
        }

        let (lo, next) = member(chars, i);
        let is_range = chars.get(next) == Some(&'-')
            && chars.get(next + 1).is_some_and(|&n| n != ']');
        if is_range {
            let (hi, after) = member(chars, next + 1);
            if lo <= hi {
                push_literal(&mut members, lo);
                members.push('-');
                push_literal(&mut members, hi);
            }
            i = after;
        } else {
            push_literal(&mut members, lo);
            i = next;
        }
    }
    Ok(None)
}

/// The bracket member at `i` (a backslash quotes the next character) and the
/// index after it.
fn member(chars: &[char], i: usize) -> (char, usize) {
    match chars.get(i + 1) {
        Some(&quoted) if chars[i] == '\\' => (quoted, i + 2),
        _ => (chars[i], i + 1),
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(pattern: &str) -> GlobPattern {
        GlobPattern::new(pattern).unwrap()
    }

    #[test]
    fn literal_names_match_exactly() {
        assert!(glob("loop").matches("loop"));
        assert!(!glob("loop").matches("loop2"));
        assert!(!glob("loop").matches("xloop"));
    }

    #[test]
    fn star_and_question_mark() {
        assert!(glob("foo_b*").matches("foo_bar"));
        assert!(glob("*").matches(""));
        assert!(glob("snd_hda_?odec*").matches("snd_hda_codec_realtek"));
        assert!(!glob("snd_?").matches("snd_"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(glob("a.b+c").matches("a.b+c"));
        assert!(!glob("a.b").matches("axb"));
        assert!(glob("(x)|{y}$").matches("(x)|{y}$"));
    }

    #[test]
    fn bracket_classes() {
        assert!(glob("ext[234]").matches("ext4"));
        assert!(!glob("ext[234]").matches("ext5"));
        assert!(glob("ext[2-4]").matches("ext3"));
        assert!(glob("ext[!4]").matches("ext2"));
        assert!(!glob("ext[!4]").matches("ext4"));
        assert!(glob("ext[^4]").matches("ext3"));
        assert!(glob("x[]]").matches("x]"));
        assert!(glob("x[a-]").matches("x-"));
        assert!(glob("x[-a]").matches("x-"));
        assert!(glob("nf_[[:alpha:]]*").matches("nf_tables"));
        assert!(!glob("nf_[[:alpha:]]*").matches("nf_4"));
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        assert!(glob("a[b").matches("a[b"));
        assert!(!glob("a[b").matches("ab"));
    }

    #[test]
    fn backslash_quotes() {
        assert!(glob(r"a\*").matches("a*"));
        assert!(!glob(r"a\*").matches("ab"));
        assert!(glob(r"x[\]]").matches("x]"));
    }

    #[test]
    fn slash_and_dot_are_ordinary() {
        assert!(glob("*").matches(".hidden"));
        assert!(glob("a*c").matches("a/b/c"));
    }

    #[test]
    fn reversed_range_is_an_empty_set() {
        let never = glob("x[z-a]");
        for name in ["x", "xa", "xm", "xz", "x-", "x[z-a]"] {
            assert!(!never.matches(name), "{}", name);
        }
        assert!(glob("x[!z-a]").matches("xq"));
        assert!(!glob("x[!z-a]").matches("x"));
        assert!(glob("x[z-ab]").matches("xb"));
        assert!(!glob("x[z-ab]").matches("xm"));
    }

    #[test]
    fn quoted_range_endpoints() {
        assert!(glob(r"x[\a-\c]").matches("xb"));
        assert!(!glob(r"x[\a-\c]").matches("xd"));
    }

    #[test]
    fn unknown_class_is_rejected() {
        let err = GlobPattern::new("[[:nope:]]").unwrap_err();
        assert!(matches!(err, ModinfoError::InvalidPattern { .. }));
    }
}
