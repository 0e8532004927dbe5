//! Literal body substitution.
//!
//! Match texts are escaped once and compiled when the route table is built,
//! so every rewrite at request time is a plain `replace_all` with no pattern
//! metacharacters left in play.

use regex::{NoExpand, Regex};

/// One compiled `from` → `to` substitution.
#[derive(Debug, Clone)]
pub struct BodyRewrite {
    pattern: Regex,
    replacement: String,
}

impl BodyRewrite {
    /// Compile a literal substitution. `from` is matched verbatim.
    pub fn new(from: &str, to: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&regex::escape(from))?,
            replacement: to.into(),
        })
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Apply every rule in declaration order, replacing all occurrences.
///
/// Later rules see the output of earlier ones. Running the same rules twice
/// is only a no-op when no replacement reintroduces a match text.
pub fn rewrite(text: &str, rules: &[BodyRewrite]) -> String {
    let mut out = text.to_owned();
    for rule in rules {
        out = rule.apply(&out);
    }
    out
}

/// Rewrite a fully buffered body.
///
/// Bodies that are not valid UTF-8 are returned untouched rather than being
/// lossily decoded.
pub fn rewrite_bytes(body: Vec<u8>, rules: &[BodyRewrite]) -> Vec<u8> {
    match String::from_utf8(body) {
        Ok(text) => rewrite(&text, rules).into_bytes(),
        Err(err) => {
            tracing::debug!(len = err.as_bytes().len(), "Body is not UTF-8, forwarding unmodified");
            err.into_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<BodyRewrite> {
        pairs
            .iter()
            .map(|(from, to)| BodyRewrite::new(from, *to).unwrap())
            .collect()
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let rules = rules(&[("//en.wikipedia.org", "//wiki.example.com")]);
        let out = rewrite(
            r#"<a href="//en.wikipedia.org/Dog">x</a><img src="//en.wikipedia.org/a.png">"#,
            &rules,
        );
        assert_eq!(
            out,
            r#"<a href="//wiki.example.com/Dog">x</a><img src="//wiki.example.com/a.png">"#
        );
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let rules = rules(&[("a.b/(c)*", "X")]);
        assert_eq!(rewrite("a.b/(c)* aXb/(c)* a.b/ccc", &rules), "X aXb/(c)* a.b/ccc");
    }

    #[test]
    fn test_replacement_is_not_expanded() {
        let rules = rules(&[("price", "$1 ${name}")]);
        assert_eq!(rewrite("price", &rules), "$1 ${name}");
    }

    #[test]
    fn test_rules_apply_sequentially() {
        // second rule sees the first rule's output
        let rules = rules(&[("//github.com", "//gh.example.com"), ("gh.example.com", "G")]);
        assert_eq!(rewrite("https://github.com/x", &rules), "https://G/x");
    }

    #[test]
    fn test_not_idempotent_when_replacement_contains_match() {
        let rules = rules(&[("//a.org", "//a.org.example.com")]);
        let once = rewrite("//a.org/", &rules);
        let twice = rewrite(&once, &rules);
        assert_eq!(once, "//a.org.example.com/");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_no_rules_is_identity() {
        assert_eq!(rewrite("unchanged", &[]), "unchanged");
    }

    #[test]
    fn test_non_utf8_passthrough() {
        let rules = rules(&[("a", "b")]);
        let png = vec![0x89, b'P', b'N', b'G', 0xff, b'a'];
        assert_eq!(rewrite_bytes(png.clone(), &rules), png);
        assert_eq!(rewrite_bytes(b"aaa".to_vec(), &rules), b"bbb".to_vec());
    }
}
