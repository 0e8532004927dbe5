//! Redirect target rewriting.

use url::Url;

/// Replace a literal origin inside a `Location` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRewrite {
    pub from: String,
    pub to: String,
}

impl LocationRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Apply every rule in order. Each rule replaces the first occurrence of
/// `from`, wherever it appears, so origins embedded in a query are caught too.
pub fn rewrite_location(location: &str, rules: &[LocationRewrite]) -> String {
    let mut out = location.to_owned();
    for rule in rules {
        out = out.replacen(rule.from.as_str(), &rule.to, 1);
    }
    out
}

/// Point a redirect back through the fetch endpoint.
///
/// Relative targets are resolved against the URL that produced them.
/// Returns `None` when the target cannot be resolved.
pub fn loop_back_location(location: &str, fetched: &Url) -> Option<String> {
    let target = fetched.join(location).ok()?;
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", target.as_str())
        .finish();
    Some(format!("/?{query}"))
}
