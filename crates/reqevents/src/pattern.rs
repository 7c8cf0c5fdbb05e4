//! Subscription pattern matching.

/// A compiled subscription pattern. Compiled once at subscribe time instead
/// of re-parsed on every emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pattern {
    Exact(String),
    /// Matches every event name.
    Wildcard,
    /// `"prefix:*"` — matches any name starting with `prefix:`.
    Prefix(String),
    /// Matches any of a fixed set of exact names.
    AnyOf(Vec<String>),
}

impl Pattern {
    pub(crate) fn compile(raw: &str) -> Self {
        if raw == "*" {
            Pattern::Wildcard
        } else if let Some(prefix) = raw.strip_suffix('*') {
            Pattern::Prefix(prefix.to_string())
        } else {
            Pattern::Exact(raw.to_string())
        }
    }

    pub(crate) fn compile_any(names: &[&str]) -> Self {
        Pattern::AnyOf(names.iter().map(|s| s.to_string()).collect())
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(e) => e == name,
            Pattern::Wildcard => true,
            Pattern::Prefix(p) => name.starts_with(p.as_str()),
            Pattern::AnyOf(names) => names.iter().any(|n| n == name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_only_itself() {
        let p = Pattern::compile("request:start");
        assert!(p.matches("request:start"));
        assert!(!p.matches("request:end"));
    }

    #[test]
    fn wildcard_matches_everything() {
        let p = Pattern::compile("*");
        assert!(p.matches("anything:at:all"));
    }

    #[test]
    fn prefix_matches_namespace() {
        let p = Pattern::compile("cache:*");
        assert!(p.matches("cache:hit"));
        assert!(p.matches("cache:miss"));
        assert!(!p.matches("request:start"));
    }

    #[test]
    fn any_of_matches_listed_names() {
        let p = Pattern::compile_any(&["request:start", "request:end"]);
        assert!(p.matches("request:start"));
        assert!(p.matches("request:end"));
        assert!(!p.matches("request:retry"));
    }
}
