//! # Origin Policy
//!
//! One canonical allow/deny decision for cross-origin requests,
//! consumed exactly once per request by the CORS middleware.

/// Outcome of an origin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    Allow,
    Deny,
}

/// Fixed allow-list of permitted cross-origin addresses.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowlist: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowlist: Vec<String>) -> Self {
        Self { allowlist }
    }

    /// An absent origin (same-origin or non-browser client) is always
    /// allowed; a present origin must be on the allow-list.
    pub fn decide(&self, origin: Option<&str>) -> OriginDecision {
        match origin {
            None => OriginDecision::Allow,
            Some(origin) if self.allowlist.iter().any(|allowed| allowed == origin) => {
                OriginDecision::Allow
            }
            Some(_) => OriginDecision::Deny,
        }
    }

    pub fn allows(&self, origin: Option<&str>) -> bool {
        self.decide(origin) == OriginDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> OriginPolicy {
        OriginPolicy::new(vec!["http://localhost:3000".to_string()])
    }

    #[test]
    fn absent_origin_is_allowed() {
        assert_eq!(policy().decide(None), OriginDecision::Allow);
    }

    #[test]
    fn listed_origin_is_allowed() {
        assert!(policy().allows(Some("http://localhost:3000")));
    }

    #[test]
    fn unlisted_origin_is_denied() {
        assert_eq!(
            policy().decide(Some("http://evil.example")),
            OriginDecision::Deny
        );
        // Scheme and port must match exactly.
        assert!(!policy().allows(Some("https://localhost:3000")));
        assert!(!policy().allows(Some("http://localhost:3001")));
    }
}
