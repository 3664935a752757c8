//! Declarative finding rules.
//!
//! A [`Rule`] reads the diagnostic text of one or more checks, tests each of
//! its tokens against that text and emits one [`SecurityFinding`] per token
//! that triggers. Issue and remediation templates substitute `{token}`.

use crate::models::{PortRecord, SecurityFinding};

/// How a token is tested against diagnostic text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Token occurs in the text (case-sensitive)
    Contains,
    /// Token occurs in the lower-cased text
    ContainsIgnoreCase,
    /// Token does not occur in the text (case-sensitive). Fires on empty
    /// text as well.
    Missing,
}

impl Matcher {
    fn triggers(self, text: &str, token: &str) -> bool {
        match self {
            Self::Contains => text.contains(token),
            Self::ContainsIgnoreCase => text.to_lowercase().contains(&token.to_lowercase()),
            Self::Missing => !text.contains(token),
        }
    }

    fn applies_to_empty_text(self) -> bool {
        self == Self::Missing
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Checks whose outputs are concatenated, in order, into the tested text
    pub checks: &'static [&'static str],
    pub tokens: &'static [&'static str],
    pub matcher: Matcher,
    pub issue: &'static str,
    pub remediation: &'static str,
}

impl Rule {
    /// Diagnostic text this rule inspects. Missing checks contribute nothing.
    pub fn text(&self, record: &PortRecord) -> String {
        self.checks
            .iter()
            .filter_map(|check| record.diagnostic(check))
            .collect()
    }

    pub fn evaluate(&self, record: &PortRecord) -> Vec<SecurityFinding> {
        let text = self.text(record);
        if text.is_empty() && !self.matcher.applies_to_empty_text() {
            return Vec::new();
        }

        self.tokens
            .iter()
            .filter(|token| self.matcher.triggers(&text, token))
            .map(|token| {
                SecurityFinding::new(
                    self.issue.replace("{token}", token),
                    self.remediation.replace("{token}", token),
                )
            })
            .collect()
    }
}

/// Evaluate a catalog in order
pub fn evaluate_all(catalog: &[Rule], record: &PortRecord) -> Vec<SecurityFinding> {
    catalog.iter().flat_map(|rule| rule.evaluate(record)).collect()
}
