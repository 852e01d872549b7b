//! Locator expression execution for the two dialects the engine speaks.
//!
//! Expressions come from two places: the candidate generators (always
//! well-formed) and the user-facing tester (arbitrary input). Both funnel
//! through [`evaluate`]; the tester uses [`test_expression`], which never
//! panics and reports parse failures as a typed outcome instead of an error.

pub mod css;
mod cursor;
pub mod errors;
pub mod escape;
pub mod xpath;

pub use errors::*;
pub use escape::*;

use page_tree::PageTree;
use pinpoint_core_types::{Dialect, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Run an expression against the tree, returning matches in document order.
pub fn evaluate(
    tree: &PageTree,
    expression: &str,
    dialect: Dialect,
) -> Result<Vec<NodeId>, QueryError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Empty);
    }
    match dialect {
        Dialect::Structural => Ok(css::select(tree, &css::parse(trimmed)?)),
        Dialect::Path => Ok(xpath::select(tree, &xpath::parse(trimmed)?)),
    }
}

/// Number of nodes the expression currently matches.
pub fn match_count(
    tree: &PageTree,
    expression: &str,
    dialect: Dialect,
) -> Result<usize, QueryError> {
    evaluate(tree, expression, dialect).map(|hits| hits.len())
}

/// Whether the expression matches the given node (false on invalid input).
pub fn matches_node(tree: &PageTree, expression: &str, dialect: Dialect, target: NodeId) -> bool {
    evaluate(tree, expression, dialect)
        .map(|hits| hits.contains(&target))
        .unwrap_or(false)
}

/// Result of testing an expression on behalf of the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestOutcome {
    /// The expression executed; `matched` is true when at least one node
    /// matched.
    Report { match_count: usize, matched: bool },
    /// The expression failed to parse or execute.
    Invalid { reason: String },
}

impl TestOutcome {
    pub fn matched(&self) -> bool {
        matches!(self, TestOutcome::Report { matched: true, .. })
    }
}

/// Test an expression without ever propagating a failure.
pub fn test_expression(tree: &PageTree, expression: &str, dialect: Dialect) -> TestOutcome {
    match match_count(tree, expression, dialect) {
        Ok(count) => TestOutcome::Report {
            match_count: count,
            matched: count >= 1,
        },
        Err(err) => {
            debug!(%dialect, error = %err, "expression rejected");
            TestOutcome::Invalid {
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pinpoint_core_types::Size;

    use super::*;

    fn small_tree() -> PageTree {
        let mut tree = PageTree::new("html", Size::new(100.0, 100.0));
        let body = tree.append_child(tree.root(), "body");
        let button = tree.append_child(body, "button");
        tree.set_attr(button, "id", "go");
        tree
    }

    #[test]
    fn both_dialects_find_the_same_node() {
        let tree = small_tree();
        let css = evaluate(&tree, "#go", Dialect::Structural).unwrap();
        let path = evaluate(&tree, "//button[@id=\"go\"]", Dialect::Path).unwrap();
        assert_eq!(css, path);
        assert_eq!(css.len(), 1);
    }

    #[test]
    fn test_expression_reports_instead_of_failing() {
        let tree = small_tree();
        assert_eq!(
            test_expression(&tree, "#go", Dialect::Structural),
            TestOutcome::Report {
                match_count: 1,
                matched: true
            }
        );
        assert_eq!(
            test_expression(&tree, "#missing", Dialect::Structural),
            TestOutcome::Report {
                match_count: 0,
                matched: false
            }
        );
        assert!(matches!(
            test_expression(&tree, "div:::", Dialect::Structural),
            TestOutcome::Invalid { .. }
        ));
        assert!(matches!(
            test_expression(&tree, "", Dialect::Path),
            TestOutcome::Invalid { .. }
        ));
    }
}
