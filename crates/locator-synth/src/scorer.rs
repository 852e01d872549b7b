//! Candidate fitness scoring.
//!
//! A candidate is scored by executing it against the live tree: uniqueness
//! first, then durability-tier, ordinal, length and semantic adjustments.
//! Expressions that fail to parse or match nothing score 0.

use once_cell::sync::Lazy;
use page_tree::{PageTree, SEMANTIC_TAGS};
use pinpoint_core_types::NodeId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generators::Candidate;
use crate::policy::ScorePolicy;

static PATH_ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").expect("ordinal pattern"));

/// How many nodes an expression matched, and whether the target is among
/// them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uniqueness {
    pub is_unique: bool,
    pub match_count: usize,
    pub matches_target: bool,
}

/// A candidate with its computed fitness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: i32,
    pub uniqueness: Uniqueness,
}

impl ScoredCandidate {
    pub fn expression(&self) -> &str {
        &self.candidate.expression
    }
}

/// Execute and score one candidate against the tree.
pub fn score_candidate(
    tree: &PageTree,
    candidate: &Candidate,
    target: NodeId,
    policy: &ScorePolicy,
) -> ScoredCandidate {
    let hits = match query_engine::evaluate(tree, &candidate.expression, candidate.dialect) {
        Ok(hits) => hits,
        Err(err) => {
            debug!(expression = %candidate.expression, error = %err, "candidate rejected");
            return ScoredCandidate {
                candidate: candidate.clone(),
                score: 0,
                uniqueness: Uniqueness::default(),
            };
        }
    };

    let uniqueness = Uniqueness {
        is_unique: hits.len() == 1,
        match_count: hits.len(),
        matches_target: hits.contains(&target),
    };

    if hits.is_empty() {
        return ScoredCandidate {
            candidate: candidate.clone(),
            score: 0,
            uniqueness,
        };
    }

    let expr = candidate.expression.as_str();
    let mut score = if hits.len() == 1 {
        policy.unique_base
    } else {
        (policy.unique_base - (hits.len() as i32 - 1) * policy.duplicate_penalty).max(0)
    };

    score += tier_bonus(expr, policy);

    if expr.contains(":nth-of-type(") {
        score -= policy.nth_of_type_penalty;
    }
    if candidate.dialect == pinpoint_core_types::Dialect::Path && PATH_ORDINAL.is_match(expr) {
        score -= policy.path_ordinal_penalty;
    }

    if expr.len() < policy.short_length {
        score += policy.short_bonus;
    } else if expr.len() > policy.long_length {
        score -= policy.long_penalty;
    }

    if names_semantic_tag(expr) {
        score += policy.semantic_bonus;
    }

    ScoredCandidate {
        candidate: candidate.clone(),
        score: score.clamp(0, policy.max_score),
        uniqueness,
    }
}

/// Durability tier the expression leans on, read off its text so both
/// dialects are treated alike.
fn tier_bonus(expr: &str, policy: &ScorePolicy) -> i32 {
    let has_attr = |name: &str| {
        expr.contains(&format!("[{name}")) || expr.contains(&format!("@{name}"))
    };
    let has_ordinal = expr.contains(":nth-") || PATH_ORDINAL.is_match(expr);

    if has_attr("data-testid") {
        policy.test_hook_bonus
    } else if has_attr("data-test") {
        policy.test_attr_bonus
    } else if has_attr("data-qa") {
        policy.qa_attr_bonus
    } else if has_attr("aria-label") {
        policy.aria_label_bonus
    } else if (expr.contains('#') || expr.contains("[@id=")) && !has_ordinal {
        policy.plain_id_bonus
    } else if has_attr("role") {
        policy.role_bonus
    } else {
        0
    }
}

/// Whether the expression names a semantic tag as a standalone token.
fn names_semantic_tag(expr: &str) -> bool {
    expr.split(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .any(|token| SEMANTIC_TAGS.contains(&token))
}
