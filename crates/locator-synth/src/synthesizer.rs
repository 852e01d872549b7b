//! Ranking and assembly of the final locator set.

use page_tree::PageTree;
use pinpoint_core_types::{Dialect, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generators::{
    absolute_path_expression, generate_all, Candidate, CandidateKind, Category,
};
use crate::policy::{ScorePolicy, SynthesisPolicy};
use crate::profile::{analyze, NodeProfile};
use crate::scorer::{score_candidate, ScoredCandidate};

/// One optional slot per candidate category. A filled slot always holds an
/// expression that matched at least one node at synthesis time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategorySlots {
    pub by_id: Option<ScoredCandidate>,
    pub by_attribute: Option<ScoredCandidate>,
    pub by_class: Option<ScoredCandidate>,
    pub by_structure: Option<ScoredCandidate>,
    pub by_text: Option<ScoredCandidate>,
    pub by_library: Option<ScoredCandidate>,
    pub xpath_absolute: Option<ScoredCandidate>,
    pub xpath_relative: Option<ScoredCandidate>,
    pub xpath_by_attribute: Option<ScoredCandidate>,
    pub xpath_by_text: Option<ScoredCandidate>,
}

impl CategorySlots {
    pub fn get(&self, category: Category) -> Option<&ScoredCandidate> {
        self.slot(category).as_ref()
    }

    fn slot(&self, category: Category) -> &Option<ScoredCandidate> {
        match category {
            Category::ById => &self.by_id,
            Category::ByAttribute => &self.by_attribute,
            Category::ByClass => &self.by_class,
            Category::ByStructure => &self.by_structure,
            Category::ByText => &self.by_text,
            Category::ByLibrary => &self.by_library,
            Category::XpathAbsolute => &self.xpath_absolute,
            Category::XpathRelative => &self.xpath_relative,
            Category::XpathByAttribute => &self.xpath_by_attribute,
            Category::XpathByText => &self.xpath_by_text,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<ScoredCandidate> {
        match category {
            Category::ById => &mut self.by_id,
            Category::ByAttribute => &mut self.by_attribute,
            Category::ByClass => &mut self.by_class,
            Category::ByStructure => &mut self.by_structure,
            Category::ByText => &mut self.by_text,
            Category::ByLibrary => &mut self.by_library,
            Category::XpathAbsolute => &mut self.xpath_absolute,
            Category::XpathRelative => &mut self.xpath_relative,
            Category::XpathByAttribute => &mut self.xpath_by_attribute,
            Category::XpathByText => &mut self.xpath_by_text,
        }
    }
}

/// The synthesis result: ranked candidates, category slots, and the hybrid
/// default choice. `best[0]` always exists, courtesy of the absolute-path
/// fallback.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocatorSet {
    pub best: Vec<ScoredCandidate>,
    pub slots: CategorySlots,
    /// The expression a caller should reach for first.
    pub default_choice: String,
    pub profile: NodeProfile,
    /// Every candidate that cleared the zero-score floor, ranked.
    pub all: Vec<ScoredCandidate>,
}

impl LocatorSet {
    /// Best structural-dialect expression, category-preference order.
    pub fn css_locator(&self) -> Option<&str> {
        self.best
            .iter()
            .find(|s| s.candidate.dialect == Dialect::Structural)
            .map(ScoredCandidate::expression)
            .or_else(|| {
                self.slots
                    .by_structure
                    .as_ref()
                    .map(ScoredCandidate::expression)
            })
    }

    /// Best path-dialect expression, category-preference order.
    pub fn path_locator(&self) -> Option<&str> {
        [
            Category::XpathByAttribute,
            Category::XpathRelative,
            Category::XpathAbsolute,
        ]
        .iter()
        .find_map(|&category| self.slots.get(category).map(ScoredCandidate::expression))
    }
}

/// Analyze, generate, score and rank. Deterministic for a fixed tree: ties
/// keep generation order, so the first generator to emit wins.
pub fn synthesize(
    tree: &PageTree,
    id: NodeId,
    score_policy: &ScorePolicy,
    synthesis_policy: &SynthesisPolicy,
) -> LocatorSet {
    let profile = analyze(tree, id);
    let candidates = generate_all(tree, id, &profile);
    debug!(node = %id, candidates = candidates.len(), "scoring candidates");

    let mut ranked: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| score_candidate(tree, candidate, id, score_policy))
        .filter(|scored| scored.score > 0)
        .collect();
    ranked.sort_by_key(|scored| -scored.score);

    let mut slots = CategorySlots::default();
    for scored in &ranked {
        if scored.score > synthesis_policy.min_slot_score {
            let slot = slots.slot_mut(scored.candidate.category);
            if slot.is_none() {
                *slot = Some(scored.clone());
            }
        }
    }

    let mut best: Vec<ScoredCandidate> = ranked
        .iter()
        .take(synthesis_policy.best_count)
        .cloned()
        .collect();

    if best.is_empty() {
        // Every heuristic came up dry; substitute the guaranteed fallback so
        // the caller is never handed an unusable result.
        let fallback = Candidate {
            expression: absolute_path_expression(tree, id),
            kind: CandidateKind::AbsolutePath,
            category: Category::XpathAbsolute,
            dialect: Dialect::Path,
            base_priority: 20,
        };
        let scored = score_candidate(tree, &fallback, id, score_policy);
        debug!(expression = %fallback.expression, "substituting fallback locator");
        best.push(scored);
    }

    let default_choice = best[0].expression().to_string();

    LocatorSet {
        best,
        slots,
        default_choice,
        profile,
        all: ranked,
    }
}

/// Synthesize with default policies.
pub fn synthesize_default(tree: &PageTree, id: NodeId) -> LocatorSet {
    synthesize(
        tree,
        id,
        &ScorePolicy::default(),
        &SynthesisPolicy::default(),
    )
}
