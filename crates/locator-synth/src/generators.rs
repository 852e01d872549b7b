//! Candidate generation strategies.
//!
//! Five independent generators share one signature and run from a fixed,
//! ordered chain. Each emits zero or more candidates; none of them talks to
//! another. New strategies are added by appending to [`generator_chain`].

use page_tree::PageTree;
use pinpoint_core_types::{Dialect, NodeId};
use query_engine::{css_escape, css_string, xpath_literal};
use serde::{Deserialize, Serialize};

use crate::profile::{analyze, NodeProfile, UiLibrary, SHADCN_COMMON_CLASSES};

/// How many durable attributes the attribute strategy anchors on.
const MAX_ATTRIBUTE_CANDIDATES: usize = 5;

/// How many durable attributes get a path-dialect mirror.
const MAX_PATH_ATTRIBUTE_CANDIDATES: usize = 3;

/// Ancestor walk depth for the structural chain.
const STRUCTURAL_CHAIN_DEPTH: usize = 4;

/// Ancestor walk depth when hunting a stable anchor for relative paths.
const RELATIVE_ANCHOR_DEPTH: usize = 5;

/// Direct text shorter than this is too ambiguous to anchor on.
const MIN_TEXT_ANCHOR_LEN: usize = 2;

/// Result slot a candidate competes for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ById,
    ByAttribute,
    ByClass,
    ByStructure,
    ByText,
    ByLibrary,
    XpathAbsolute,
    XpathRelative,
    XpathByAttribute,
    XpathByText,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::ById,
        Category::ByAttribute,
        Category::ByClass,
        Category::ByStructure,
        Category::ByText,
        Category::ByLibrary,
        Category::XpathAbsolute,
        Category::XpathRelative,
        Category::XpathByAttribute,
        Category::XpathByText,
    ];
}

/// What produced a candidate; the scorer dispatches on this, never on the
/// generator's identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Id,
    Attribute,
    AttributeClass,
    Class,
    MultiClass,
    AncestorChain,
    Text,
    ClassText,
    LibraryState,
    LibraryCollection,
    LibraryPattern,
    AbsolutePath,
    RelativePath,
    PathAttribute,
    PathTextContains,
    PathTextExact,
}

/// A locator expression proposal, immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub expression: String,
    pub kind: CandidateKind,
    pub category: Category,
    pub dialect: Dialect,
    pub base_priority: i32,
}

impl Candidate {
    fn new(
        expression: String,
        kind: CandidateKind,
        category: Category,
        dialect: Dialect,
        base_priority: i32,
    ) -> Self {
        Self {
            expression,
            kind,
            category,
            dialect,
            base_priority,
        }
    }
}

/// One generation strategy.
pub type Generator = fn(&PageTree, NodeId, &NodeProfile) -> Vec<Candidate>;

/// The fixed, ordered strategy chain. Order matters: it is the tie-breaker
/// when two candidates score equally.
pub fn generator_chain() -> [Generator; 5] {
    [
        attribute_candidates,
        structural_candidates,
        text_candidates,
        library_candidates,
        path_candidates,
    ]
}

/// Run the whole chain in order.
pub fn generate_all(tree: &PageTree, id: NodeId, profile: &NodeProfile) -> Vec<Candidate> {
    generator_chain()
        .iter()
        .flat_map(|generator| generator(tree, id, profile))
        .collect()
}

/// Id and attribute-equality anchors.
pub fn attribute_candidates(_tree: &PageTree, _id: NodeId, profile: &NodeProfile) -> Vec<Candidate> {
    let mut out = Vec::new();
    let tag = &profile.tag;

    if let Some(id_value) = &profile.durable_id {
        out.push(Candidate::new(
            format!("#{}", css_escape(id_value)),
            CandidateKind::Id,
            Category::ById,
            Dialect::Structural,
            100,
        ));
    }

    for attr in profile.durable_attributes.iter().take(MAX_ATTRIBUTE_CANDIDATES) {
        out.push(Candidate::new(
            format!("{tag}[{}={}]", attr.name, css_string(&attr.value)),
            CandidateKind::Attribute,
            Category::ByAttribute,
            Dialect::Structural,
            90 - attr.rank as i32,
        ));

        if let Some(class) = profile.durable_classes.first() {
            out.push(Candidate::new(
                format!(
                    "{tag}.{}[{}={}]",
                    css_escape(class),
                    attr.name,
                    css_string(&attr.value)
                ),
                CandidateKind::AttributeClass,
                Category::ByAttribute,
                Dialect::Structural,
                85 - attr.rank as i32,
            ));
        }
    }

    out
}

/// Class anchors and the ancestor chain.
pub fn structural_candidates(tree: &PageTree, id: NodeId, profile: &NodeProfile) -> Vec<Candidate> {
    let mut out = Vec::new();
    let tag = &profile.tag;

    if let Some(first) = profile.durable_classes.first() {
        out.push(Candidate::new(
            format!("{tag}.{}", css_escape(first)),
            CandidateKind::Class,
            Category::ByClass,
            Dialect::Structural,
            70,
        ));

        if profile.durable_classes.len() > 1 {
            let pair: String = profile
                .durable_classes
                .iter()
                .take(2)
                .map(|class| format!(".{}", css_escape(class)))
                .collect();
            out.push(Candidate::new(
                format!("{tag}{pair}"),
                CandidateKind::MultiClass,
                Category::ByClass,
                Dialect::Structural,
                75,
            ));
        }
    }

    if let Some(expression) = ancestor_chain_expression(tree, id) {
        out.push(Candidate::new(
            expression,
            CandidateKind::AncestorChain,
            Category::ByStructure,
            Dialect::Structural,
            60,
        ));
    }

    out
}

fn ancestor_chain_expression(tree: &PageTree, id: NodeId) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = Some(id);
    let mut depth = 0;

    while let Some(node) = current {
        if depth >= STRUCTURAL_CHAIN_DEPTH {
            break;
        }
        let node_profile = analyze(tree, node);
        let mut part = tree.tag(node).to_string();

        // A durable id addresses the node globally; the walk can stop here.
        if let Some(id_value) = &node_profile.durable_id {
            parts.insert(0, format!("#{}", css_escape(id_value)));
            break;
        }

        if let Some(attr) = node_profile.durable_attributes.first() {
            part.push_str(&format!("[{}={}]", attr.name, css_string(&attr.value)));
        } else if let Some(class) = node_profile.durable_classes.first() {
            part.push_str(&format!(".{}", css_escape(class)));
        } else if tree.same_tag_sibling_count(node) > 1 {
            part.push_str(&format!(":nth-of-type({})", tree.same_tag_ordinal(node)));
        }

        parts.insert(0, part);
        current = tree.parent(node);
        depth += 1;
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" > "))
    }
}

/// Text-equality anchors; only fires on nodes with enough direct text.
pub fn text_candidates(_tree: &PageTree, _id: NodeId, profile: &NodeProfile) -> Vec<Candidate> {
    let mut out = Vec::new();
    if profile.direct_text.len() <= MIN_TEXT_ANCHOR_LEN {
        return out;
    }
    let tag = &profile.tag;
    let text = css_string(&profile.direct_text);

    out.push(Candidate::new(
        format!("{tag}:contains({text})"),
        CandidateKind::Text,
        Category::ByText,
        Dialect::Structural,
        50,
    ));

    if let Some(class) = profile.durable_classes.first() {
        out.push(Candidate::new(
            format!("{tag}.{}:contains({text})", css_escape(class)),
            CandidateKind::ClassText,
            Category::ByText,
            Dialect::Structural,
            55,
        ));
    }

    out
}

/// Library-idiom anchors; only fires when an affiliation was detected.
pub fn library_candidates(tree: &PageTree, id: NodeId, profile: &NodeProfile) -> Vec<Candidate> {
    let mut out = Vec::new();
    let tag = &profile.tag;

    match profile.ui_library {
        UiLibrary::Radix => {
            if let Some(state) = tree.attr(id, "data-state") {
                out.push(Candidate::new(
                    format!("{tag}[data-state={}]", css_string(state)),
                    CandidateKind::LibraryState,
                    Category::ByLibrary,
                    Dialect::Structural,
                    80,
                ));
            }
            if tree.has_attr(id, "data-radix-collection-item") {
                out.push(Candidate::new(
                    format!("{tag}[data-radix-collection-item]"),
                    CandidateKind::LibraryCollection,
                    Category::ByLibrary,
                    Dialect::Structural,
                    75,
                ));
            }
        }
        UiLibrary::Shadcn => {
            let common: Vec<&String> = profile
                .durable_classes
                .iter()
                .filter(|class| SHADCN_COMMON_CLASSES.contains(&class.as_str()))
                .collect();
            if common.len() >= 2 {
                let combo: String = common
                    .iter()
                    .take(3)
                    .map(|class| format!(".{}", css_escape(class)))
                    .collect();
                out.push(Candidate::new(
                    format!("{tag}{combo}"),
                    CandidateKind::LibraryPattern,
                    Category::ByLibrary,
                    Dialect::Structural,
                    70,
                ));
            }
        }
        UiLibrary::None => {}
    }

    out
}

/// Path-dialect anchors: attribute and text mirrors, the relative path off
/// the nearest stable ancestor, and the absolute index path that always
/// succeeds.
pub fn path_candidates(tree: &PageTree, id: NodeId, profile: &NodeProfile) -> Vec<Candidate> {
    let mut out = Vec::new();
    let tag = &profile.tag;

    for attr in profile
        .durable_attributes
        .iter()
        .take(MAX_PATH_ATTRIBUTE_CANDIDATES)
    {
        out.push(Candidate::new(
            format!("//{tag}[@{}={}]", attr.name, xpath_literal(&attr.value)),
            CandidateKind::PathAttribute,
            Category::XpathByAttribute,
            Dialect::Path,
            85 - attr.rank as i32,
        ));
    }

    if profile.direct_text.len() > MIN_TEXT_ANCHOR_LEN {
        out.push(Candidate::new(
            format!(
                "//{tag}[contains(text(), {})]",
                xpath_literal(&profile.direct_text)
            ),
            CandidateKind::PathTextContains,
            Category::XpathByText,
            Dialect::Path,
            60,
        ));
        out.push(Candidate::new(
            format!(
                "//{tag}[normalize-space(text())={}]",
                xpath_literal(profile.direct_text.trim())
            ),
            CandidateKind::PathTextExact,
            Category::XpathByText,
            Dialect::Path,
            65,
        ));
    }

    if let Some(expression) = relative_path_expression(tree, id) {
        out.push(Candidate::new(
            expression,
            CandidateKind::RelativePath,
            Category::XpathRelative,
            Dialect::Path,
            70,
        ));
    }

    out.push(Candidate::new(
        absolute_path_expression(tree, id),
        CandidateKind::AbsolutePath,
        Category::XpathAbsolute,
        Dialect::Path,
        20,
    ));

    out
}

/// Nearest-stable-ancestor anchor plus a relative ordinal path down to the
/// node. `None` when no ancestor within reach is stable.
fn relative_path_expression(tree: &PageTree, id: NodeId) -> Option<String> {
    let mut current = tree.parent(id);
    let mut depth = 0;

    while let Some(ancestor) = current {
        if depth >= RELATIVE_ANCHOR_DEPTH {
            break;
        }
        let ancestor_profile = analyze(tree, ancestor);
        let anchor = if let Some(id_value) = &ancestor_profile.durable_id {
            Some(format!("//*[@id={}]", xpath_literal(id_value)))
        } else {
            ancestor_profile.durable_attributes.first().map(|attr| {
                format!(
                    "//{}[@{}={}]",
                    tree.tag(ancestor),
                    attr.name,
                    xpath_literal(&attr.value)
                )
            })
        };

        if let Some(anchor) = anchor {
            let mut steps = Vec::new();
            let mut walk = id;
            while walk != ancestor {
                steps.insert(
                    0,
                    format!("{}[{}]", tree.tag(walk), tree.same_tag_ordinal(walk)),
                );
                walk = tree.parent(walk)?;
            }
            return if steps.is_empty() {
                Some(anchor)
            } else {
                Some(format!("{anchor}//{}", steps.join("/")))
            };
        }

        current = tree.parent(ancestor);
        depth += 1;
    }

    None
}

/// Tag-plus-ordinal path from the document root; defined for every node.
pub fn absolute_path_expression(tree: &PageTree, id: NodeId) -> String {
    let mut steps = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current {
        steps.insert(
            0,
            format!("{}[{}]", tree.tag(node), tree.same_tag_ordinal(node)),
        );
        current = tree.parent(node);
    }
    format!("/{}", steps.join("/"))
}

/// Last-resort expression: a raw id or class anchor when present, otherwise
/// the absolute index path. Unlike candidates, this never goes through the
/// durability filter — it only has to address the node right now.
pub fn fallback_expression(tree: &PageTree, id: NodeId) -> String {
    if let Some(id_value) = tree.id_attr(id) {
        if !id_value.is_empty() {
            return format!("#{}", css_escape(id_value));
        }
    }
    let classes: Vec<&str> = tree.classes(id).take(2).collect();
    if !classes.is_empty() {
        let combo: String = classes
            .iter()
            .map(|class| format!(".{}", css_escape(class)))
            .collect();
        return format!("{}{combo}", tree.tag(id));
    }
    absolute_path_expression(tree, id)
}

#[cfg(test)]
mod tests {
    use pinpoint_core_types::Size;

    use super::*;

    fn dialog_tree() -> (PageTree, NodeId) {
        let mut tree = PageTree::new("html", Size::new(800.0, 600.0));
        let body = tree.append_child(tree.root(), "body");
        let section = tree.append_child(body, "section");
        tree.set_attr(section, "id", "checkout");
        let row = tree.append_child(section, "div");
        let _spacer = tree.append_child(row, "div");
        let button = tree.append_child(row, "button");
        tree.set_attr(button, "data-testid", "pay-now");
        tree.set_attr(button, "class", "pay-button active");
        tree.add_text(button, "Pay now");
        (tree, button)
    }

    #[test]
    fn attribute_generator_combines_with_class() {
        let (tree, button) = dialog_tree();
        let profile = analyze(&tree, button);
        let candidates = attribute_candidates(&tree, button, &profile);
        let expressions: Vec<&str> = candidates.iter().map(|c| c.expression.as_str()).collect();
        assert!(expressions.contains(&"button[data-testid=\"pay-now\"]"));
        assert!(expressions.contains(&"button.pay-button[data-testid=\"pay-now\"]"));
    }

    #[test]
    fn structural_chain_stops_at_durable_id() {
        let (tree, button) = dialog_tree();
        let profile = analyze(&tree, button);
        let candidates = structural_candidates(&tree, button, &profile);
        let chain = candidates
            .iter()
            .find(|c| c.kind == CandidateKind::AncestorChain)
            .unwrap();
        assert_eq!(
            chain.expression,
            "#checkout > div > button[data-testid=\"pay-now\"]"
        );
    }

    #[test]
    fn text_generator_requires_minimum_length() {
        let (mut tree, button) = dialog_tree();
        let profile = analyze(&tree, button);
        assert!(!text_candidates(&tree, button, &profile).is_empty());

        tree.clear_text(button);
        tree.add_text(button, "ok");
        let short_profile = analyze(&tree, button);
        assert!(text_candidates(&tree, button, &short_profile).is_empty());
    }

    #[test]
    fn library_generator_is_silent_without_affiliation() {
        let (tree, button) = dialog_tree();
        let profile = analyze(&tree, button);
        assert!(library_candidates(&tree, button, &profile).is_empty());
    }

    #[test]
    fn radix_state_candidate() {
        let mut tree = PageTree::new("html", Size::new(800.0, 600.0));
        let body = tree.append_child(tree.root(), "body");
        let trigger = tree.append_child(body, "button");
        tree.set_attr(trigger, "data-state", "open");
        let profile = analyze(&tree, trigger);
        let candidates = library_candidates(&tree, trigger, &profile);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].expression, "button[data-state=\"open\"]");
    }

    #[test]
    fn absolute_path_addresses_every_node() {
        let (tree, button) = dialog_tree();
        assert_eq!(
            absolute_path_expression(&tree, button),
            "/html[1]/body[1]/section[1]/div[1]/button[1]"
        );
    }

    #[test]
    fn relative_path_hangs_off_stable_ancestor() {
        let (tree, button) = dialog_tree();
        let profile = analyze(&tree, button);
        let candidates = path_candidates(&tree, button, &profile);
        let relative = candidates
            .iter()
            .find(|c| c.kind == CandidateKind::RelativePath)
            .unwrap();
        assert_eq!(
            relative.expression,
            "//*[@id=\"checkout\"]//div[1]/button[1]"
        );
    }

    #[test]
    fn chain_runs_in_fixed_order() {
        let (tree, button) = dialog_tree();
        let profile = analyze(&tree, button);
        let all = generate_all(&tree, button, &profile);
        let first_path = all
            .iter()
            .position(|c| c.dialect == Dialect::Path)
            .unwrap();
        let last_structural = all
            .iter()
            .rposition(|c| c.dialect == Dialect::Structural)
            .unwrap();
        assert!(last_structural < first_path);
    }
}
