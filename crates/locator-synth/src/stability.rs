//! Durability classification for attributes, classes and ids.
//!
//! These are flat rule tables evaluated by pure functions, applied
//! identically everywhere durability is judged. The attribute allowlist is
//! ordered: the position of a name is its priority rank (lower = more
//! durable).

use once_cell::sync::Lazy;
use regex::Regex;

/// Attribute names worth anchoring on, most durable first. The index of a
/// name is its priority rank.
pub const PRIORITY_ATTRIBUTES: &[&str] = &[
    // Test hooks
    "data-testid",
    "data-test",
    "data-qa",
    "data-cy",
    "data-automation",
    "data-test-id",
    "data-qa-id",
    "data-selenium",
    "data-e2e",
    "data-automation-id",
    // Accessibility
    "aria-label",
    "aria-labelledby",
    "aria-describedby",
    "role",
    "aria-controls",
    // Semantic
    "name",
    "id",
    "title",
    "alt",
    "placeholder",
    "type",
    // Content
    "href",
    "src",
    "value",
    "for",
    // Radix state and collection markers
    "data-radix-collection-item",
    "data-state",
    "data-orientation",
    "data-side",
    "data-align",
    "data-radix-aspect-ratio-wrapper",
    "data-radix-scroll-area-viewport",
    "data-radix-dropdown-menu-trigger",
    "data-radix-dropdown-menu-content",
    "data-radix-popover-trigger",
    "data-radix-popover-content",
    "data-radix-dialog-trigger",
    "data-radix-dialog-content",
    // Other component library markers
    "data-slot",
    "data-component",
    "data-part",
    "data-theme",
];

/// Prefixes of attribute names that are framework noise regardless of value
/// (hydration/SSR markers, inline style, the generic class attribute).
pub const UNSTABLE_ATTRIBUTE_PREFIXES: &[&str] = &[
    "style",
    "class",
    "data-reactid",
    "data-react-checksum",
    "data-react-root",
    "data-v-",
    "ng-",
    "data-ng-",
    "_ngcontent",
    "_nghost",
    "data-server-rendered",
    "data-ssr",
    "data-hydrated",
    "data-emotion",
    "data-styled",
];

static UNSTABLE_CLASS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // CSS-in-JS hashes
        r"^css-\w+",
        r"^sc-\w+",
        r"^jsx-\d+",
        r"^emotion-\w+",
        r"^styled-\w+",
        // Generated names
        r"^_\w+",
        r"\d{4,}",
        r"^[a-fA-F0-9]{6,}$",
        // Utility/atomic prefixes, too generic to anchor on
        r"^(p|m|w|h|text|bg|border|flex|grid|absolute|relative|fixed)-",
        // Library and build-tool namespaces
        r"^(radix|react|vue|ng|chakra|mantine)-",
        r"^(vite|webpack|parcel)-",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("class pattern"))
    .collect()
});

static GENERATED_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(__|\d|react-|ng-|vue-|css-|sc-|jsx-)").expect("id pattern"));

/// What kind of token is being judged.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Attribute,
    Class,
    Id,
}

/// Priority rank of an attribute name, if it is on the allowlist.
pub fn attribute_rank(name: &str) -> Option<usize> {
    PRIORITY_ATTRIBUTES.iter().position(|&a| a == name)
}

/// Whether an attribute name is denylisted framework noise.
pub fn is_unstable_attribute(name: &str) -> bool {
    UNSTABLE_ATTRIBUTE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

pub fn is_durable_class(class: &str) -> bool {
    class.len() >= 2
        && !UNSTABLE_CLASS_PATTERNS
            .iter()
            .any(|pattern| pattern.is_match(class))
}

pub fn is_durable_id(id: &str) -> bool {
    !id.is_empty() && !GENERATED_ID_PATTERN.is_match(id)
}

/// The single durability judgement, applied wherever attribute/class/id
/// stability is evaluated.
pub fn is_durable(token: &str, kind: TokenKind) -> bool {
    match kind {
        TokenKind::Attribute => !is_unstable_attribute(token) && attribute_rank(token).is_some(),
        TokenKind::Class => is_durable_class(token),
        TokenKind::Id => is_durable_id(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_outrank_everything() {
        let testid = attribute_rank("data-testid").unwrap();
        let aria = attribute_rank("aria-label").unwrap();
        let name = attribute_rank("name").unwrap();
        let state = attribute_rank("data-state").unwrap();
        assert!(testid < aria);
        assert!(aria < name);
        assert!(name < state);
        assert_eq!(attribute_rank("data-random"), None);
    }

    #[test]
    fn denylist_is_prefix_matched() {
        assert!(is_unstable_attribute("style"));
        assert!(is_unstable_attribute("class"));
        assert!(is_unstable_attribute("data-v-123abc"));
        assert!(is_unstable_attribute("ng-controller"));
        assert!(is_unstable_attribute("_ngcontent-c4"));
        assert!(!is_unstable_attribute("data-testid"));
        assert!(!is_unstable_attribute("aria-label"));
    }

    #[test]
    fn css_in_js_classes_are_rejected() {
        assert!(!is_durable_class("css-1q2w3e"));
        assert!(!is_durable_class("sc-bdnxRM"));
        assert!(!is_durable_class("jsx-382910"));
        assert!(!is_durable_class("emotion-0"));
        assert!(!is_durable_class("styled-button"));
    }

    #[test]
    fn generated_and_hashed_classes_are_rejected() {
        assert!(!is_durable_class("_internal"));
        assert!(!is_durable_class("a1b2c3d4"));
        assert!(!is_durable_class("deadbeef"));
        assert!(!is_durable_class("c1234"));
        assert!(!is_durable_class("x"));
    }

    #[test]
    fn utility_prefixes_are_rejected_but_plain_names_pass() {
        assert!(!is_durable_class("p-4"));
        assert!(!is_durable_class("bg-white"));
        assert!(!is_durable_class("flex-row"));
        assert!(!is_durable_class("radix-dropdown"));
        assert!(!is_durable_class("vite-plugin"));
        assert!(is_durable_class("sidebar"));
        assert!(is_durable_class("login-form"));
        assert!(is_durable_class("inline-flex"));
        assert!(is_durable_class("items-center"));
        assert!(is_durable_class("rounded-md"));
    }

    #[test]
    fn id_durability() {
        assert!(is_durable_id("submit"));
        assert!(is_durable_id("main-nav"));
        assert!(!is_durable_id("__private"));
        assert!(!is_durable_id("42abc"));
        assert!(!is_durable_id("react-select-2-input"));
        assert!(!is_durable_id(""));
    }

    #[test]
    fn unified_judgement_matches_the_specific_ones() {
        assert!(is_durable("data-testid", TokenKind::Attribute));
        assert!(!is_durable("style", TokenKind::Attribute));
        assert!(!is_durable("data-unknown", TokenKind::Attribute));
        assert!(is_durable("sidebar", TokenKind::Class));
        assert!(is_durable("submit", TokenKind::Id));
    }
}
