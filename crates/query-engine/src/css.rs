//! Structural (CSS-style) selector parsing and matching.
//!
//! The grammar covers what the candidate generators emit plus the common
//! forms a user pastes into the tester: compound selectors of tag, `#id`,
//! `.class`, `[attr]`, `[attr="value"]`, `:nth-of-type(n)`, `:nth-child(n)`
//! and `:contains("text")`, combined with child (`>`) and descendant
//! (whitespace) combinators, optionally grouped by commas.

use page_tree::PageTree;
use pinpoint_core_types::NodeId;

use crate::cursor::Cursor;
use crate::errors::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SimplePart {
    Id(String),
    Class(String),
    AttrPresent(String),
    AttrEq(String, String),
    NthOfType(usize),
    NthChild(usize),
    Contains(String),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Compound {
    pub tag: Option<String>,
    pub parts: Vec<SimplePart>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.parts.is_empty()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Chain {
    pub compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
    pub combinators: Vec<Combinator>,
}

#[derive(Debug, Clone)]
pub(crate) struct SelectorGroup {
    pub chains: Vec<Chain>,
}

pub(crate) fn parse(input: &str) -> Result<SelectorGroup, QueryError> {
    let mut cursor = Cursor::new(input);
    let mut chains = Vec::new();
    loop {
        chains.push(parse_chain(&mut cursor)?);
        cursor.skip_ws();
        if cursor.at_end() {
            break;
        }
        cursor.expect(',')?;
    }
    Ok(SelectorGroup { chains })
}

fn parse_chain(cursor: &mut Cursor) -> Result<Chain, QueryError> {
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    cursor.skip_ws();
    compounds.push(parse_compound(cursor)?);
    loop {
        let mut saw_space = false;
        while matches!(cursor.peek(), Some(c) if c.is_whitespace()) {
            saw_space = true;
            cursor.bump();
        }
        match cursor.peek() {
            Some('>') => {
                cursor.bump();
                cursor.skip_ws();
                combinators.push(Combinator::Child);
                compounds.push(parse_compound(cursor)?);
            }
            Some(c) if saw_space && is_compound_start(c) => {
                combinators.push(Combinator::Descendant);
                compounds.push(parse_compound(cursor)?);
            }
            _ => break,
        }
    }
    Ok(Chain {
        compounds,
        combinators,
    })
}

fn is_compound_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '#' | '.' | '[' | ':' | '*' | '_' | '\\')
}

fn parse_compound(cursor: &mut Cursor) -> Result<Compound, QueryError> {
    let mut compound = Compound::default();
    if let Some(c) = cursor.peek() {
        if c == '*' {
            cursor.bump();
            compound.tag = Some("*".to_string());
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '\\' {
            compound.tag = Some(cursor.ident()?.to_ascii_lowercase());
        }
    }
    loop {
        match cursor.peek() {
            Some('#') => {
                cursor.bump();
                compound.parts.push(SimplePart::Id(cursor.ident()?));
            }
            Some('.') => {
                cursor.bump();
                compound.parts.push(SimplePart::Class(cursor.ident()?));
            }
            Some('[') => {
                cursor.bump();
                cursor.skip_ws();
                let name = cursor.ident()?;
                cursor.skip_ws();
                if cursor.peek() == Some('=') {
                    cursor.bump();
                    cursor.skip_ws();
                    let value = match cursor.peek() {
                        Some('"' | '\'') => cursor.quoted_string()?,
                        _ => bare_attr_value(cursor)?,
                    };
                    cursor.skip_ws();
                    cursor.expect(']')?;
                    compound.parts.push(SimplePart::AttrEq(name, value));
                } else {
                    cursor.expect(']')?;
                    compound.parts.push(SimplePart::AttrPresent(name));
                }
            }
            Some(':') => {
                cursor.bump();
                compound.parts.push(parse_pseudo(cursor)?);
            }
            _ => break,
        }
    }
    if compound.is_empty() {
        return Err(cursor.error("expected a selector".to_string()));
    }
    Ok(compound)
}

fn bare_attr_value(cursor: &mut Cursor) -> Result<String, QueryError> {
    let mut value = String::new();
    while let Some(c) = cursor.peek() {
        if c == ']' || c.is_whitespace() {
            break;
        }
        value.push(c);
        cursor.bump();
    }
    if value.is_empty() {
        return Err(cursor.error("expected an attribute value".to_string()));
    }
    Ok(value)
}

fn parse_pseudo(cursor: &mut Cursor) -> Result<SimplePart, QueryError> {
    let name = cursor.ident()?;
    match name.as_str() {
        "nth-of-type" | "nth-child" => {
            cursor.expect('(')?;
            cursor.skip_ws();
            let n = cursor.integer()?;
            cursor.skip_ws();
            cursor.expect(')')?;
            if name == "nth-of-type" {
                Ok(SimplePart::NthOfType(n))
            } else {
                Ok(SimplePart::NthChild(n))
            }
        }
        "contains" => {
            cursor.expect('(')?;
            cursor.skip_ws();
            let text = cursor.quoted_string()?;
            cursor.skip_ws();
            cursor.expect(')')?;
            Ok(SimplePart::Contains(text))
        }
        other => Err(cursor.error(format!("unsupported pseudo-class ':{other}'"))),
    }
}

// --- matching ---

pub(crate) fn select(tree: &PageTree, group: &SelectorGroup) -> Vec<NodeId> {
    tree.document_order()
        .into_iter()
        .filter(|&id| group.chains.iter().any(|c| matches_chain(tree, id, c)))
        .collect()
}

fn matches_chain(tree: &PageTree, id: NodeId, chain: &Chain) -> bool {
    let last = chain.compounds.len() - 1;
    if !matches_compound(tree, id, &chain.compounds[last]) {
        return false;
    }
    matches_leftward(tree, id, chain, last)
}

fn matches_leftward(tree: &PageTree, node: NodeId, chain: &Chain, idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    let target = idx - 1;
    match chain.combinators[target] {
        Combinator::Child => match tree.parent(node) {
            Some(parent) => {
                matches_compound(tree, parent, &chain.compounds[target])
                    && matches_leftward(tree, parent, chain, target)
            }
            None => false,
        },
        Combinator::Descendant => tree.ancestors(node).any(|ancestor| {
            matches_compound(tree, ancestor, &chain.compounds[target])
                && matches_leftward(tree, ancestor, chain, target)
        }),
    }
}

fn matches_compound(tree: &PageTree, id: NodeId, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag {
        if tag != "*" && tree.tag(id) != tag {
            return false;
        }
    }
    compound.parts.iter().all(|part| match part {
        SimplePart::Id(value) => tree.id_attr(id) == Some(value.as_str()),
        SimplePart::Class(value) => tree.has_class(id, value),
        SimplePart::AttrPresent(name) => tree.has_attr(id, name),
        SimplePart::AttrEq(name, value) => tree.attr(id, name) == Some(value.as_str()),
        SimplePart::NthOfType(n) => tree.same_tag_ordinal(id) == *n,
        SimplePart::NthChild(n) => nth_child(tree, id) == *n,
        SimplePart::Contains(text) => tree.full_text(id).contains(text.as_str()),
    })
}

fn nth_child(tree: &PageTree, id: NodeId) -> usize {
    match tree.parent(id) {
        Some(parent) => {
            tree.children(parent)
                .iter()
                .position(|&c| c == id)
                .unwrap_or(0)
                + 1
        }
        None => 1,
    }
}
