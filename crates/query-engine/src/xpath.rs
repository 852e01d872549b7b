//! Path (XPath-style) expression parsing and matching.
//!
//! Supported shape: absolute and relative location paths over the child
//! (`/`) and descendant (`//`) axes, node tests of a tag name or `*`, and
//! predicates `[n]`, `[@attr]`, `[@attr=VALUE]`, `[contains(text(), VALUE)]`
//! and `[normalize-space(text())=VALUE]`. VALUE is a quoted literal or a
//! `concat(...)` of quoted literals, which is how generated expressions
//! carry values holding both quote kinds.

use std::collections::HashMap;

use page_tree::PageTree;
use pinpoint_core_types::NodeId;

use crate::cursor::Cursor;
use crate::errors::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeTest {
    Tag(String),
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    Ordinal(usize),
    AttrPresent(String),
    AttrEq(String, String),
    TextContains(String),
    TextEquals(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone)]
pub(crate) struct PathExpr {
    pub steps: Vec<Step>,
}

pub(crate) fn parse(input: &str) -> Result<PathExpr, QueryError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_ws();
    if cursor.peek() != Some('/') {
        return Err(cursor.error("a path expression must start with '/'".to_string()));
    }
    let mut steps = Vec::new();
    while cursor.peek() == Some('/') {
        cursor.bump();
        let axis = if cursor.peek() == Some('/') {
            cursor.bump();
            Axis::Descendant
        } else {
            Axis::Child
        };
        steps.push(parse_step(&mut cursor, axis)?);
    }
    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(cursor.error("trailing characters after path".to_string()));
    }
    if steps.is_empty() {
        return Err(cursor.error("empty path".to_string()));
    }
    Ok(PathExpr { steps })
}

fn parse_step(cursor: &mut Cursor, axis: Axis) -> Result<Step, QueryError> {
    let test = match cursor.peek() {
        Some('*') => {
            cursor.bump();
            NodeTest::Any
        }
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
            NodeTest::Tag(cursor.ident()?.to_ascii_lowercase())
        }
        _ => return Err(cursor.error("expected a tag name or '*'".to_string())),
    };
    let mut predicates = Vec::new();
    while cursor.peek() == Some('[') {
        cursor.bump();
        cursor.skip_ws();
        predicates.push(parse_predicate(cursor)?);
        cursor.skip_ws();
        cursor.expect(']')?;
    }
    Ok(Step {
        axis,
        test,
        predicates,
    })
}

fn parse_predicate(cursor: &mut Cursor) -> Result<Predicate, QueryError> {
    match cursor.peek() {
        Some(c) if c.is_ascii_digit() => Ok(Predicate::Ordinal(cursor.integer()?)),
        Some('@') => {
            cursor.bump();
            let name = cursor.ident()?;
            cursor.skip_ws();
            if cursor.peek() == Some('=') {
                cursor.bump();
                cursor.skip_ws();
                Ok(Predicate::AttrEq(name, parse_value(cursor)?))
            } else {
                Ok(Predicate::AttrPresent(name))
            }
        }
        _ => {
            if cursor.eat_keyword("contains(text(),") {
                cursor.skip_ws();
                let value = parse_value(cursor)?;
                cursor.skip_ws();
                cursor.expect(')')?;
                Ok(Predicate::TextContains(value))
            } else if cursor.eat_keyword("normalize-space(text())") {
                cursor.skip_ws();
                cursor.expect('=')?;
                cursor.skip_ws();
                Ok(Predicate::TextEquals(parse_value(cursor)?))
            } else {
                Err(cursor.error("unsupported predicate".to_string()))
            }
        }
    }
}

fn parse_value(cursor: &mut Cursor) -> Result<String, QueryError> {
    if cursor.eat_keyword("concat(") {
        let mut value = String::new();
        loop {
            cursor.skip_ws();
            value.push_str(&cursor.quoted_string()?);
            cursor.skip_ws();
            match cursor.bump() {
                Some(',') => continue,
                Some(')') => return Ok(value),
                _ => return Err(cursor.error("malformed concat()".to_string())),
            }
        }
    }
    cursor.quoted_string()
}

// --- matching ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Document,
    Node(NodeId),
}

pub(crate) fn select(tree: &PageTree, path: &PathExpr) -> Vec<NodeId> {
    let mut contexts = vec![Ctx::Document];
    for step in &path.steps {
        let mut next: Vec<NodeId> = Vec::new();
        for &ctx in &contexts {
            let parents: Vec<Ctx> = match step.axis {
                Axis::Child => vec![ctx],
                Axis::Descendant => descendant_or_self(tree, ctx),
            };
            for parent in parents {
                let mut matched: Vec<NodeId> = children_of(tree, parent)
                    .into_iter()
                    .filter(|&id| test_matches(tree, id, &step.test))
                    .collect();
                for predicate in &step.predicates {
                    matched = apply_predicate(tree, matched, predicate);
                }
                next.extend(matched);
            }
        }
        dedup_in_order(&mut next);
        contexts = next.into_iter().map(Ctx::Node).collect();
        if contexts.is_empty() {
            return Vec::new();
        }
    }

    let order: HashMap<NodeId, usize> = tree
        .document_order()
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();
    let mut result: Vec<NodeId> = contexts
        .into_iter()
        .filter_map(|ctx| match ctx {
            Ctx::Node(id) => Some(id),
            Ctx::Document => None,
        })
        .collect();
    result.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
    result
}

fn children_of(tree: &PageTree, ctx: Ctx) -> Vec<NodeId> {
    match ctx {
        Ctx::Document => vec![tree.root()],
        Ctx::Node(id) => tree.children(id).to_vec(),
    }
}

fn descendant_or_self(tree: &PageTree, ctx: Ctx) -> Vec<Ctx> {
    match ctx {
        Ctx::Document => {
            let mut out = vec![Ctx::Document];
            out.extend(tree.document_order().into_iter().map(Ctx::Node));
            out
        }
        Ctx::Node(id) => subtree(tree, id).into_iter().map(Ctx::Node).collect(),
    }
}

fn subtree(tree: &PageTree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(n) = stack.pop() {
        out.push(n);
        for &child in tree.children(n).iter().rev() {
            stack.push(child);
        }
    }
    out
}

fn test_matches(tree: &PageTree, id: NodeId, test: &NodeTest) -> bool {
    match test {
        NodeTest::Any => true,
        NodeTest::Tag(tag) => tree.tag(id) == tag,
    }
}

fn apply_predicate(tree: &PageTree, matched: Vec<NodeId>, predicate: &Predicate) -> Vec<NodeId> {
    match predicate {
        Predicate::Ordinal(n) => matched.get(n.wrapping_sub(1)).map_or(Vec::new(), |&id| vec![id]),
        Predicate::AttrPresent(name) => matched
            .into_iter()
            .filter(|&id| tree.has_attr(id, name))
            .collect(),
        Predicate::AttrEq(name, value) => matched
            .into_iter()
            .filter(|&id| tree.attr(id, name) == Some(value.as_str()))
            .collect(),
        Predicate::TextContains(value) => matched
            .into_iter()
            .filter(|&id| tree.direct_text(id).contains(value.as_str()))
            .collect(),
        Predicate::TextEquals(value) => matched
            .into_iter()
            .filter(|&id| normalize_space(&tree.direct_text(id)) == normalize_space(value))
            .collect(),
    }
}

fn normalize_space(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn dedup_in_order(ids: &mut Vec<NodeId>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}
