//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use page_tree::PageTree;
use picker_session::PickerEngine;
use pinpoint_core_types::{Dialect, NodeId};
use point_resolve::resolve_point;
use serde::Serialize;
use tracing::info;

use crate::config::load_policies;

#[derive(Parser, Debug)]
#[command(
    name = "pinpoint",
    version,
    about = "Durable element locators and resilient point resolution"
)]
pub struct Cli {
    /// Policy override file (TOML or JSON).
    #[arg(long, global = true)]
    pub policy: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize ranked locators for a node of a page snapshot.
    Synth {
        /// Page snapshot JSON.
        #[arg(long)]
        snapshot: PathBuf,
        /// Expression that selects the target node (first match wins).
        #[arg(long, conflicts_with = "at")]
        expr: Option<String>,
        /// Viewport point "x,y" to resolve into the target node.
        #[arg(long)]
        at: Option<String>,
    },
    /// Test an expression against a page snapshot.
    Test {
        #[arg(long)]
        snapshot: PathBuf,
        /// The expression to test.
        #[arg(long)]
        expr: String,
        /// Dialect: "structural" or "path"; guessed from the expression
        /// when omitted.
        #[arg(long)]
        dialect: Option<String>,
    },
    /// Resolve the node under a viewport point.
    Resolve {
        #[arg(long)]
        snapshot: PathBuf,
        /// Viewport point "x,y".
        #[arg(long)]
        at: String,
    },
}

#[derive(Serialize)]
struct SynthReport<'a> {
    generated_at: DateTime<Utc>,
    target: NodeId,
    tag: &'a str,
    locators: &'a locator_synth::LocatorSet,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    generated_at: DateTime<Utc>,
    resolved: Option<ResolvedNode<'a>>,
}

#[derive(Serialize)]
struct ResolvedNode<'a> {
    node: NodeId,
    tag: &'a str,
    id: Option<&'a str>,
    absolute_path: String,
}

pub fn run(cli: Cli) -> Result<()> {
    let policies = load_policies(cli.policy.as_deref())?;

    match cli.command {
        Command::Synth { snapshot, expr, at } => {
            let tree = load_snapshot(&snapshot)?;
            let engine = PickerEngine::new(tree, policies);
            let target = select_target(&engine, expr.as_deref(), at.as_deref())?;
            let locators = engine.synthesize_for_node(target);
            info!(node = %target, best = locators.best.len(), "synthesis complete");
            let report = SynthReport {
                generated_at: Utc::now(),
                target,
                tag: engine.tree().tag(target),
                locators: &locators,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Test {
            snapshot,
            expr,
            dialect,
        } => {
            let tree = load_snapshot(&snapshot)?;
            let dialect = parse_dialect(dialect.as_deref(), &expr)?;
            let outcome = query_engine::test_expression(&tree, &expr, dialect);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Resolve { snapshot, at } => {
            let mut tree = load_snapshot(&snapshot)?;
            let (x, y) = parse_point(&at)?;
            let resolved = resolve_point(&mut tree, x, y, &policies.resolve);
            let report = ResolveReport {
                generated_at: Utc::now(),
                resolved: resolved.map(|node| ResolvedNode {
                    node,
                    tag: tree.tag(node),
                    id: tree.id_attr(node),
                    absolute_path: locator_synth::absolute_path_expression(&tree, node),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<PageTree> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    PageTree::from_json_str(&raw).map_err(|err| anyhow!("{err}"))
}

fn select_target(
    engine: &PickerEngine,
    expr: Option<&str>,
    at: Option<&str>,
) -> Result<NodeId> {
    if let Some(expr) = expr {
        let dialect = Dialect::detect(expr);
        let hits = query_engine::evaluate(engine.tree(), expr, dialect)
            .map_err(|err| anyhow!("target expression: {err}"))?;
        return hits
            .first()
            .copied()
            .ok_or_else(|| anyhow!("target expression matched nothing"));
    }
    if let Some(at) = at {
        let (x, y) = parse_point(at)?;
        // Clone the tree: resolution may momentarily toggle hit-testing and
        // the engine is borrowed shared here.
        let mut tree = engine.tree().clone();
        return resolve_point(&mut tree, x, y, &engine.policies().resolve)
            .ok_or_else(|| anyhow!("no node resolved at {x},{y}"));
    }
    bail!("pass --expr or --at to pick the target node");
}

fn parse_point(raw: &str) -> Result<(f64, f64)> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("expected \"x,y\", got {raw:?}"))?;
    Ok((
        x.trim().parse().context("parsing x coordinate")?,
        y.trim().parse().context("parsing y coordinate")?,
    ))
}

fn parse_dialect(raw: Option<&str>, expr: &str) -> Result<Dialect> {
    match raw {
        None => Ok(Dialect::detect(expr)),
        Some("structural") => Ok(Dialect::Structural),
        Some("path") => Ok(Dialect::Path),
        Some(other) => bail!("unknown dialect {other:?} (use \"structural\" or \"path\")"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("10,20").unwrap(), (10.0, 20.0));
        assert_eq!(parse_point(" 3.5 , 7 ").unwrap(), (3.5, 7.0));
        assert!(parse_point("10").is_err());
    }

    #[test]
    fn dialect_flag_wins_over_detection() {
        assert_eq!(
            parse_dialect(Some("path"), "button").unwrap(),
            Dialect::Path
        );
        assert_eq!(parse_dialect(None, "//button").unwrap(), Dialect::Path);
        assert_eq!(parse_dialect(None, "button").unwrap(), Dialect::Structural);
        assert!(parse_dialect(Some("css"), "button").is_err());
    }
}
