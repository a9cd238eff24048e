//! Presentation tree shared by explain output, the compact codec, and the
//! normalizer.
//!
//! A [`DisplayTree`] holds only rendered text: building one from a plan is
//! the single place operator payloads are read, and decoding produces the
//! same type, so `decode(encode(plan))` compares directly against it.

mod build;
mod cte;
mod draw;

#[cfg(test)]
mod tests;

pub(crate) use build::{display_tree, normalized_tree};

use crate::{
    config::Config,
    plan::{ChildRole, PlanTree, RuntimeStats},
};
use serde::Serialize;
use std::fmt;
use tracing::instrument;

///
/// ExplainFormat
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExplainFormat {
    /// Tab-separated table with node ids.
    #[default]
    Row,
    /// Space-separated rows without ids or header.
    Brief,
    /// Row format plus the `estCost` column.
    Verbose,
}

///
/// DisplayRuntime
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DisplayRuntime {
    pub act_rows: String,
    pub execution_info: String,
    pub memory: String,
    pub disk: String,
}

impl DisplayRuntime {
    pub(crate) fn from_stats(stats: &RuntimeStats) -> Self {
        Self {
            act_rows: stats.act_rows.to_string(),
            execution_info: stats.execution_info(),
            memory: stats.memory(),
            disk: stats.disk(),
        }
    }
}

///
/// DisplayNode
///
/// One rendered operator. Fields a source did not carry are empty strings.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DisplayNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ChildRole>,
    pub task: String,
    pub est_rows: String,
    pub est_cost: String,
    pub access_object: String,
    pub operator_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<DisplayRuntime>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl DisplayNode {
    pub(crate) fn new(name: impl Into<String>, role: Option<ChildRole>) -> Self {
        Self {
            name: name.into(),
            role,
            ..Self::default()
        }
    }

    /// `Selection_3(Build)`: name, id suffix, and role suffix.
    #[must_use]
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        if let Some(id) = self.id {
            label.push('_');
            label.push_str(&id.to_string());
        }
        if let Some(role) = self.role {
            label.push('(');
            label.push_str(role.label());
            label.push(')');
        }

        label
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

///
/// DisplayTree
///
/// The main plan first, then one extra root per CTE definition.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DisplayTree {
    pub roots: Vec<DisplayNode>,
}

impl DisplayTree {
    /// Pre-order iteration over every node of every root.
    #[must_use]
    pub fn nodes(&self) -> Vec<&DisplayNode> {
        let mut nodes = Vec::new();
        for root in &self.roots {
            root.visit(&mut |node| nodes.push(node));
        }

        nodes
    }

    #[must_use]
    pub fn has_runtime(&self) -> bool {
        self.nodes().iter().any(|node| node.runtime.is_some())
    }

    /// Render as explain rows in `format`.
    #[must_use]
    pub fn render(&self, format: ExplainFormat) -> String {
        draw::render(self, format)
    }
}

impl fmt::Display for DisplayTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(ExplainFormat::Row))
    }
}

/// Render `EXPLAIN` output for the tree's target plan.
#[must_use]
#[instrument(
    name = "plandigest::explain",
    level = "debug",
    skip(tree, config),
    fields(tree = tree.id().get())
)]
pub fn explain_plan(tree: &PlanTree, format: ExplainFormat, config: &Config) -> String {
    let show_ids = format != ExplainFormat::Brief;
    let view = display_tree(tree.target(), tree.ctes(), config, show_ids);

    view.render(format)
}
