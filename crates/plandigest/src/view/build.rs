use super::{DisplayNode, DisplayRuntime, DisplayTree, cte::CteTable};
use crate::{
    config::Config,
    normalize::NormalizeError,
    plan::{ChildRole, CteDefinition, CteId, OperatorContext, PlanNode, cte_name},
};
use std::convert::Infallible;

const NON_RECURSIVE_CTE: &str = "Non-Recursive CTE";
const RECURSIVE_CTE: &str = "Recursive CTE";
const MISSING_CTE: &str = "definition missing";

///
/// Render
///
/// Fills the text columns of one node. The walker owns structure (names,
/// roles, children, CTE scheduling); a renderer owns what each column says.
///

trait Render {
    type Error;

    fn show_ids(&self) -> bool;

    fn config(&self) -> &Config;

    fn node(
        &self,
        node: &PlanNode,
        cx: &OperatorContext<'_>,
        out: &mut DisplayNode,
    ) -> Result<(), Self::Error>;

    fn cte(&self, definition: &CteDefinition, out: &mut DisplayNode);

    /// A referenced CTE that `ctes` does not define.
    fn missing_cte(&self, cte: CteId, out: &mut DisplayNode) -> Result<(), Self::Error>;
}

///
/// Concrete
///
/// Literals, estimates, and runtime stats verbatim.
///

struct Concrete<'a> {
    config: &'a Config,
    show_ids: bool,
}

impl Concrete<'_> {
    fn estimate(&self, value: f64) -> String {
        let precision = self.config.est_rows_precision;
        format!("{value:.precision$}")
    }
}

impl Render for Concrete<'_> {
    type Error = Infallible;

    fn show_ids(&self) -> bool {
        self.show_ids
    }

    fn config(&self) -> &Config {
        self.config
    }

    fn node(
        &self,
        node: &PlanNode,
        cx: &OperatorContext<'_>,
        out: &mut DisplayNode,
    ) -> Result<(), Infallible> {
        let op = node.explain();

        out.est_rows = self.estimate(node.est_rows());
        out.est_cost = node
            .est_cost()
            .map(|cost| self.estimate(cost))
            .unwrap_or_default();
        if let Some(access) = op.access_object() {
            access.write_display(&mut out.access_object);
        }
        op.write_info(cx, &mut out.operator_info);
        out.runtime = node.runtime().map(DisplayRuntime::from_stats);

        Ok(())
    }

    fn cte(&self, definition: &CteDefinition, out: &mut DisplayNode) {
        out.est_rows = self.estimate(definition.seed.est_rows());
        out.operator_info = cte_kind(definition).to_string();
    }

    // Shown as a bodiless root so the reference still resolves to a label.
    fn missing_cte(&self, _cte: CteId, out: &mut DisplayNode) -> Result<(), Infallible> {
        out.operator_info = MISSING_CTE.to_string();

        Ok(())
    }
}

///
/// Normalized
///
/// Structural columns only: no ids, estimates, or runtime stats, and every
/// literal abstracted.
///

struct Normalized<'a> {
    config: &'a Config,
}

impl Render for Normalized<'_> {
    type Error = NormalizeError;

    fn show_ids(&self) -> bool {
        false
    }

    fn config(&self) -> &Config {
        self.config
    }

    fn node(
        &self,
        node: &PlanNode,
        cx: &OperatorContext<'_>,
        out: &mut DisplayNode,
    ) -> Result<(), NormalizeError> {
        let op = node.explain();

        if let Some(access) = op.access_object() {
            access.write_normalized(&mut out.access_object);
        }
        op.write_normalized_info(cx, &mut out.operator_info)
    }

    fn cte(&self, definition: &CteDefinition, out: &mut DisplayNode) {
        out.operator_info = cte_kind(definition).to_string();
    }

    fn missing_cte(&self, cte: CteId, _out: &mut DisplayNode) -> Result<(), NormalizeError> {
        Err(NormalizeError::DanglingCte { cte })
    }
}

const fn cte_kind(definition: &CteDefinition) -> &'static str {
    if definition.is_recursive() {
        RECURSIVE_CTE
    } else {
        NON_RECURSIVE_CTE
    }
}

///
/// Walker
///

struct Walker<'a, R> {
    render: &'a R,
    ctes: &'a [CteDefinition],
    visited: CteTable,
}

impl<'a, R: Render> Walker<'a, R> {
    fn new(render: &'a R, ctes: &'a [CteDefinition]) -> Self {
        Self {
            render,
            ctes,
            visited: CteTable::new(),
        }
    }

    fn run(mut self, root: &PlanNode) -> Result<DisplayTree, R::Error> {
        let mut roots = vec![self.node(root, None)?];

        // Bodies may reference further CTEs; those join the queue behind them.
        while let Some((cte, label)) = self.visited.next_pending() {
            let root = match self.ctes.get(cte.index()) {
                Some(definition) => self.cte(definition, label)?,
                None => {
                    let mut out = Self::cte_root(label);
                    self.render.missing_cte(cte, &mut out)?;
                    out
                }
            };
            roots.push(root);
        }

        Ok(DisplayTree { roots })
    }

    fn node(&mut self, node: &PlanNode, role: Option<ChildRole>) -> Result<DisplayNode, R::Error> {
        let op = node.explain();
        let show_ids = self.render.show_ids();
        let cx = OperatorContext {
            children: node.children(),
            show_ids,
            in_list: self.render.config().in_list,
            cte_label: op.referenced_cte().map(|cte| self.visited.visit(cte)),
        };

        let mut out = DisplayNode::new(op.name(), role);
        out.id = show_ids.then(|| node.id().get());
        out.task = node.task().to_string();
        self.render.node(node, &cx, &mut out)?;

        out.children = node
            .children()
            .iter()
            .map(|child| self.node(&child.node, child.role))
            .collect::<Result<_, _>>()?;

        Ok(out)
    }

    fn cte_root(label: usize) -> DisplayNode {
        let mut out = DisplayNode::new(cte_name(label), None);
        out.task = "root".to_string();
        out
    }

    fn cte(&mut self, definition: &CteDefinition, label: usize) -> Result<DisplayNode, R::Error> {
        let mut out = Self::cte_root(label);
        self.render.cte(definition, &mut out);

        out.children.push(self.node(&definition.seed, Some(ChildRole::SeedPart))?);
        if let Some(recursive) = &definition.recursive {
            out.children
                .push(self.node(recursive, Some(ChildRole::RecursivePart))?);
        }

        Ok(out)
    }
}

/// Concrete presentation tree of `root`, literals and runtime stats included.
pub(crate) fn display_tree(
    root: &PlanNode,
    ctes: &[CteDefinition],
    config: &Config,
    show_ids: bool,
) -> DisplayTree {
    let render = Concrete { config, show_ids };
    match Walker::new(&render, ctes).run(root) {
        Ok(tree) => tree,
        Err(never) => match never {},
    }
}

/// Literal-free presentation tree of `root`.
pub(crate) fn normalized_tree(
    root: &PlanNode,
    ctes: &[CteDefinition],
    config: &Config,
) -> Result<DisplayTree, NormalizeError> {
    let render = Normalized { config };

    Walker::new(&render, ctes).run(root)
}
