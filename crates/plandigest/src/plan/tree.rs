use crate::plan::{
    ChildRole, PlanChild, PlanId, PlanNode,
    operator::{ChildShape, Operator},
};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error as ThisError;
use tracing::instrument;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

///
/// TreeId
///
/// Process-unique identity of one finished tree. Two trees with equal
/// content still have distinct ids.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// CteId
///
/// Index into a tree's CTE arena.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CteId(usize);

impl CteId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cte#{}", self.0)
    }
}

///
/// CteDefinition
///
/// A shared CTE body, stored once and referenced by id from every
/// `CTEFullScan` site.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CteDefinition {
    pub seed: PlanNode,
    pub recursive: Option<PlanNode>,
}

impl CteDefinition {
    #[must_use]
    pub const fn new(seed: PlanNode) -> Self {
        Self {
            seed,
            recursive: None,
        }
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: PlanNode) -> Self {
        self.recursive = Some(recursive);
        self
    }

    #[must_use]
    pub const fn is_recursive(&self) -> bool {
        self.recursive.is_some()
    }

    fn bodies(&self) -> impl Iterator<Item = &PlanNode> {
        std::iter::once(&self.seed).chain(self.recursive.as_ref())
    }

    fn bodies_mut(&mut self) -> impl Iterator<Item = &mut PlanNode> {
        std::iter::once(&mut self.seed).chain(self.recursive.as_mut())
    }
}

///
/// PlanError
///

#[derive(Clone, Debug, Eq, ThisError, PartialEq)]
pub enum PlanError {
    #[error("{operator} references unregistered {cte}")]
    DanglingCte { operator: &'static str, cte: CteId },

    #[error("{operator} expects {expected}, found {found} child(ren)")]
    ChildArity {
        operator: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("{operator} child {index} has role {role:?}, expected {expected}")]
    ChildRole {
        operator: &'static str,
        index: usize,
        role: Option<ChildRole>,
        expected: &'static str,
    },

    #[error("{operator} may only wrap the root of a plan")]
    WrapperNotAtRoot { operator: &'static str },
}

///
/// PlanTreeBuilder
///
/// Collects CTE bodies, then freezes a root into a [`PlanTree`].
///

#[derive(Debug, Default)]
pub struct PlanTreeBuilder {
    ctes: Vec<CteDefinition>,
}

impl PlanTreeBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { ctes: Vec::new() }
    }

    /// Id the next registered CTE will receive; lets a recursive body
    /// reference itself.
    #[must_use]
    pub const fn next_cte_id(&self) -> CteId {
        CteId(self.ctes.len())
    }

    pub fn register_cte(&mut self, definition: CteDefinition) -> CteId {
        let id = self.next_cte_id();
        self.ctes.push(definition);

        id
    }

    /// Validate, number, and freeze the tree.
    ///
    /// Ids run in pre-order from 1: the main tree first, then each CTE body
    /// in registration order.
    #[instrument(name = "plandigest::plan::finish", level = "trace", skip_all)]
    pub fn finish(self, mut root: PlanNode) -> Result<PlanTree, PlanError> {
        let mut ctes = self.ctes;

        validate(&root, true, ctes.len())?;
        for body in ctes.iter().flat_map(CteDefinition::bodies) {
            validate(body, false, ctes.len())?;
        }

        let mut next = 1;
        assign_ids(&mut root, &mut next);
        for body in ctes.iter_mut().flat_map(CteDefinition::bodies_mut) {
            assign_ids(body, &mut next);
        }

        Ok(PlanTree {
            id: TreeId::next(),
            root,
            ctes,
        })
    }
}

fn validate(node: &PlanNode, is_root: bool, cte_count: usize) -> Result<(), PlanError> {
    let op = node.explain();
    let operator = op.name();

    if !op.is_executable() && !is_root {
        return Err(PlanError::WrapperNotAtRoot { operator });
    }
    if let Some(cte) = op.referenced_cte()
        && cte.index() >= cte_count
    {
        return Err(PlanError::DanglingCte { operator, cte });
    }

    validate_children(operator, op.child_shape(), node.children())?;

    node.children()
        .iter()
        .try_for_each(|child| validate(&child.node, false, cte_count))
}

fn validate_children(
    operator: &'static str,
    shape: ChildShape,
    children: &[PlanChild],
) -> Result<(), PlanError> {
    let found = children.len();
    let arity_ok = match shape {
        ChildShape::Leaf => found == 0,
        ChildShape::Unary => found == 1,
        ChildShape::Joined => found == 2,
        ChildShape::AtLeastOne => found >= 1,
        ChildShape::Optional => found <= 1,
    };
    if !arity_ok {
        return Err(PlanError::ChildArity {
            operator,
            expected: shape.describe(),
            found,
        });
    }

    if shape == ChildShape::Joined {
        let roles = (children[0].role, children[1].role);
        let ok = matches!(
            roles,
            (Some(ChildRole::Build), Some(ChildRole::Probe))
                | (Some(ChildRole::Probe), Some(ChildRole::Build))
        );
        if !ok {
            let index = usize::from(matches!(
                children[0].role,
                Some(ChildRole::Build | ChildRole::Probe)
            ));
            return Err(PlanError::ChildRole {
                operator,
                index,
                role: children[index].role,
                expected: "one Build and one Probe",
            });
        }
    } else if let Some((index, child)) = children
        .iter()
        .enumerate()
        .find(|(_, child)| child.role.is_some())
    {
        return Err(PlanError::ChildRole {
            operator,
            index,
            role: child.role,
            expected: "no role",
        });
    }

    Ok(())
}

fn assign_ids(node: &mut PlanNode, next: &mut u32) {
    node.set_id(PlanId(*next));
    *next += 1;
    for child in node.children_mut() {
        assign_ids(&mut child.node, next);
    }
}

///
/// PlanTree
///
/// A finished, immutable plan plus the CTE bodies it references.
///

#[derive(Clone, Debug)]
pub struct PlanTree {
    id: TreeId,
    root: PlanNode,
    ctes: Vec<CteDefinition>,
}

impl PlanTree {
    /// Freeze a tree without CTEs.
    pub fn new(root: PlanNode) -> Result<Self, PlanError> {
        PlanTreeBuilder::new().finish(root)
    }

    #[must_use]
    pub const fn id(&self) -> TreeId {
        self.id
    }

    #[must_use]
    pub const fn root(&self) -> &PlanNode {
        &self.root
    }

    #[must_use]
    pub fn ctes(&self) -> &[CteDefinition] {
        &self.ctes
    }

    #[must_use]
    pub fn cte(&self, id: CteId) -> Option<&CteDefinition> {
        self.ctes.get(id.index())
    }

    /// The executable plan: the root itself, or the plan an `Explain`
    /// wrapper holds.
    #[must_use]
    pub fn target(&self) -> &PlanNode {
        if matches!(self.root.operator(), Operator::Explain(_))
            && let Some(child) = self.root.children().first()
        {
            return &child.node;
        }

        &self.root
    }

    /// Unwrap an `Explain` root into a tree of its own; executable roots
    /// are returned unchanged. An unwrapped tree gets a fresh identity.
    #[must_use]
    pub fn into_target(self) -> Self {
        let Self { id, mut root, ctes } = self;
        if matches!(root.operator(), Operator::Explain(_))
            && let Some(child) = root.take_last_child()
        {
            return Self {
                id: TreeId::next(),
                root: child.node,
                ctes,
            };
        }

        Self { id, root, ctes }
    }
}
