use crate::plan::{
    RuntimeStats,
    operator::{ExplainOperator, Operator},
};
use serde::Serialize;
use std::fmt;

///
/// PlanId
///
/// Per-tree node number assigned by [`PlanTreeBuilder::finish`](crate::PlanTreeBuilder::finish).
/// Display only; never compared across trees.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PlanId(pub(crate) u32);

impl PlanId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// StoreType
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreType {
    TiKv,
    TiFlash,
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TiKv => "tikv",
            Self::TiFlash => "tiflash",
        })
    }
}

///
/// TaskType
///
/// Where a node executes. Part of the plan shape.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TaskType {
    /// Coordinator side.
    #[default]
    Root,
    /// Coprocessor pushdown into a storage engine.
    Cop(StoreType),
    /// Massively parallel processing on a columnar engine.
    Mpp(StoreType),
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Cop(store) => write!(f, "cop[{store}]"),
            Self::Mpp(store) => write!(f, "mpp[{store}]"),
        }
    }
}

///
/// ChildRole
///
/// Role label a parent gives a child. Labels are part of the plan shape:
/// swapping `Build` and `Probe` yields a different plan.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ChildRole {
    Build,
    Probe,
    #[serde(rename = "Seed Part")]
    SeedPart,
    #[serde(rename = "Recursive Part")]
    RecursivePart,
}

impl ChildRole {
    pub const ALL: [Self; 4] = [Self::Build, Self::Probe, Self::SeedPart, Self::RecursivePart];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Build => "Build",
            Self::Probe => "Probe",
            Self::SeedPart => "Seed Part",
            Self::RecursivePart => "Recursive Part",
        }
    }

    /// Inverse of [`ChildRole::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.label() == label)
    }
}

impl fmt::Display for ChildRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// PlanChild
///

#[derive(Clone, Debug, PartialEq)]
pub struct PlanChild {
    pub role: Option<ChildRole>,
    pub node: PlanNode,
}

///
/// PlanNode
///
/// One physical operator instance. Built bottom-up by the optimizer, then
/// frozen inside a [`PlanTree`](crate::PlanTree).
///

#[derive(Clone, Debug, PartialEq)]
pub struct PlanNode {
    id: PlanId,
    operator: Operator,
    task: TaskType,
    est_rows: f64,
    est_cost: Option<f64>,
    children: Vec<PlanChild>,
    runtime: Option<RuntimeStats>,
}

impl PlanNode {
    #[must_use]
    pub fn new(operator: impl Into<Operator>) -> Self {
        Self {
            id: PlanId::default(),
            operator: operator.into(),
            task: TaskType::Root,
            est_rows: 0.0,
            est_cost: None,
            children: Vec::new(),
            runtime: None,
        }
    }

    #[must_use]
    pub const fn with_task(mut self, task: TaskType) -> Self {
        self.task = task;
        self
    }

    #[must_use]
    pub const fn with_est_rows(mut self, est_rows: f64) -> Self {
        self.est_rows = est_rows;
        self
    }

    #[must_use]
    pub const fn with_est_cost(mut self, est_cost: f64) -> Self {
        self.est_cost = Some(est_cost);
        self
    }

    #[must_use]
    pub fn with_child(self, child: Self) -> Self {
        self.with_labelled_child(None, child)
    }

    #[must_use]
    pub fn with_build(self, child: Self) -> Self {
        self.with_labelled_child(Some(ChildRole::Build), child)
    }

    #[must_use]
    pub fn with_probe(self, child: Self) -> Self {
        self.with_labelled_child(Some(ChildRole::Probe), child)
    }

    #[must_use]
    pub fn with_labelled_child(mut self, role: Option<ChildRole>, child: Self) -> Self {
        self.children.push(PlanChild { role, node: child });
        self
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: RuntimeStats) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub const fn id(&self) -> PlanId {
        self.id
    }

    #[must_use]
    pub const fn operator(&self) -> &Operator {
        &self.operator
    }

    #[must_use]
    pub const fn task(&self) -> TaskType {
        self.task
    }

    #[must_use]
    pub const fn est_rows(&self) -> f64 {
        self.est_rows
    }

    #[must_use]
    pub const fn est_cost(&self) -> Option<f64> {
        self.est_cost
    }

    #[must_use]
    pub fn children(&self) -> &[PlanChild] {
        &self.children
    }

    #[must_use]
    pub const fn runtime(&self) -> Option<&RuntimeStats> {
        self.runtime.as_ref()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.operator.name()
    }

    pub(crate) fn explain(&self) -> &dyn ExplainOperator {
        self.operator.as_explain()
    }

    /// `IndexRangeScan_5`, or the bare name when ids are hidden.
    pub(crate) fn label(&self, show_ids: bool) -> String {
        if show_ids {
            format!("{}_{}", self.name(), self.id)
        } else {
            self.name().to_string()
        }
    }

    pub(crate) const fn set_id(&mut self, id: PlanId) {
        self.id = id;
    }

    pub(crate) fn children_mut(&mut self) -> &mut [PlanChild] {
        &mut self.children
    }

    pub(crate) fn take_last_child(&mut self) -> Option<PlanChild> {
        self.children.pop()
    }
}
