//! Operator payloads and the per-kind rendering capability.
//!
//! Traversal code never matches on operator kinds: everything it needs goes
//! through [`ExplainOperator`]. A new kind is one payload type, one trait impl,
//! and one [`Operator`] variant.

mod cte;
mod dml;
mod explain;
mod join;
mod point;
mod reader;
mod scan;
mod unary;

pub use cte::{ColumnRemap, CteReader};
pub use dml::{Dml, DmlKind};
pub use explain::Explain;
pub use join::{Apply, HashJoin, IndexJoin, IndexJoinKind, JoinType, MergeJoin};
pub use point::{BatchPointGet, PointGet, TableDual};
pub use reader::{IndexLookUp, IndexReader, TableReader};
pub use scan::{IndexScan, TableScan, TableScanKind};
pub use unary::{
    AggMode, Aggregation, Limit, MaxOneRow, Projection, ProjectionItem, Selection, Sort, TopN,
    Union,
};

use crate::{
    config::InListPolicy,
    normalize::NormalizeError,
    plan::{AccessObject, CteId, PlanChild},
};

///
/// ChildShape
///
/// Child arity and role labelling an operator accepts.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ChildShape {
    /// No children.
    Leaf,
    /// Exactly one unlabelled child.
    Unary,
    /// Exactly two children: one `Build`, one `Probe`.
    Joined,
    /// One or more unlabelled children.
    AtLeastOne,
    /// Zero or one unlabelled child.
    Optional,
}

impl ChildShape {
    #[must_use]
    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Self::Leaf => "no children",
            Self::Unary => "exactly one child",
            Self::Joined => "one Build and one Probe child",
            Self::AtLeastOne => "at least one child",
            Self::Optional => "at most one child",
        }
    }
}

///
/// OperatorContext
///
/// What an operator may see beyond its own payload while rendering info.
///

pub(crate) struct OperatorContext<'a> {
    pub(crate) children: &'a [PlanChild],
    pub(crate) show_ids: bool,
    pub(crate) in_list: InListPolicy,
    /// First-visit label of the CTE this operator references, if any.
    pub(crate) cte_label: Option<usize>,
}

impl OperatorContext<'_> {
    /// `TableRangeScan_5`, or `TableRangeScan` when ids are hidden.
    pub(crate) fn child_label(&self, index: usize) -> Option<String> {
        self.children
            .get(index)
            .map(|child| child.node.label(self.show_ids))
    }

    pub(crate) fn cte_name(&self) -> Option<String> {
        self.cte_label.map(cte_name)
    }
}

/// Stable display label of a CTE definition.
#[must_use]
pub(crate) fn cte_name(label: usize) -> String {
    format!("CTE_{label}")
}

///
/// ExplainOperator
///
/// Rendering capability every operator kind implements: display info keeps
/// literals verbatim, normalized info abstracts them.
///

pub(crate) trait ExplainOperator {
    fn name(&self) -> &'static str;

    fn access_object(&self) -> Option<AccessObject<'_>> {
        None
    }

    fn write_info(&self, cx: &OperatorContext<'_>, out: &mut String);

    /// Kinds without a normalization rule fail with `UnsupportedNodeKind`.
    fn write_normalized_info(
        &self,
        _cx: &OperatorContext<'_>,
        _out: &mut String,
    ) -> Result<(), NormalizeError> {
        Err(NormalizeError::UnsupportedNodeKind { kind: self.name() })
    }

    fn referenced_cte(&self) -> Option<CteId> {
        None
    }

    fn is_executable(&self) -> bool {
        true
    }

    fn child_shape(&self) -> ChildShape;
}

///
/// Operator
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    TableScan(TableScan),
    IndexScan(IndexScan),
    TableReader(TableReader),
    IndexReader(IndexReader),
    IndexLookUp(IndexLookUp),
    PointGet(PointGet),
    BatchPointGet(BatchPointGet),
    TableDual(TableDual),
    Selection(Selection),
    Projection(Projection),
    Aggregation(Aggregation),
    TopN(TopN),
    Limit(Limit),
    Sort(Sort),
    MaxOneRow(MaxOneRow),
    HashJoin(HashJoin),
    MergeJoin(MergeJoin),
    IndexJoin(IndexJoin),
    Apply(Apply),
    Union(Union),
    Dml(Dml),
    CteReader(CteReader),
    Explain(Explain),
}

impl Operator {
    pub(crate) fn as_explain(&self) -> &dyn ExplainOperator {
        match self {
            Self::TableScan(op) => op,
            Self::IndexScan(op) => op,
            Self::TableReader(op) => op,
            Self::IndexReader(op) => op,
            Self::IndexLookUp(op) => op,
            Self::PointGet(op) => op,
            Self::BatchPointGet(op) => op,
            Self::TableDual(op) => op,
            Self::Selection(op) => op,
            Self::Projection(op) => op,
            Self::Aggregation(op) => op,
            Self::TopN(op) => op,
            Self::Limit(op) => op,
            Self::Sort(op) => op,
            Self::MaxOneRow(op) => op,
            Self::HashJoin(op) => op,
            Self::MergeJoin(op) => op,
            Self::IndexJoin(op) => op,
            Self::Apply(op) => op,
            Self::Union(op) => op,
            Self::Dml(op) => op,
            Self::CteReader(op) => op,
            Self::Explain(op) => op,
        }
    }

    /// Operator name as rendered in explain output (`IndexRangeScan`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.as_explain().name()
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Operator {
                fn from(op: $variant) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from_payload!(
    TableScan,
    IndexScan,
    TableReader,
    IndexReader,
    IndexLookUp,
    PointGet,
    BatchPointGet,
    TableDual,
    Selection,
    Projection,
    Aggregation,
    TopN,
    Limit,
    Sort,
    MaxOneRow,
    HashJoin,
    MergeJoin,
    IndexJoin,
    Apply,
    Union,
    Dml,
    CteReader,
    Explain,
);
