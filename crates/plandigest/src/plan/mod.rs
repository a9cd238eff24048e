//! Physical plan model.
//!
//! A plan is built bottom-up from [`PlanNode`]s, then frozen by
//! [`PlanTreeBuilder::finish`] into an immutable [`PlanTree`] that owns its
//! shared CTE bodies. Consumers only ever read a finished tree.

mod access;
mod expr;
mod node;
mod operator;
mod range;
mod runtime;
mod tree;


pub use access::{AccessObject, IndexRef, TableRef};
pub use expr::{AggFunc, Column, Datum, Expr, ScalarFunc, SortItem};
pub use node::{ChildRole, PlanChild, PlanId, PlanNode, StoreType, TaskType};
pub use operator::{
    AggMode, Aggregation, Apply, BatchPointGet, ColumnRemap, CteReader, Dml, DmlKind, Explain,
    HashJoin, IndexJoin, IndexJoinKind, IndexLookUp, IndexReader, IndexScan, JoinType, Limit,
    MaxOneRow, MergeJoin, Operator, PointGet, Projection, ProjectionItem, Selection, Sort,
    TableDual, TableReader, TableScan, TableScanKind, TopN, Union,
};
pub use range::Range;
pub use runtime::RuntimeStats;
pub use tree::{CteDefinition, CteId, PlanError, PlanTree, PlanTreeBuilder, TreeId};

pub(crate) use operator::{OperatorContext, cte_name};
