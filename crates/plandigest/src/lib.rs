//! Physical plan representation utilities: literal-free plan digests and a
//! compact, log-safe text codec for concrete plans.
//!
//! Both consumers only read a finished [`PlanTree`]; neither mutates it.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod normalize;
pub mod plan;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

///
/// Re-Exports
///
pub use cache::{CacheStats, DigestCache, StatementContext};
pub use codec::{DecodeError, EncodeError, EscapeOverflowError};
pub use codec::{decode_normalized_plan, decode_plan, encode_plan};
pub use config::{Config, ConfigError, InListPolicy};
pub use error::{Error, ErrorClass};
pub use normalize::{NormalizeError, NormalizedPlan, PlanDigest, normalize_node, normalize_plan};
pub use plan::{PlanError, PlanNode, PlanTree, PlanTreeBuilder, TreeId};
pub use view::{DisplayNode, DisplayTree, ExplainFormat, explain_plan};

///
/// Prelude
///
/// Plan-building vocabulary only; entry points stay at the crate root.
///

pub mod prelude {
    pub use crate::plan::{
        AccessObject, AggFunc, AggMode, Aggregation, Apply, BatchPointGet, ChildRole, Column,
        ColumnRemap, CteDefinition, CteId, CteReader, Datum, Dml, DmlKind, Explain, Expr,
        HashJoin, IndexJoin, IndexJoinKind, IndexLookUp, IndexReader, IndexRef, IndexScan,
        JoinType, Limit, MaxOneRow, MergeJoin, Operator, PlanNode, PlanTree, PlanTreeBuilder,
        PointGet, Projection, ProjectionItem, Range, RuntimeStats, Selection, Sort, SortItem,
        StoreType, TableDual, TableReader, TableRef, TableScan, TableScanKind, TaskType, TopN,
        Union,
    };
}
