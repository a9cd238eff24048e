use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::{
    normalize::NormalizeError,
    plan::{AccessObject, Column, CteId},
};
use std::fmt;

///
/// ColumnRemap
///
/// Output position of a CTE reference mapped onto the definition's column:
/// `1->Column#1`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnRemap {
    pub position: usize,
    pub column: Column,
}

impl ColumnRemap {
    #[must_use]
    pub const fn new(position: usize, column: Column) -> Self {
        Self { position, column }
    }
}

impl fmt::Display for ColumnRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.position, self.column)
    }
}

///
/// CteReader
///
/// One reference site of a shared CTE body. The body itself lives once in
/// the tree's CTE arena.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CteReader {
    pub cte: CteId,
    /// Name the query gave the CTE (`cte1`).
    pub alias: String,
    pub remap: Vec<ColumnRemap>,
}

impl CteReader {
    #[must_use]
    pub fn new(cte: CteId, alias: impl Into<String>) -> Self {
        Self {
            cte,
            alias: alias.into(),
            remap: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_remap(mut self, remap: Vec<ColumnRemap>) -> Self {
        self.remap = remap;
        self
    }

    fn write(&self, cx: &OperatorContext<'_>, out: &mut String) {
        if let Some(name) = cx.cte_name() {
            out.push_str("data:");
            out.push_str(&name);
        }
        if !self.remap.is_empty() {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str("remap:");
            for (idx, remap) in self.remap.iter().enumerate() {
                if idx > 0 {
                    out.push(' ');
                }
                out.push_str(&remap.to_string());
            }
        }
    }
}

impl ExplainOperator for CteReader {
    fn name(&self) -> &'static str {
        "CTEFullScan"
    }

    fn access_object(&self) -> Option<AccessObject<'_>> {
        Some(AccessObject::Cte { name: &self.alias })
    }

    fn write_info(&self, cx: &OperatorContext<'_>, out: &mut String) {
        self.write(cx, out);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        self.write(cx, out);

        Ok(())
    }

    fn referenced_cte(&self) -> Option<CteId> {
        Some(self.cte)
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Leaf
    }
}
