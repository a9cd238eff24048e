use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::{
    normalize::NormalizeError,
    plan::{AccessObject, TableRef},
};

///
/// DmlKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DmlKind {
    Insert,
    Update,
    Delete,
}

///
/// Dml
///
/// Write operator. An `Insert` from literal values has no child; the others
/// read their rows from one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dml {
    pub kind: DmlKind,
    pub table: TableRef,
}

impl Dml {
    #[must_use]
    pub const fn new(kind: DmlKind, table: TableRef) -> Self {
        Self { kind, table }
    }
}

impl ExplainOperator for Dml {
    fn name(&self) -> &'static str {
        match self.kind {
            DmlKind::Insert => "Insert",
            DmlKind::Update => "Update",
            DmlKind::Delete => "Delete",
        }
    }

    fn access_object(&self) -> Option<AccessObject<'_>> {
        Some(AccessObject::Table {
            table: &self.table,
            partitions: &[],
            index: None,
        })
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        out.push_str("N/A");
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        self.write_info(cx, out);

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Optional
    }
}
