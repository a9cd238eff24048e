use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::{
    config::InListPolicy,
    normalize::NormalizeError,
    plan::{AccessObject, Datum, IndexRef, TableRef, expr::ELIDED},
};
use std::fmt::Write as _;

///
/// PointGet
///
/// Single-row read by handle or by a unique index key.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PointGet {
    pub table: TableRef,
    pub partitions: Vec<String>,
    pub index: Option<IndexRef>,
    /// Handle value, or the unique index key parts.
    pub key: Vec<Datum>,
    pub lock: bool,
}

impl PointGet {
    #[must_use]
    pub fn by_handle(table: TableRef, handle: impl Into<Datum>) -> Self {
        Self {
            table,
            partitions: Vec::new(),
            index: None,
            key: vec![handle.into()],
            lock: false,
        }
    }

    #[must_use]
    pub const fn by_index(table: TableRef, index: IndexRef, key: Vec<Datum>) -> Self {
        Self {
            table,
            partitions: Vec::new(),
            index: Some(index),
            key,
            lock: false,
        }
    }

    #[must_use]
    pub fn with_partitions<I, S>(mut self, partitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partitions = partitions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_lock(mut self) -> Self {
        self.lock = true;
        self
    }
}

impl ExplainOperator for PointGet {
    fn name(&self) -> &'static str {
        "Point_Get"
    }

    fn access_object(&self) -> Option<AccessObject<'_>> {
        Some(AccessObject::Table {
            table: &self.table,
            partitions: &self.partitions,
            index: self.index.as_ref(),
        })
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        if self.index.is_none() {
            out.push_str("handle:");
            for (idx, datum) in self.key.iter().enumerate() {
                if idx > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{datum}");
            }
        }
        if self.lock {
            push_separated(out, "lock");
        }
    }

    fn write_normalized_info(
        &self,
        _cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        if self.index.is_none() {
            out.push_str("handle:?");
        }
        if self.lock {
            push_separated(out, "lock");
        }

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Leaf
    }
}

///
/// BatchPointGet
///

#[derive(Clone, Debug, PartialEq)]
pub struct BatchPointGet {
    pub table: TableRef,
    pub partitions: Vec<String>,
    pub index: Option<IndexRef>,
    /// Handles, or one key per row for index lookups.
    pub keys: Vec<Datum>,
    pub keep_order: bool,
    pub desc: bool,
    pub lock: bool,
}

impl BatchPointGet {
    #[must_use]
    pub fn by_handles<I, D>(table: TableRef, handles: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Datum>,
    {
        Self {
            table,
            partitions: Vec::new(),
            index: None,
            keys: handles.into_iter().map(Into::into).collect(),
            keep_order: false,
            desc: false,
            lock: false,
        }
    }

    #[must_use]
    pub const fn by_index(table: TableRef, index: IndexRef, keys: Vec<Datum>) -> Self {
        Self {
            table,
            partitions: Vec::new(),
            index: Some(index),
            keys,
            keep_order: false,
            desc: false,
            lock: false,
        }
    }

    #[must_use]
    pub const fn keep_order(mut self, desc: bool) -> Self {
        self.keep_order = true;
        self.desc = desc;
        self
    }

    #[must_use]
    pub const fn with_lock(mut self) -> Self {
        self.lock = true;
        self
    }
}

impl ExplainOperator for BatchPointGet {
    fn name(&self) -> &'static str {
        "Batch_Point_Get"
    }

    fn access_object(&self) -> Option<AccessObject<'_>> {
        Some(AccessObject::Table {
            table: &self.table,
            partitions: &self.partitions,
            index: self.index.as_ref(),
        })
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        if self.index.is_none() {
            out.push_str("handle:[");
            for (idx, datum) in self.keys.iter().enumerate() {
                if idx > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{datum}");
            }
            out.push_str("], ");
        }
        self.write_order(out);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        if self.index.is_none() {
            out.push_str("handle:[");
            match cx.in_list {
                InListPolicy::Collapse => out.push_str(ELIDED),
                InListPolicy::PreserveArity => {
                    out.push_str(&vec!["?"; self.keys.len()].join(" "));
                }
            }
            out.push_str("], ");
        }
        self.write_order(out);

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Leaf
    }
}

impl BatchPointGet {
    fn write_order(&self, out: &mut String) {
        let _ = write!(out, "keep order:{}, desc:{}", self.keep_order, self.desc);
        if self.lock {
            out.push_str(", lock");
        }
    }
}

///
/// TableDual
///
/// Constant row source. The row count (0 or 1) is part of the shape.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableDual {
    pub rows: usize,
}

impl TableDual {
    #[must_use]
    pub const fn new(rows: usize) -> Self {
        Self { rows }
    }
}

impl ExplainOperator for TableDual {
    fn name(&self) -> &'static str {
        "TableDual"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        let _ = write!(out, "rows:{}", self.rows);
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
        ChildShape::Leaf
    }
}

fn push_separated(out: &mut String, part: &str) {
    if !out.is_empty() {
        out.push_str(", ");
    }
    out.push_str(part);
}
