use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::{
    normalize::NormalizeError,
    plan::{
        AccessObject, IndexRef, Range, TableRef,
        range::write_normalized_ranges,
    },
};
use std::fmt::Write as _;

///
/// TableScanKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableScanKind {
    Full,
    Range,
    /// Row fetch by handle on the table side of an `IndexLookUp`.
    RowId,
}

///
/// TableScan
///

#[derive(Clone, Debug, PartialEq)]
pub struct TableScan {
    pub table: TableRef,
    pub partitions: Vec<String>,
    pub kind: TableScanKind,
    pub ranges: Vec<Range>,
    pub keep_order: bool,
    pub desc: bool,
    pub pseudo_stats: bool,
}

impl TableScan {
    #[must_use]
    pub const fn full(table: TableRef) -> Self {
        Self::new(table, TableScanKind::Full, Vec::new())
    }

    #[must_use]
    pub const fn range(table: TableRef, ranges: Vec<Range>) -> Self {
        Self::new(table, TableScanKind::Range, ranges)
    }

    #[must_use]
    pub const fn row_id(table: TableRef) -> Self {
        Self::new(table, TableScanKind::RowId, Vec::new())
    }

    const fn new(table: TableRef, kind: TableScanKind, ranges: Vec<Range>) -> Self {
        Self {
            table,
            partitions: Vec::new(),
            kind,
            ranges,
            keep_order: false,
            desc: false,
            pseudo_stats: false,
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
    pub const fn keep_order(mut self, desc: bool) -> Self {
        self.keep_order = true;
        self.desc = desc;
        self
    }

    #[must_use]
    pub const fn with_pseudo_stats(mut self) -> Self {
        self.pseudo_stats = true;
        self
    }
}

impl ExplainOperator for TableScan {
    fn name(&self) -> &'static str {
        match self.kind {
            TableScanKind::Full => "TableFullScan",
            TableScanKind::Range => "TableRangeScan",
            TableScanKind::RowId => "TableRowIDScan",
        }
    }

    fn access_object(&self) -> Option<AccessObject<'_>> {
        Some(AccessObject::Table {
            table: &self.table,
            partitions: &self.partitions,
            index: None,
        })
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        write_scan_info(
            out,
            (self.kind == TableScanKind::Range).then_some(self.ranges.as_slice()),
            self.keep_order,
            self.desc,
            self.pseudo_stats,
        );
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_normalized_scan_info(
            out,
            (self.kind == TableScanKind::Range).then_some(self.ranges.as_slice()),
            self.keep_order,
            self.desc,
            cx,
        );

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Leaf
    }
}

///
/// IndexScan
///

#[derive(Clone, Debug, PartialEq)]
pub struct IndexScan {
    pub table: TableRef,
    pub partitions: Vec<String>,
    pub index: IndexRef,
    /// `None` scans the whole index.
    pub ranges: Option<Vec<Range>>,
    pub keep_order: bool,
    pub desc: bool,
    pub pseudo_stats: bool,
}

impl IndexScan {
    #[must_use]
    pub const fn full(table: TableRef, index: IndexRef) -> Self {
        Self::new(table, index, None)
    }

    #[must_use]
    pub const fn range(table: TableRef, index: IndexRef, ranges: Vec<Range>) -> Self {
        Self::new(table, index, Some(ranges))
    }

    const fn new(table: TableRef, index: IndexRef, ranges: Option<Vec<Range>>) -> Self {
        Self {
            table,
            partitions: Vec::new(),
            index,
            ranges,
            keep_order: false,
            desc: false,
            pseudo_stats: false,
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
    pub const fn keep_order(mut self, desc: bool) -> Self {
        self.keep_order = true;
        self.desc = desc;
        self
    }

    #[must_use]
    pub const fn with_pseudo_stats(mut self) -> Self {
        self.pseudo_stats = true;
        self
    }
}

impl ExplainOperator for IndexScan {
    fn name(&self) -> &'static str {
        if self.ranges.is_some() {
            "IndexRangeScan"
        } else {
            "IndexFullScan"
        }
    }

    fn access_object(&self) -> Option<AccessObject<'_>> {
        Some(AccessObject::Table {
            table: &self.table,
            partitions: &self.partitions,
            index: Some(&self.index),
        })
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        write_scan_info(
            out,
            self.ranges.as_deref(),
            self.keep_order,
            self.desc,
            self.pseudo_stats,
        );
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_normalized_scan_info(out, self.ranges.as_deref(), self.keep_order, self.desc, cx);

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Leaf
    }
}

// range:[0,1024], keep order:true[, desc][, stats:pseudo]
fn write_scan_info(
    out: &mut String,
    ranges: Option<&[Range]>,
    keep_order: bool,
    desc: bool,
    pseudo_stats: bool,
) {
    if let Some(ranges) = ranges {
        out.push_str("range:");
        for (idx, range) in ranges.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{range}");
        }
        out.push_str(", ");
    }
    let _ = write!(out, "keep order:{keep_order}");
    if desc {
        out.push_str(", desc");
    }
    if pseudo_stats {
        out.push_str(", stats:pseudo");
    }
}

// Statistics health is incidental: `stats:pseudo` never reaches the digest.
fn write_normalized_scan_info(
    out: &mut String,
    ranges: Option<&[Range]>,
    keep_order: bool,
    desc: bool,
    cx: &OperatorContext<'_>,
) {
    if let Some(ranges) = ranges {
        out.push_str("range:");
        write_normalized_ranges(out, ranges, cx.in_list);
        out.push_str(", ");
    }
    let _ = write!(out, "keep order:{keep_order}");
    if desc {
        out.push_str(", desc");
    }
}
