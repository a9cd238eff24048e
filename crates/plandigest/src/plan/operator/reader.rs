use super::{ChildShape, ExplainOperator, OperatorContext};
use crate::normalize::NormalizeError;

// Readers name their pushed-down child; the id suffix follows the context.
fn write_child_ref(cx: &OperatorContext<'_>, key: &str, out: &mut String) {
    if let Some(label) = cx.child_label(0) {
        out.push_str(key);
        out.push(':');
        out.push_str(&label);
    }
}

///
/// TableReader
///
/// Root-side reader over a coprocessor table subtree. `paging` is set by the
/// storage layer and is display-only.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableReader {
    pub paging: bool,
}

impl TableReader {
    #[must_use]
    pub const fn new() -> Self {
        Self { paging: false }
    }

    #[must_use]
    pub const fn with_paging(mut self, paging: bool) -> Self {
        self.paging = paging;
        self
    }
}

impl ExplainOperator for TableReader {
    fn name(&self) -> &'static str {
        "TableReader"
    }

    fn write_info(&self, cx: &OperatorContext<'_>, out: &mut String) {
        write_child_ref(cx, "data", out);
        if self.paging {
            out.push_str(", paging:true");
        }
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_child_ref(cx, "data", out);

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// IndexReader
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexReader;

impl ExplainOperator for IndexReader {
    fn name(&self) -> &'static str {
        "IndexReader"
    }

    fn write_info(&self, cx: &OperatorContext<'_>, out: &mut String) {
        write_child_ref(cx, "index", out);
    }

    fn write_normalized_info(
        &self,
        cx: &OperatorContext<'_>,
        out: &mut String,
    ) -> Result<(), NormalizeError> {
        write_child_ref(cx, "index", out);

        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}

///
/// IndexLookUp
///
/// Double read: the `Build` child scans the index, the `Probe` child fetches
/// rows by handle. Info is `paging:true` or empty.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexLookUp {
    pub paging: bool,
}

impl IndexLookUp {
    #[must_use]
    pub const fn new() -> Self {
        Self { paging: false }
    }

    #[must_use]
    pub const fn with_paging(mut self, paging: bool) -> Self {
        self.paging = paging;
        self
    }
}

impl ExplainOperator for IndexLookUp {
    fn name(&self) -> &'static str {
        "IndexLookUp"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        if self.paging {
            out.push_str("paging:true");
        }
    }

    fn write_normalized_info(
        &self,
        _cx: &OperatorContext<'_>,
        _out: &mut String,
    ) -> Result<(), NormalizeError> {
        Ok(())
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Joined
    }
}
