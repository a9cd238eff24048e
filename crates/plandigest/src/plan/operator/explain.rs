use super::{ChildShape, ExplainOperator, OperatorContext};

///
/// Explain
///
/// Statement wrapper around the plan being explained. Not executable: digest
/// and encoding callers work on [`PlanTree::target`](crate::PlanTree::target).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Explain {
    pub analyze: bool,
}

impl Explain {
    #[must_use]
    pub const fn new(analyze: bool) -> Self {
        Self { analyze }
    }
}

impl ExplainOperator for Explain {
    fn name(&self) -> &'static str {
        "Explain"
    }

    fn write_info(&self, _cx: &OperatorContext<'_>, out: &mut String) {
        if self.analyze {
            out.push_str("analyze");
        }
    }

    fn is_executable(&self) -> bool {
        false
    }

    fn child_shape(&self) -> ChildShape {
        ChildShape::Unary
    }
}
