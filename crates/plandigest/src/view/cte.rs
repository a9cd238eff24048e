use crate::plan::CteId;
use std::collections::{HashMap, VecDeque};

///
/// CteTable
///
/// Visited-CTE table for one traversal. Labels follow first-visit order, so
/// the same tree always labels its CTEs the same way no matter how they were
/// registered; each body is queued exactly once.
///

#[derive(Debug, Default)]
pub(crate) struct CteTable {
    labels: HashMap<CteId, usize>,
    pending: VecDeque<(CteId, usize)>,
}

impl CteTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Label of `cte`, assigning the next one and queueing its body on first
    /// visit.
    pub(crate) fn visit(&mut self, cte: CteId) -> usize {
        let next = self.labels.len();
        *self.labels.entry(cte).or_insert_with(|| {
            self.pending.push_back((cte, next));
            next
        })
    }

    /// Next body that still has to be walked, with its label.
    pub(crate) fn next_pending(&mut self) -> Option<(CteId, usize)> {
        self.pending.pop_front()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::CteTable;
    use crate::plan::{CteDefinition, PlanNode, PlanTreeBuilder, TableDual};

    #[test]
    fn repeat_visits_reuse_the_first_label_and_queue_once() {
        let mut builder = PlanTreeBuilder::new();
        let first = builder.register_cte(CteDefinition::new(PlanNode::new(TableDual::new(1))));
        let second = builder.register_cte(CteDefinition::new(PlanNode::new(TableDual::new(1))));

        let mut table = CteTable::new();
        assert_eq!(table.visit(second), 0);
        assert_eq!(table.visit(first), 1);
        assert_eq!(table.visit(second), 0);

        assert_eq!(table.next_pending(), Some((second, 0)));
        assert_eq!(table.next_pending(), Some((first, 1)));
        assert_eq!(table.next_pending(), None);
    }
}
