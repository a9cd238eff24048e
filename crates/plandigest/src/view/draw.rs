use super::{DisplayNode, DisplayTree, ExplainFormat};

const BRANCH: &str = "├─";
const LAST_BRANCH: &str = "└─";
const CONTINUE: &str = "│ ";
const BLANK: &str = "  ";

const ROW_HEADER: [&str; 5] = ["id", "estRows", "task", "access object", "operator info"];
const VERBOSE_HEADER: [&str; 6] = [
    "id",
    "estRows",
    "estCost",
    "task",
    "access object",
    "operator info",
];
const RUNTIME_HEADER: [&str; 4] = ["actRows", "execution info", "memory", "disk"];

///
/// Row
///
/// One explain line: the tree-drawn label plus the node it renders.
///

struct Row<'a> {
    label: String,
    node: &'a DisplayNode,
}

fn rows(tree: &DisplayTree) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    for root in &tree.roots {
        rows.push(Row {
            label: root.label(),
            node: root,
        });
        push_children(root, "", &mut rows);
    }

    rows
}

// `indent` is the continuation prefix inherited from every ancestor.
fn push_children<'a>(node: &'a DisplayNode, indent: &str, rows: &mut Vec<Row<'a>>) {
    let last = node.children.len().saturating_sub(1);
    for (idx, child) in node.children.iter().enumerate() {
        let (branch, next) = if idx == last {
            (LAST_BRANCH, BLANK)
        } else {
            (BRANCH, CONTINUE)
        };
        rows.push(Row {
            label: format!("{indent}{branch}{}", child.label()),
            node: child,
        });
        push_children(child, &format!("{indent}{next}"), rows);
    }
}

pub(super) fn render(tree: &DisplayTree, format: ExplainFormat) -> String {
    let with_runtime = tree.has_runtime();
    let mut lines = Vec::new();

    let sep = match format {
        ExplainFormat::Brief => " ",
        ExplainFormat::Row | ExplainFormat::Verbose => "\t",
    };

    match format {
        ExplainFormat::Brief => {}
        ExplainFormat::Row => lines.push(header(&ROW_HEADER, with_runtime, sep)),
        ExplainFormat::Verbose => lines.push(header(&VERBOSE_HEADER, with_runtime, sep)),
    }

    for row in rows(tree) {
        let node = row.node;
        let mut columns = vec![row.label.as_str(), node.est_rows.as_str()];
        if format == ExplainFormat::Verbose {
            columns.push(&node.est_cost);
        }
        columns.extend([
            node.task.as_str(),
            node.access_object.as_str(),
            node.operator_info.as_str(),
        ]);
        if with_runtime {
            match &node.runtime {
                Some(runtime) => columns.extend([
                    runtime.act_rows.as_str(),
                    runtime.execution_info.as_str(),
                    runtime.memory.as_str(),
                    runtime.disk.as_str(),
                ]),
                None => columns.extend(["", "", "", ""]),
            }
        }
        lines.push(columns.join(sep));
    }

    lines.join("\n")
}

fn header(columns: &[&str], with_runtime: bool, sep: &str) -> String {
    let mut header = columns.to_vec();
    if with_runtime {
        header.extend(RUNTIME_HEADER);
    }

    header.join(sep)
}
