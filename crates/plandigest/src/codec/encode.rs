use super::{
    EncodeError, NORMALIZED_HEADER, PLAN_HEADER,
    escape::{FIELD_SEP, RECORD_SEP, escape_bounded, escape_into},
};
use crate::{
    config::Config,
    plan::PlanTree,
    view::{DisplayNode, DisplayTree, display_tree},
};
use tracing::{debug, instrument};

// Field names reported by `EscapeOverflowError`, in record order.
const CONCRETE_FIELDS: [&str; super::PLAN_FIELDS] = [
    "depth",
    "role",
    "name",
    "id",
    "task",
    "estimated rows",
    "estimated cost",
    "access object",
    "operator info",
    "actual rows",
    "execution info",
    "memory",
    "disk",
];

/// Encode a finished plan into the single-line compact form.
///
/// The root must be executable: unwrap an `Explain` root with
/// [`PlanTree::into_target`] first.
#[instrument(
    name = "plandigest::codec::encode",
    level = "debug",
    skip(tree, config),
    fields(tree = tree.id().get())
)]
pub fn encode_plan(tree: &PlanTree, config: &Config) -> Result<String, EncodeError> {
    let root = tree.root();
    if !root.explain().is_executable() {
        return Err(EncodeError::UnsupportedNodeKind { kind: root.name() });
    }

    let view = display_tree(root, tree.ctes(), config, true);
    let encoded = encode_display(&view, config)?;
    debug!(bytes = encoded.len(), "encoded plan");

    Ok(encoded)
}

// Output must stay within the bounds the decoder enforces under `config`.
pub(crate) fn encode_display(tree: &DisplayTree, config: &Config) -> Result<String, EncodeError> {
    let mut out = String::from(PLAN_HEADER);
    for (depth, node) in pre_order(tree) {
        if depth >= config.max_depth {
            return Err(EncodeError::TooDeep {
                depth,
                max: config.max_depth,
            });
        }

        out.push(RECORD_SEP);
        for (idx, (name, value)) in CONCRETE_FIELDS
            .into_iter()
            .zip(concrete_fields(depth, node))
            .enumerate()
        {
            if idx > 0 {
                out.push(FIELD_SEP);
            }
            out.push_str(&escape_bounded(name, &value, config.max_field_bytes)?);
        }

        if out.len() > config.max_plan_bytes {
            return Err(EncodeError::TooLong {
                max: config.max_plan_bytes,
            });
        }
    }

    Ok(out)
}

/// Serialize a normalized presentation tree. No field bound applies.
pub(crate) fn encode_normalized(tree: &DisplayTree) -> String {
    let mut out = String::from(NORMALIZED_HEADER);
    for (depth, node) in pre_order(tree) {
        out.push(RECORD_SEP);
        let fields = [
            depth.to_string(),
            role(node),
            node.name.clone(),
            node.task.clone(),
            node.access_object.clone(),
            node.operator_info.clone(),
        ];
        for (idx, value) in fields.iter().enumerate() {
            if idx > 0 {
                out.push(FIELD_SEP);
            }
            escape_into(&mut out, value);
        }
    }

    out
}

fn concrete_fields(depth: usize, node: &DisplayNode) -> [String; super::PLAN_FIELDS] {
    let runtime = node.runtime.clone().unwrap_or_default();

    [
        depth.to_string(),
        role(node),
        node.name.clone(),
        node.id.map(|id| id.to_string()).unwrap_or_default(),
        node.task.clone(),
        node.est_rows.clone(),
        node.est_cost.clone(),
        node.access_object.clone(),
        node.operator_info.clone(),
        runtime.act_rows,
        runtime.execution_info,
        runtime.memory,
        runtime.disk,
    ]
}

fn role(node: &DisplayNode) -> String {
    node.role
        .map(|role| role.label().to_string())
        .unwrap_or_default()
}

fn pre_order(tree: &DisplayTree) -> Vec<(usize, &DisplayNode)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &DisplayNode)> =
        tree.roots.iter().rev().map(|root| (0, root)).collect();
    while let Some((depth, node)) = stack.pop() {
        out.push((depth, node));
        stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
    }

    out
}
