//! Literal-free plan text and its digest.
//!
//! The normalized text keeps everything that identifies a plan's shape
//! (operators, tasks, table and index identity, predicate functions, roles)
//! and drops everything incidental (literals, estimates, costs, pruned
//! partitions, runtime stats, paging). The digest is SHA-256 over a versioned
//! domain tag plus that text, so equal digests mean equal text.


use crate::{
    codec::encode_normalized,
    config::Config,
    error::ErrorClass,
    plan::{CteDefinition, CteId, PlanNode, PlanTree},
    view::normalized_tree,
};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};
use thiserror::Error as ThisError;
use tracing::{debug, instrument};

// Bump when the normalized text layout changes; old digests stop matching.
const DIGEST_DOMAIN: &[u8] = b"plandigest:v1";

///
/// NormalizeError
///

#[derive(Clone, Debug, Eq, ThisError, PartialEq)]
pub enum NormalizeError {
    #[error("no normalization rule for plan node kind `{kind}`")]
    UnsupportedNodeKind { kind: &'static str },

    #[error("CTE reference {cte} has no definition in the supplied CTE list")]
    DanglingCte { cte: CteId },
}

impl NormalizeError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedNodeKind { .. } => ErrorClass::Internal,
            Self::DanglingCte { .. } => ErrorClass::InvalidInput,
        }
    }
}

///
/// PlanDigest
///
/// Opaque 256-bit plan-shape identifier; renders as 64 lowercase hex chars.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PlanDigest([u8; 32]);

impl PlanDigest {
    fn of(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DIGEST_DOMAIN);
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();

        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for PlanDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

///
/// NormalizedPlan
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NormalizedPlan {
    text: String,
    digest: PlanDigest,
}

impl NormalizedPlan {
    /// `PN1`-encoded normalized text; readable with
    /// [`decode_normalized_plan`](crate::decode_normalized_plan).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn digest(&self) -> PlanDigest {
        self.digest
    }
}

/// Normalize a finished tree from its root.
///
/// Fails with [`NormalizeError::UnsupportedNodeKind`] when the root is an
/// `Explain` wrapper; pass [`PlanTree::into_target`] instead.
#[instrument(
    name = "plandigest::normalize",
    level = "debug",
    skip(tree, config),
    fields(tree = tree.id().get())
)]
pub fn normalize_plan(tree: &PlanTree, config: &Config) -> Result<NormalizedPlan, NormalizeError> {
    normalize_node(tree.root(), tree.ctes(), config)
}

/// Normalize the subtree at `root`, resolving CTE references against `ctes`.
///
/// Fails with [`NormalizeError::DanglingCte`] when a reference has no
/// definition in `ctes`.
pub fn normalize_node(
    root: &PlanNode,
    ctes: &[CteDefinition],
    config: &Config,
) -> Result<NormalizedPlan, NormalizeError> {
    let view = normalized_tree(root, ctes, config)?;
    let text = encode_normalized(&view);
    let digest = PlanDigest::of(&text);
    debug!(%digest, bytes = text.len(), "normalized plan");

    Ok(NormalizedPlan { text, digest })
}
