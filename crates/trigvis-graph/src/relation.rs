#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::fmt;

use trigvis_core::model::{LocalId, TriggerId};

/// The fixed relation taxonomy.
///
/// These ten values are the contract between the classifier and the
/// external renderer's color map: every edge in a built graph carries
/// exactly one of them. `DependsOn` is the polarity-unknown fallback for
/// dependency references whose dictionary entry does not say whether the
/// condition tests for true or false.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Enable,
    Disable,
    Destroy,
    Force,
    Linked,
    EnableLocal,
    DisableLocal,
    DependsOnTrue,
    DependsOnFalse,
    DependsOn,
}

impl RelationKind {
    /// Every taxonomy value, for exhaustive coverage checks.
    pub const ALL: [Self; 10] = [
        Self::Enable,
        Self::Disable,
        Self::Destroy,
        Self::Force,
        Self::Linked,
        Self::EnableLocal,
        Self::DisableLocal,
        Self::DependsOnTrue,
        Self::DependsOnFalse,
        Self::DependsOn,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Destroy => "destroy",
            Self::Force => "force",
            Self::Linked => "linked",
            Self::EnableLocal => "enable_local",
            Self::DisableLocal => "disable_local",
            Self::DependsOnTrue => "depends_on_true",
            Self::DependsOnFalse => "depends_on_false",
            Self::DependsOn => "depends_on",
        }
    }

    /// Parse a canonical edge label. Returns `None` for labels outside
    /// the taxonomy (run the label through
    /// [`trigvis_core::dict::canon_label`] first).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of entity a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Trigger,
    LocalVar,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::LocalVar => "local_var",
        }
    }
}

/// A graph endpoint: a trigger or a local variable.
///
/// Renders as the node id the external renderer sees: triggers by their
/// canonical id, locals as `local:<index>` so the two namespaces can
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRef {
    Trigger(TriggerId),
    Local(LocalId),
}

impl NodeRef {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Trigger(_) => NodeKind::Trigger,
            Self::Local(_) => NodeKind::LocalVar,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger(id) => f.write_str(id.as_str()),
            Self::Local(id) => write!(f, "local:{id}"),
        }
    }
}

/// One derived, typed, directed relation between two nodes.
///
/// Relations are never authored: the classifier recomputes them from the
/// record set on every build, and the builder collapses duplicates of the
/// same `(source, target, kind)` triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Relation {
    pub source: NodeRef,
    pub target: NodeRef,
    pub kind: RelationKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for kind in RelationKind::ALL {
            assert_eq!(RelationKind::from_label(kind.as_str()), Some(kind));
        }
        assert_eq!(RelationKind::from_label("teleport"), None);
    }

    #[test]
    fn node_ref_rendering_keeps_namespaces_apart() {
        let trigger = NodeRef::Trigger(TriggerId::new("16"));
        let local = NodeRef::Local(LocalId(16));
        assert_eq!(trigger.to_string(), "00000016");
        assert_eq!(local.to_string(), "local:16");
        assert_ne!(trigger, local);
    }

    #[test]
    fn node_kind_tags() {
        assert_eq!(NodeRef::Trigger(TriggerId::new("1")).kind().as_str(), "trigger");
        assert_eq!(NodeRef::Local(LocalId(1)).kind().as_str(), "local_var");
    }
}
