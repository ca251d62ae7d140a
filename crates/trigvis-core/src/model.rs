use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of parameter slots in a condition entry.
pub const CONDITION_PARAMS: usize = 3;
/// Number of parameter slots in an action entry.
pub const ACTION_PARAMS: usize = 7;

/// A trigger identifier in canonical map-file form.
///
/// The map format zero-pads numeric trigger ids to eight digits
/// (`1480000` and `01480000` name the same trigger). [`TriggerId::new`]
/// normalizes on construction so lookups never miss on padding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct TriggerId(String);

impl TriggerId {
    /// Build a canonical id from a raw token.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let token = raw.trim();
        if !token.is_empty() && token.len() <= 8 && token.bytes().all(|b| b.is_ascii_digit()) {
            Self(format!("{token:0>8}"))
        } else {
            Self(token.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TriggerId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<TriggerId> for String {
    fn from(id: TriggerId) -> Self {
        id.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local (per-map) boolean variable index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocalId(pub u32);

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One condition or action parameter as it appears in the record set.
///
/// The external parser emits parameters as either integers or strings
/// (house names, CSF labels, waypoint letters). Lookups that need a
/// specific shape go through the `as_*` accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Interpret the parameter as an integer, parsing digit strings.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interpret the parameter as a trigger reference.
    ///
    /// Empty tokens carry no reference; everything else normalizes
    /// through [`TriggerId::new`].
    #[must_use]
    pub fn as_trigger_id(&self) -> Option<TriggerId> {
        match self {
            Self::Int(n) => Some(TriggerId::new(&n.to_string())),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(TriggerId::new(s)),
        }
    }

    /// Interpret the parameter as a local-variable reference.
    #[must_use]
    pub fn as_local_id(&self) -> Option<LocalId> {
        let n = self.as_int()?;
        u32::try_from(n).ok().map(LocalId)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// When a fired trigger is allowed to fire again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    Volatile,
    SemiPersistent,
    Persistent,
}

impl Persistence {
    /// Decode the map-file integer code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Volatile),
            1 => Some(Self::SemiPersistent),
            2 => Some(Self::Persistent),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Volatile => "volatile",
            Self::SemiPersistent => "semi_persistent",
            Self::Persistent => "persistent",
        }
    }
}

/// One condition entry: opcode plus up to three parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub opcode: i32,
    pub params: Vec<ParamValue>,
}

impl Condition {
    /// Fetch a parameter by its one-based dictionary index.
    #[must_use]
    pub fn param(&self, one_based: usize) -> Option<&ParamValue> {
        (1..=CONDITION_PARAMS)
            .contains(&one_based)
            .then(|| self.params.get(one_based - 1))
            .flatten()
    }
}

/// One action entry: opcode plus seven parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub opcode: i32,
    pub params: Vec<ParamValue>,
}

impl Action {
    /// Fetch a parameter by its one-based dictionary index.
    #[must_use]
    pub fn param(&self, one_based: usize) -> Option<&ParamValue> {
        (1..=ACTION_PARAMS)
            .contains(&one_based)
            .then(|| self.params.get(one_based - 1))
            .flatten()
    }
}

/// One trigger record: identity, house, firing gates, and its ordered
/// condition/action lists. Immutable after parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    pub name: String,
    pub house: String,
    /// Explicit authored associations, independent of opcode logic. The
    /// map format carries at most one per trigger row.
    pub linked: Vec<TriggerId>,
    pub disabled: bool,
    pub easy: bool,
    pub normal: bool,
    pub hard: bool,
    pub persistence: Persistence,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

/// One local boolean variable declared in the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub id: LocalId,
    pub name: String,
    pub initial: bool,
}

/// The complete normalized record set for one map.
///
/// `BTreeMap` keys keep iteration order stable, which is what makes the
/// classify-and-build pass deterministic end to end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapScript {
    pub name: String,
    pub triggers: BTreeMap<TriggerId, Trigger>,
    pub locals: BTreeMap<LocalId, LocalVariable>,
}

impl MapScript {
    #[must_use]
    pub fn trigger(&self, id: &TriggerId) -> Option<&Trigger> {
        self.triggers.get(id)
    }

    #[must_use]
    pub fn has_trigger(&self, id: &TriggerId) -> bool {
        self.triggers.contains_key(id)
    }

    #[must_use]
    pub fn local(&self, id: LocalId) -> Option<&LocalVariable> {
        self.locals.get(&id)
    }

    #[must_use]
    pub fn has_local(&self, id: LocalId) -> bool {
        self.locals.contains_key(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty() && self.locals.is_empty()
    }
}
