//! Operation codes and per-user permission sets.
//!
//! An approval record grants operations per resource as a comma-separated
//! list of alternating `resource,ops` pairs, where `ops` is a string of
//! single-letter operation codes (`"Files,RM,UserData,RIMDX"`).

use std::collections::HashMap;
use std::fmt;

/// Operation a client may perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Insert,
    Modify,
    Delete,
    Execute,
    /// Any operation name outside the closed set. Never permitted.
    Unknown,
}

impl Operation {
    pub const ALL: [Self; 5] = [
        Self::Read,
        Self::Insert,
        Self::Modify,
        Self::Delete,
        Self::Execute,
    ];

    /// Resolve an operation name as sent by clients (`"READ"`, `"MODIFY"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "READ" => Self::Read,
            "INSERT" => Self::Insert,
            "MODIFY" => Self::Modify,
            "DELETE" => Self::Delete,
            "EXECUTE" => Self::Execute,
            _ => Self::Unknown,
        }
    }

    /// Resolve a single-letter code from an approval record.
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'R' => Some(Self::Read),
            'I' => Some(Self::Insert),
            'M' => Some(Self::Modify),
            'D' => Some(Self::Delete),
            'X' => Some(Self::Execute),
            _ => None,
        }
    }

    pub const fn code(self) -> Option<char> {
        match self {
            Self::Read => Some('R'),
            Self::Insert => Some('I'),
            Self::Modify => Some('M'),
            Self::Delete => Some('D'),
            Self::Execute => Some('X'),
            Self::Unknown => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Insert => "INSERT",
            Self::Modify => "MODIFY",
            Self::Delete => "DELETE",
            Self::Execute => "EXECUTE",
            Self::Unknown => "UNKNOWN",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Read => 1,
            Self::Insert => 1 << 1,
            Self::Modify => 1 << 2,
            Self::Delete => 1 << 3,
            Self::Execute => 1 << 4,
            Self::Unknown => 0,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of operations permitted on one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationSet(u8);

impl OperationSet {
    /// Build a set from a string of operation codes. Unrecognised letters are ignored.
    pub fn from_codes(codes: &str) -> Self {
        codes
            .chars()
            .filter_map(Operation::from_code)
            .fold(Self::default(), |set, op| set.with(op))
    }

    #[must_use]
    pub const fn with(self, op: Operation) -> Self {
        Self(self.0 | op.bit())
    }

    /// `Unknown` is never contained.
    pub const fn contains(self, op: Operation) -> bool {
        let bit = op.bit();
        bit != 0 && self.0 & bit == bit
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl fmt::Display for OperationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter()
            .filter_map(Operation::code)
            .try_for_each(|c| write!(f, "{c}"))
    }
}

/// Mapping from resource name to permitted operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: HashMap<String, OperationSet>,
}

impl PermissionSet {
    /// Parse a granting approval record.
    ///
    /// Empty fragments are skipped, later pairs for the same resource
    /// overwrite earlier ones and a trailing resource without an ops string
    /// is dropped.
    pub fn parse(record: &str) -> Self {
        let mut grants = HashMap::new();
        let mut fragments = record.split(',').map(str::trim).filter(|f| !f.is_empty());

        while let Some(resource) = fragments.next() {
            let Some(ops) = fragments.next() else {
                break;
            };
            grants.insert(resource.to_string(), OperationSet::from_codes(ops));
        }

        Self { grants }
    }

    /// Whether `op` is granted on `resource`.
    pub fn permits(&self, resource: &str, op: Operation) -> bool {
        self.grants
            .get(resource)
            .is_some_and(|ops| ops.contains(op))
    }

    pub fn get(&self, resource: &str) -> Option<OperationSet> {
        self.grants.get(resource).copied()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
