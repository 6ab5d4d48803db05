use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the backend uses for a swimlane that does not really exist.
pub const DEFAULT_SWIMLANE_ID: &str = "default";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(TaskId);
string_id!(ColumnId);
string_id!(
    /// Always a real swimlane. The synthetic lane is `SwimlaneRef::Unassigned`.
    SwimlaneId
);
string_id!(BoardId);

impl SwimlaneId {
    pub fn is_default_marker(&self) -> bool {
        self.0.is_empty() || self.0 == DEFAULT_SWIMLANE_ID
    }
}

/// Where a task sits horizontally. Tasks without an explicit swimlane
/// live in the unassigned lane, which the backend has no entity for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwimlaneRef {
    Unassigned,
    Assigned(SwimlaneId),
}

impl SwimlaneRef {
    /// Normalizes a raw identifier; empty and `"default"` mean unassigned.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(id) if !id.is_empty() && id != DEFAULT_SWIMLANE_ID => {
                SwimlaneRef::Assigned(SwimlaneId::new(id))
            }
            _ => SwimlaneRef::Unassigned,
        }
    }

    /// Value sent to the backend's move endpoint.
    pub fn wire_value(&self) -> &str {
        match self {
            SwimlaneRef::Assigned(id) => id.as_str(),
            SwimlaneRef::Unassigned => "",
        }
    }

    pub fn as_assigned(&self) -> Option<&SwimlaneId> {
        match self {
            SwimlaneRef::Assigned(id) => Some(id),
            SwimlaneRef::Unassigned => None,
        }
    }
}

impl From<SwimlaneId> for SwimlaneRef {
    fn from(id: SwimlaneId) -> Self {
        if id.is_default_marker() {
            SwimlaneRef::Unassigned
        } else {
            SwimlaneRef::Assigned(id)
        }
    }
}

impl fmt::Display for SwimlaneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwimlaneRef::Assigned(id) => write!(f, "{}", id),
            SwimlaneRef::Unassigned => f.write_str(DEFAULT_SWIMLANE_ID),
        }
    }
}

/// One (swimlane, column) cell of the board grid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub swimlane: SwimlaneRef,
    pub column: ColumnId,
}

impl CellKey {
    pub fn new(swimlane: SwimlaneRef, column: impl Into<ColumnId>) -> Self {
        Self {
            swimlane,
            column: column.into(),
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.swimlane, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swimlane_ref_normalizes_default_marker() {
        assert_eq!(SwimlaneRef::from_raw(None), SwimlaneRef::Unassigned);
        assert_eq!(SwimlaneRef::from_raw(Some("")), SwimlaneRef::Unassigned);
        assert_eq!(SwimlaneRef::from_raw(Some("default")), SwimlaneRef::Unassigned);
        assert_eq!(
            SwimlaneRef::from_raw(Some("lane-1")),
            SwimlaneRef::Assigned(SwimlaneId::new("lane-1"))
        );
        assert_eq!(SwimlaneRef::from(SwimlaneId::new("default")), SwimlaneRef::Unassigned);
    }

    #[test]
    fn test_unassigned_wire_value_is_empty() {
        assert_eq!(SwimlaneRef::Unassigned.wire_value(), "");
        assert_eq!(SwimlaneRef::from_raw(Some("s1")).wire_value(), "s1");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = TaskId::new("t1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t1\"");
    }

    #[test]
    fn test_cell_key_display() {
        let cell = CellKey::new(SwimlaneRef::Unassigned, "todo");
        assert_eq!(cell.to_string(), "default/todo");
    }
}
