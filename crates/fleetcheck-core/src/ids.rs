use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn from_str(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

id_newtype!(RunId);

/// Defect identifier, `DEF-` followed by a zero-padded 1-based sequence number.
///
/// Ordering follows the sequence number, so sorting defects by id sorts them by
/// creation order within one tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DefectId(u64);

impl DefectId {
    pub const PREFIX: &'static str = "DEF-";

    pub fn from_sequence(seq: u64) -> Self {
        Self(seq)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DefectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", Self::PREFIX, self.0)
    }
}

impl From<DefectId> for String {
    fn from(id: DefectId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for DefectId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| format!("invalid defect id: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_id_is_zero_padded() {
        assert_eq!(DefectId::from_sequence(1).to_string(), "DEF-0001");
        assert_eq!(DefectId::from_sequence(42).to_string(), "DEF-0042");
        assert_eq!(DefectId::from_sequence(12345).to_string(), "DEF-12345");
    }

    #[test]
    fn defect_id_parses_back() {
        let id = DefectId::try_from("DEF-0017".to_string()).unwrap();
        assert_eq!(id.sequence(), 17);
        assert!(DefectId::try_from("BUG-0001".to_string()).is_err());
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
