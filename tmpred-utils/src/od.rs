//! Labels of origin-destination flows, e.g., `OD_2-8`.

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref OD_LABEL: Regex =
        Regex::new(r"^(?P<prefix>[^_]*)_(?P<origin>[^-]+)-(?P<destination>.+)$").unwrap();
}

/// A parsed flow label of the form `<prefix>_<origin>-<destination>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OdLabel {
    pub prefix: String,
    pub origin: String,
    pub destination: String,
}

impl OdLabel {
    /// Whether the flow starts and ends at the same node.
    pub fn is_diagonal(&self) -> bool {
        self.origin == self.destination
    }
}

impl FromStr for OdLabel {
    type Err = OdLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = OD_LABEL
            .captures(s)
            .ok_or_else(|| OdLabelError(s.to_string()))?;
        Ok(Self {
            prefix: captures["prefix"].to_string(),
            origin: captures["origin"].to_string(),
            destination: captures["destination"].to_string(),
        })
    }
}

impl fmt::Display for OdLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}-{}", self.prefix, self.origin, self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a flow label of the form `OD_<origin>-<destination>`")]
pub struct OdLabelError(pub String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parsing() {
        let label: OdLabel = "OD_2-8".parse().unwrap();
        assert_eq!(label.prefix, "OD");
        assert_eq!(label.origin, "2");
        assert_eq!(label.destination, "8");
        assert!(!label.is_diagonal());
        assert_eq!(label.to_string(), "OD_2-8");

        assert!("OD_11-11".parse::<OdLabel>().unwrap().is_diagonal());
        assert!("OD_1-11".parse::<OdLabel>().is_ok_and(|l| !l.is_diagonal()));
        assert!("time".parse::<OdLabel>().is_err());
        assert!("OD_28".parse::<OdLabel>().is_err());
    }
}
