//! The route table profiles are validated against.

use apibreak_types::{EndpointKey, EndpointKeyError};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    keys: BTreeSet<EndpointKey>,
}

impl RouteTable {
    pub fn from_keys(keys: impl IntoIterator<Item = EndpointKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn contains(&self, key: &EndpointKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Parse a route listing: one `<METHOD> <path>` per line, `#` comments and blank lines ignored.
pub fn parse_route_table(contents: &str) -> Result<RouteTable, EndpointKeyError> {
    let mut keys = BTreeSet::new();
    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        keys.insert(line.parse::<EndpointKey>()?);
    }
    Ok(RouteTable { keys })
}
