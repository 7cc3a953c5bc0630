use crate::error::{ManagerError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Structured management object identifier: `domain:key=value[,key=value...]`.
///
/// Properties are kept sorted by key, so two names that differ only in
/// property order are equal and print the same canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
    property_wildcard: bool,
}

impl ObjectName {
    pub fn parse(name: &str) -> Result<Self> {
        let (domain, rest) = name
            .split_once(':')
            .ok_or_else(|| ManagerError::malformed_name(name, "missing ':' after domain"))?;

        if domain.is_empty() {
            return Err(ManagerError::malformed_name(name, "empty domain"));
        }
        if rest.contains(':') {
            return Err(ManagerError::malformed_name(name, "unexpected ':' in key properties"));
        }
        if domain.contains(['=', ',']) {
            return Err(ManagerError::malformed_name(name, "domain may not contain '=' or ','"));
        }

        let mut properties = BTreeMap::new();
        let mut property_wildcard = false;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').collect()
        };

        for (index, part) in parts.iter().enumerate() {
            if *part == "*" {
                if index + 1 != parts.len() {
                    return Err(ManagerError::malformed_name(
                        name,
                        "property wildcard must be the last element",
                    ));
                }
                property_wildcard = true;
                continue;
            }

            let (key, value) = part.split_once('=').ok_or_else(|| {
                ManagerError::malformed_name(name, format!("property '{}' is missing '='", part))
            })?;
            if key.is_empty() || value.is_empty() {
                return Err(ManagerError::malformed_name(
                    name,
                    format!("property '{}' needs a non-empty key and value", part),
                ));
            }
            if value.contains('=') {
                return Err(ManagerError::malformed_name(
                    name,
                    format!("property '{}' has more than one '='", part),
                ));
            }
            if has_wildcard(key) || has_wildcard(value) {
                return Err(ManagerError::malformed_name(
                    name,
                    "wildcards are not allowed in key properties",
                ));
            }
            if properties.insert(key.to_string(), value.to_string()).is_some() {
                return Err(ManagerError::malformed_name(
                    name,
                    format!("duplicate key '{}'", key),
                ));
            }
        }

        if properties.is_empty() && !property_wildcard {
            return Err(ManagerError::malformed_name(name, "at least one key property is required"));
        }

        Ok(Self {
            domain: domain.to_string(),
            properties,
            property_wildcard,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True if this name contains wildcards and can only be used for queries
    pub fn is_pattern(&self) -> bool {
        self.property_wildcard || has_wildcard(&self.domain)
    }

    /// Check a concrete name against this name used as a pattern.
    ///
    /// A non-pattern name only matches itself.
    pub fn matches(&self, candidate: &ObjectName) -> bool {
        if !glob_match(&self.domain, &candidate.domain) {
            return false;
        }

        let listed_match = self
            .properties
            .iter()
            .all(|(k, v)| candidate.properties.get(k) == Some(v));

        if self.property_wildcard {
            listed_match
        } else {
            listed_match && self.properties.len() == candidate.properties.len()
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        let mut first = true;
        for (key, value) in &self.properties {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        if self.property_wildcard {
            if !first {
                f.write_str(",")?;
            }
            f.write_str("*")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectName {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ObjectName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// `*` matches any run of characters, `?` exactly one
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
