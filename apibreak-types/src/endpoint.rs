//! Typed endpoint identity.
//!
//! Route tables in the surrounding service use `:id` parameters while profile
//! declarations historically used `{id}`. Both notations are accepted and
//! normalized to `{id}` so keys compare equal regardless of where they came from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointKeyError {
    #[error("unsupported http method '{0}'")]
    Method(String),

    #[error("invalid path template '{path}': {reason}")]
    Path { path: String, reason: String },

    #[error("endpoint key '{0}' must look like '<METHOD> <path>'")]
    Shape(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = EndpointKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(EndpointKeyError::Method(s.to_string())),
        }
    }
}

/// A route path with parameters in canonical `{name}` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self, EndpointKeyError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| EndpointKeyError::Path {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if !trimmed.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }

        let mut segments = Vec::new();
        for seg in trimmed.split('/').skip(1) {
            if seg.is_empty() {
                continue;
            }
            if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("empty ':' parameter"));
                }
                segments.push(format!("{{{name}}}"));
            } else if seg.starts_with('{') || seg.ends_with('}') {
                let name = seg
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .ok_or_else(|| invalid("unbalanced '{}' parameter"))?;
                if name.is_empty() {
                    return Err(invalid("empty '{}' parameter"));
                }
                segments.push(seg.to_string());
            } else {
                segments.push(seg.to_string());
            }
        }

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parameter names in order of appearance.
    pub fn params(&self) -> Vec<&str> {
        self.0
            .split('/')
            .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .collect()
    }

    /// Equal once parameter names are ignored, e.g. `/c/{id}` and `/c/{categoryId}`.
    ///
    /// Parameter names stay part of key identity; this is only for diagnostics.
    pub fn same_shape(&self, other: &PathTemplate) -> bool {
        let is_param = |seg: &str| seg.starts_with('{');
        let mut lhs = self.0.split('/');
        let mut rhs = other.0.split('/');
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a == b || (is_param(a) && is_param(b)) => {}
                _ => return false,
            }
        }
    }

    /// The path rendered with `:name` parameters, as the route layer registers it.
    pub fn to_colon_notation(&self) -> String {
        self.0
            .split('/')
            .map(|seg| match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => format!(":{name}"),
                None => seg.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = EndpointKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PathTemplate::parse(&value)
    }
}

impl From<PathTemplate> for String {
    fn from(value: PathTemplate) -> Self {
        value.0
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `(method, path template)` compound key identifying one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointKey {
    pub method: HttpMethod,
    pub path: PathTemplate,
}

impl EndpointKey {
    pub fn new(method: HttpMethod, path: PathTemplate) -> Self {
        Self { method, path }
    }

    pub fn parse(method: &str, path: &str) -> Result<Self, EndpointKeyError> {
        Ok(Self {
            method: method.parse()?,
            path: PathTemplate::parse(path)?,
        })
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

impl FromStr for EndpointKey {
    type Err = EndpointKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (method, path) = s
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| EndpointKeyError::Shape(s.to_string()))?;
        EndpointKey::parse(method, path.trim())
    }
}

impl TryFrom<String> for EndpointKey {
    type Error = EndpointKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EndpointKey> for String {
    fn from(value: EndpointKey) -> Self {
        value.to_string()
    }
}
