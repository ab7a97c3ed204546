//! Request molds: authored, not yet evaluated request definitions.
//!
//! A mold carries exactly one payload:
//!
//! - [`Payload::Declarative`] - structured YAML fields, read as-is
//! - [`Payload::Script`] - a script in one of the [`ScriptDialect`]s
//!
//! The accessors (`name`, `url`, `method`, ...) never run a script. For
//! scripted molds they scan the source for marker lines such as
//! `meta:name: <value>` or `doc:url: <value>`; a missing marker reads as an
//! empty string.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::headers::Headers;
use super::request::{Auth, Options};
use crate::error::{Error, Result};

/// Supported script dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptDialect {
    Starlark,
    Lua,
}

impl ScriptDialect {
    /// Dialect for a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "star" | "starlark" => Some(ScriptDialect::Starlark),
            "lua" => Some(ScriptDialect::Lua),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptDialect::Starlark => "starlark",
            ScriptDialect::Lua => "lua",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ScriptDialect::Starlark => "star",
            ScriptDialect::Lua => "lua",
        }
    }
}

impl fmt::Display for ScriptDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative request fields, as found in a YAML request file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarativeRequest {
    /// Set by whoever loads the file, usually from the file stem.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub prev_req: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub auth: Option<Auth>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub options: Options,
    /// Source text the fields were parsed from.
    #[serde(skip)]
    pub raw: String,
}

/// Script source plus the dialect it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    pub dialect: ScriptDialect,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Declarative(DeclarativeRequest),
    Script(ScriptRequest),
}

/// One authored request.
///
/// `Clone` is a deep copy: headers, body and options are owned values, so a
/// cloned mold never aliases the universe it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMold {
    payload: Payload,
    origin: Option<PathBuf>,
}

// Candidate patterns per metadata field; first match wins.
static NAME_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?m)^.*?meta:name:(.*)$"]));
static URL_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?m)^.*?doc:url:(.*)$", r"(?m)^[ \t]*url[ \t]*=(.*)$"]));
static METHOD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?m)^.*?doc:method:(.*)$",
        r"(?m)^[ \t]*method[ \t]*=(.*)$",
    ])
});
static PREV_REQ_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?m)^.*?meta:prev_req:(.*)$"]));
static OUTPUT_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?m)^.*?meta:output:(.*)$"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("metadata pattern must compile"))
        .collect()
}

fn find_with_patterns(source: &str, patterns: &[Regex]) -> String {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(source))
        .and_then(|caps| caps.get(1))
        .map(|m| clean_marker_value(m.as_str()))
        .unwrap_or_default()
}

/// Trims whitespace, a trailing table-field comma and all quote characters.
fn clean_marker_value(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(',')
        .trim()
        .replace(['"', '\''], "")
}

impl RequestMold {
    pub fn declarative(request: DeclarativeRequest) -> Self {
        Self {
            payload: Payload::Declarative(request),
            origin: None,
        }
    }

    pub fn from_script(dialect: ScriptDialect, script: impl Into<String>) -> Self {
        Self {
            payload: Payload::Script(ScriptRequest {
                dialect,
                script: script.into(),
            }),
            origin: None,
        }
    }

    /// Parses a declarative YAML request file.
    pub fn from_yaml(name: impl Into<String>, raw: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let raw = raw.into();
        let mut request = if raw.trim().is_empty() {
            DeclarativeRequest::default()
        } else {
            serde_yaml::from_str::<DeclarativeRequest>(&raw).map_err(|e| Error::InvalidMold {
                name: name.clone(),
                message: e.to_string(),
            })?
        };
        request.name = name;
        request.raw = raw;
        Ok(Self::declarative(request))
    }

    /// Builds a mold from a file name and its content, dispatching on the
    /// extension. Declarative molds take their name from the file stem.
    pub fn from_file_parts(path: impl AsRef<Path>, content: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mold = match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml(stem, content)?,
            other => match ScriptDialect::from_extension(other) {
                Some(dialect) => Self::from_script(dialect, content),
                None => {
                    return Err(Error::InvalidMold {
                        name: stem,
                        message: format!("unsupported request file extension '{}'", ext),
                    })
                }
            },
        };
        Ok(mold.with_origin(path))
    }

    /// Remembers the file this mold was loaded from.
    pub fn with_origin(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin = Some(path.into());
        self
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn as_declarative(&self) -> Option<&DeclarativeRequest> {
        match &self.payload {
            Payload::Declarative(request) => Some(request),
            Payload::Script(_) => None,
        }
    }

    pub fn as_declarative_mut(&mut self) -> Option<&mut DeclarativeRequest> {
        match &mut self.payload {
            Payload::Declarative(request) => Some(request),
            Payload::Script(_) => None,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptRequest> {
        match &self.payload {
            Payload::Script(script) => Some(script),
            Payload::Declarative(_) => None,
        }
    }

    /// Short content kind: `yaml`, `star` or `lua`.
    pub fn content_type(&self) -> &'static str {
        match &self.payload {
            Payload::Declarative(_) => "yaml",
            Payload::Script(script) => script.dialect.extension(),
        }
    }

    pub fn name(&self) -> String {
        self.project(|r| r.name.clone(), &NAME_PATTERNS)
    }

    /// URL as documented. For scripts this is a display hint only; the URL
    /// actually requested comes from evaluating the script.
    pub fn url(&self) -> String {
        self.project(|r| r.url.clone(), &URL_PATTERNS)
    }

    /// Method as documented, with the same caveat as [`RequestMold::url`].
    pub fn method(&self) -> String {
        self.project(|r| r.method.clone(), &METHOD_PATTERNS)
    }

    pub fn previous_request(&self) -> String {
        self.project(|r| r.prev_req.clone(), &PREV_REQ_PATTERNS)
    }

    pub fn output(&self) -> String {
        self.project(|r| r.output.clone(), &OUTPUT_PATTERNS)
    }

    pub fn raw(&self) -> String {
        match &self.payload {
            Payload::Declarative(request) => request.raw.clone(),
            Payload::Script(script) => script.script.clone(),
        }
    }

    fn project<F>(&self, declarative: F, patterns: &[Regex]) -> String
    where
        F: FnOnce(&DeclarativeRequest) -> String,
    {
        match &self.payload {
            Payload::Declarative(request) => declarative(request),
            Payload::Script(script) => find_with_patterns(&script.script, patterns),
        }
    }
}
