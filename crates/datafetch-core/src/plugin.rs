//! Static validation of retrieved plugin descriptors.
//!
//! Plugins are either YAML documents or Python modules. Neither is
//! executed: YAML is parsed as data, modules are scanned for top-level
//! string assignments.

use std::path::Path;
use std::path::PathBuf;

use serde_yaml::Value;
use tracing::debug;

use crate::FetchError;
use crate::Result;

const MISSING_ATTRIBUTES: &str = "missing `interface` and/or `name` attribute";

/// Interfaces a stock GeoIPS installation registers.
const GEOIPS_INTERFACES: &[&str] = &[
    "algorithms",
    "colormappers",
    "coverage_checkers",
    "databases",
    "feature_annotators",
    "filename_formatters",
    "gridline_annotators",
    "interpolators",
    "output_checkers",
    "output_formatters",
    "procflows",
    "product_defaults",
    "products",
    "readers",
    "sector_adjusters",
    "sector_metadata_generators",
    "sector_spec_generators",
    "sectors",
    "title_formatters",
    "workflows",
];

/// Descriptor format, decided from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// Python module (`.py`).
    Module,
    /// YAML document (anything else).
    Yaml,
}

impl PluginKind {
    /// Classifies `path` by extension.
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "py") {
            Self::Module
        } else {
            Self::Yaml
        }
    }
}

/// The two attributes every plugin declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Source file.
    pub path: PathBuf,
    /// Descriptor format.
    pub kind: PluginKind,
    /// Interface the plugin implements.
    pub interface: String,
    /// Plugin name within the interface.
    pub name: String,
}

/// Lookup of interfaces able to judge a plugin.
pub trait InterfaceRegistry {
    /// Returns `true` if `name` is a valid plugin of `interface`.
    fn plugin_is_valid(&self, interface: &str, name: &str) -> bool;
}

/// Registry over a fixed list of interface names.
///
/// A plugin is valid when its interface is known and its name is a
/// non-empty identifier (ASCII alphanumerics, `_`, `-` or `.`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownInterfaces {
    names: Vec<String>,
}

impl KnownInterfaces {
    /// Registry over `names`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Known interface names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for KnownInterfaces {
    fn default() -> Self {
        Self::new(GEOIPS_INTERFACES.iter().copied())
    }
}

impl InterfaceRegistry for KnownInterfaces {
    fn plugin_is_valid(&self, interface: &str, name: &str) -> bool {
        self.names.iter().any(|known| known == interface)
            && !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    }
}

/// Reads the descriptor of a YAML plugin.
///
/// # Errors
///
/// Returns `InvalidPlugin` if the file cannot be read, is not YAML, or
/// lacks a string `interface` or `name`.
pub fn read_yaml_descriptor(path: &Path) -> Result<PluginDescriptor> {
    let text = read_text(path)?;
    let document: Value = serde_yaml::from_str(&text)
        .map_err(|e| invalid(path, format!("malformed YAML: {e}")))?;

    let field = |key: &str| document.get(key).and_then(Value::as_str).map(str::to_string);
    match (field("interface"), field("name")) {
        (Some(interface), Some(name)) => Ok(PluginDescriptor {
            path: path.to_path_buf(),
            kind: PluginKind::Yaml,
            interface,
            name,
        }),
        _ => Err(invalid(path, MISSING_ATTRIBUTES)),
    }
}

/// Reads the descriptor of a Python module plugin.
///
/// Only unindented `interface = "..."` and `name = "..."` assignments
/// are recognised; the first occurrence of each wins.
///
/// # Errors
///
/// Returns `InvalidPlugin` if the file cannot be read or either
/// assignment is missing.
pub fn read_module_descriptor(path: &Path) -> Result<PluginDescriptor> {
    let text = read_text(path)?;
    let mut interface = None;
    let mut name = None;

    for line in text.lines() {
        let Some((target, value)) = top_level_assignment(line) else {
            continue;
        };
        match target {
            "interface" if interface.is_none() => interface = Some(value.to_string()),
            "name" if name.is_none() => name = Some(value.to_string()),
            _ => {}
        }
    }

    match (interface, name) {
        (Some(interface), Some(name)) => Ok(PluginDescriptor {
            path: path.to_path_buf(),
            kind: PluginKind::Module,
            interface,
            name,
        }),
        _ => Err(invalid(path, MISSING_ATTRIBUTES)),
    }
}

/// Reads the descriptor of `path` and checks it against `registry`.
///
/// # Errors
///
/// Returns `InvalidPlugin` if the descriptor cannot be read or the
/// registry rejects it.
pub fn validate_plugin(path: &Path, registry: &dyn InterfaceRegistry) -> Result<PluginDescriptor> {
    let descriptor = match PluginKind::classify(path) {
        PluginKind::Module => read_module_descriptor(path)?,
        PluginKind::Yaml => read_yaml_descriptor(path)?,
    };

    debug!(
        path = %path.display(),
        interface = %descriptor.interface,
        name = %descriptor.name,
        "checking plugin"
    );

    if registry.plugin_is_valid(&descriptor.interface, &descriptor.name) {
        Ok(descriptor)
    } else {
        Err(invalid(
            path,
            format!(
                "plugin `{}` is not valid for interface `{}`",
                descriptor.name, descriptor.interface
            ),
        ))
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| invalid(path, format!("cannot read file: {e}")))
}

fn invalid(path: &Path, reason: impl Into<String>) -> FetchError {
    FetchError::InvalidPlugin {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Parses `target = "value"` (or single-quoted) at column zero.
fn top_level_assignment(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }

    let (target, rest) = line.split_once('=')?;
    let rest = rest.trim_start();
    if rest.starts_with('=') {
        return None;
    }

    let quote = rest.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let body = &rest[1..];
    let end = body.find(quote)?;

    Some((target.trim(), &body[..end]))
}
