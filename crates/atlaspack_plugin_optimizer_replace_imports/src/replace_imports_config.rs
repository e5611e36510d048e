use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// The declaration keyword used for the generated bindings
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
  #[default]
  Const,
  Let,
  Var,
}

impl VarType {
  pub fn keyword(&self) -> &'static str {
    match self {
      VarType::Const => "const",
      VarType::Let => "let",
      VarType::Var => "var",
    }
  }
}

impl fmt::Display for VarType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.keyword())
  }
}

/// A pattern mapping as it appears in a config file.
///
/// `source` is a replacement template, expanded against the captures of `pattern` with the
/// `$1` / `${name}` syntax of [`regex::Captures::expand`]. A `$` that belongs to the expression,
/// as in `window.$`, is written `$$`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ReplacementRegExp {
  pub pattern: String,
  pub source: String,
}

/// Configuration for the replace imports optimizer
///
/// ```json
/// {
///   "varType": "const",
///   "replacementLookup": { "@material-ui/core": "window.MaterialUI" },
///   "replacementRegExps": [{ "pattern": "^lodash/(\\w+)$", "source": "window._.${1}" }]
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplaceImportsConfig {
  pub var_type: VarType,
  /// Exact module specifiers mapped to the global expression that replaces them
  pub replacement_lookup: HashMap<String, String>,
  /// Checked in order when no exact mapping exists, the first matching pattern wins
  #[serde(rename = "replacementRegExps")]
  pub replacement_regexps: Vec<ReplacementRegExp>,
}

#[derive(Debug, Deserialize)]
pub struct PackageJson {
  #[serde(rename = "replaceImports")]
  pub config: Option<ReplaceImportsConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Error parsing replaceImports config: {0}")]
  Parse(#[from] serde_json::Error),
}

impl ReplaceImportsConfig {
  pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(raw)?)
  }

  /// Reads the `replaceImports` key of a package.json document, if there is one
  pub fn from_package_json(raw: &str) -> Result<Option<Self>, ConfigError> {
    let package_json = serde_json::from_str::<PackageJson>(raw)?;

    Ok(package_json.config)
  }
}
