use std::sync::LazyLock;

use regex::Regex;

use crate::replace_imports_config::VarType;

static NAMESPACE_BINDING: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\*\s+as\s+([A-Za-z0-9_$]+)").unwrap());

static NAMED_BINDINGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());

static RENAMED_BINDING: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([A-Za-z0-9_$]+)\s+as\s+([A-Za-z0-9_$]+)").unwrap());

/// Everything in a binding clause that is not part of the default binding
static NON_DEFAULT_BINDING: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\{[^}]*\}|\*\s+as\s+[A-Za-z0-9_$]+|[,\s]").unwrap()
});

static IDENTIFIER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// The bindings named between `import` and `from`.
///
/// Real import syntax allows at most one default binding and one of either a namespace or a
/// named bindings clause, but every occurrence found is kept, in the order it appears.
#[derive(Debug, Default, PartialEq)]
pub struct BindingClause {
  /// `NS` for every `* as NS`
  pub namespaces: Vec<String>,
  /// Each `{ ... }` block, with `a as b` already rewritten to `a: b`
  pub named: Vec<String>,
  pub default: Option<String>,
}

impl BindingClause {
  /// Returns `None` when the clause binds nothing, or when what is left over for the default
  /// binding is not an identifier. In that second case the namespace and named pieces are
  /// rejected along with it, so the statement is kept as written instead of being replaced with
  /// a declaration of something like `1x`.
  pub fn parse(binding_clause: &str) -> Option<Self> {
    let binding_clause = binding_clause.trim();

    let namespaces = NAMESPACE_BINDING
      .captures_iter(binding_clause)
      .filter_map(|captures| captures.get(1))
      .map(|name| name.as_str().to_string())
      .collect::<Vec<_>>();

    let named = NAMED_BINDINGS
      .find_iter(binding_clause)
      .map(|block| {
        RENAMED_BINDING
          .replace_all(block.as_str(), "${1}: ${2}")
          .into_owned()
      })
      .collect::<Vec<_>>();

    let remainder = NON_DEFAULT_BINDING.replace_all(binding_clause, "");
    let default = if remainder.is_empty() {
      None
    } else if IDENTIFIER.is_match(&remainder) {
      Some(remainder.into_owned())
    } else {
      return None;
    };

    let clause = BindingClause {
      namespaces,
      named,
      default,
    };

    if clause.is_empty() {
      return None;
    }

    Some(clause)
  }

  pub fn is_empty(&self) -> bool {
    self.namespaces.is_empty() && self.named.is_empty() && self.default.is_none()
  }

  /// Builds the statements binding every name off `source`, separated by `;\n`.
  ///
  /// The default binding prefers a `default` key on `source` and falls back to `source` itself,
  /// since a global may either be the default export or hold it.
  pub fn to_declarations(&self, var_type: VarType, source: &str) -> String {
    let mut pieces = Vec::new();

    for name in &self.namespaces {
      pieces.push(format!("{var_type} {name} = {source}"));
    }

    for block in &self.named {
      pieces.push(format!("{var_type} {block} = {source}"));
    }

    if let Some(name) = &self.default {
      pieces.push(format!(
        "{var_type} {name} = {source} && Object.prototype.hasOwnProperty.call({source}, 'default') ? {source}['default'] : {source}"
      ));
    }

    pieces.join(";\n")
  }
}
