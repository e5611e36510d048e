use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::declarations::BindingClause;
use crate::replace_imports_config::{ReplaceImportsConfig, VarType};

/// `import <bindings> from '<specifier>'`, one statement per match
static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"import\s+([A-Za-z0-9_$*\s{},]*)\s+from\s+('.*?'|".*?")"#).unwrap()
});

/// A `$$` escape, or a `${name}` / `$name` capture group reference in a replacement template
static TEMPLATE_REFERENCE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\$\$|\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").unwrap());

/// Capture group references in `template` that `regex` does not define. These expand to nothing.
fn unknown_template_references<'t>(regex: &Regex, template: &'t str) -> Vec<&'t str> {
  TEMPLATE_REFERENCE
    .captures_iter(template)
    .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
    .map(|reference| reference.as_str())
    .filter(|reference| match reference.parse::<usize>() {
      Ok(index) => index >= regex.captures_len(),
      Err(_) => !regex
        .capture_names()
        .any(|name| name == Some(*reference)),
    })
    .collect()
}

pub type ResolveSourceFn = dyn Fn(&Captures<'_>) -> String + Send + Sync;

/// Produces the global expression for a specifier matched by a pattern mapping
#[derive(Clone)]
pub enum SourceResolver {
  /// Expanded against the pattern captures, see [`Captures::expand`]. `$1` and `${name}` refer to
  /// capture groups, a literal `$` is written `$$`.
  Template(String),
  Custom(Arc<ResolveSourceFn>),
}

impl SourceResolver {
  pub fn custom(resolve: impl Fn(&Captures<'_>) -> String + Send + Sync + 'static) -> Self {
    SourceResolver::Custom(Arc::new(resolve))
  }

  fn resolve(&self, captures: &Captures<'_>) -> String {
    match self {
      SourceResolver::Template(template) => {
        let mut source = String::new();
        captures.expand(template, &mut source);
        source
      }
      SourceResolver::Custom(resolve) => resolve(captures),
    }
  }
}

impl fmt::Debug for SourceResolver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceResolver::Template(template) => f.debug_tuple("Template").field(template).finish(),
      SourceResolver::Custom(_) => f.write_str("Custom(..)"),
    }
  }
}

#[derive(Clone, Debug)]
struct PatternReplacement {
  regex: Regex,
  resolver: SourceResolver,
}

/// An import statement that has been replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplacedImport {
  /// The module specifier without quotes, `'react'` is `react`
  pub specifier: String,
  /// The global expression the bindings now read from
  pub source: String,
  /// Byte range of the whole statement in the original code
  pub span: Range<usize>,
}

#[derive(Debug, PartialEq)]
pub struct ReplaceImportsResult {
  pub code: String,
  pub replaced_imports: Vec<ReplacedImport>,
}

/// Builder for [`ImportReplacer`]. Patterns are compiled on `build`.
#[derive(Default)]
pub struct ImportReplacerBuilder {
  var_type: VarType,
  replacement_lookup: HashMap<String, String>,
  replacement_regexps: Vec<(String, SourceResolver)>,
}

impl ImportReplacerBuilder {
  pub fn var_type(mut self, var_type: VarType) -> Self {
    self.var_type = var_type;
    self
  }

  pub fn replacement(mut self, specifier: impl Into<String>, source: impl Into<String>) -> Self {
    self
      .replacement_lookup
      .insert(specifier.into(), source.into());
    self
  }

  pub fn replacement_lookup(mut self, replacement_lookup: HashMap<String, String>) -> Self {
    self.replacement_lookup.extend(replacement_lookup);
    self
  }

  pub fn replacement_regexp(
    mut self,
    pattern: impl Into<String>,
    resolve: impl Fn(&Captures<'_>) -> String + Send + Sync + 'static,
  ) -> Self {
    self
      .replacement_regexps
      .push((pattern.into(), SourceResolver::custom(resolve)));
    self
  }

  pub fn replacement_template(
    mut self,
    pattern: impl Into<String>,
    template: impl Into<String>,
  ) -> Self {
    self
      .replacement_regexps
      .push((pattern.into(), SourceResolver::Template(template.into())));
    self
  }

  /// Patterns that are not valid regular expressions are dropped
  pub fn build(self) -> ImportReplacer {
    let replacement_regexps = self
      .replacement_regexps
      .into_iter()
      .filter_map(|(pattern, resolver)| match Regex::new(&pattern) {
        Ok(regex) => {
          if let SourceResolver::Template(template) = &resolver {
            for reference in unknown_template_references(&regex, template) {
              tracing::warn!(
                %pattern,
                %template,
                %reference,
                "Unknown capture group reference in replacement template, use $$ for a literal $"
              );
            }
          }

          Some(PatternReplacement { regex, resolver })
        }
        Err(error) => {
          tracing::warn!(%pattern, %error, "Dropping invalid replacement pattern");
          None
        }
      })
      .collect();

    ImportReplacer {
      var_type: self.var_type,
      replacement_lookup: self.replacement_lookup,
      replacement_regexps,
    }
  }
}

/// Replaces `import` statements for configured modules with declarations that read the same
/// bindings off a global expression.
///
/// ```skip
/// import React, { useState as useS } from 'react';
/// ```
///
/// with `react` mapped to `window.React` becomes
///
/// ```skip
/// const { useState: useS } = window.React;
/// const React = window.React && Object.prototype.hasOwnProperty.call(window.React, 'default') ? window.React['default'] : window.React;
/// ```
///
/// This works on the text of the code and never parses it. Statements that do not match, or that
/// import a module without a mapping, are left exactly as they are.
#[derive(Clone, Debug, Default)]
pub struct ImportReplacer {
  var_type: VarType,
  replacement_lookup: HashMap<String, String>,
  replacement_regexps: Vec<PatternReplacement>,
}

impl From<ReplaceImportsConfig> for ImportReplacer {
  fn from(config: ReplaceImportsConfig) -> Self {
    ImportReplacer::new(config)
  }
}

impl ImportReplacer {
  pub fn new(config: ReplaceImportsConfig) -> Self {
    config
      .replacement_regexps
      .into_iter()
      .fold(
        ImportReplacer::builder()
          .var_type(config.var_type)
          .replacement_lookup(config.replacement_lookup),
        |builder, replacement| builder.replacement_template(replacement.pattern, replacement.source),
      )
      .build()
  }

  pub fn builder() -> ImportReplacerBuilder {
    ImportReplacerBuilder::default()
  }

  /// Finds the global expression for a module specifier.
  ///
  /// Exact mappings win over patterns, and only the first matching pattern is used. Empty
  /// expressions count as no replacement.
  pub fn resolve_source(&self, specifier: &str) -> Option<String> {
    if let Some(source) = self
      .replacement_lookup
      .get(specifier)
      .filter(|source| !source.is_empty())
    {
      return Some(source.clone());
    }

    self
      .replacement_regexps
      .iter()
      .find_map(|replacement| {
        replacement
          .regex
          .captures(specifier)
          .map(|captures| replacement.resolver.resolve(&captures))
      })
      .filter(|source| !source.is_empty())
  }

  pub fn rewrite(&self, code: &str) -> String {
    self.rewrite_with_report(code).code
  }

  /// Same as `rewrite`, also listing every import that was replaced
  pub fn rewrite_with_report(&self, code: &str) -> ReplaceImportsResult {
    let mut output = String::with_capacity(code.len());
    let mut replaced_imports = Vec::new();
    let mut last_end = 0;

    for captures in IMPORT_STATEMENT.captures_iter(code) {
      let (Some(statement), Some(binding_clause), Some(quoted_specifier)) =
        (captures.get(0), captures.get(1), captures.get(2))
      else {
        continue;
      };

      let specifier = quoted_specifier.as_str().replace(['\'', '"'], "");
      let Some(source) = self.resolve_source(&specifier) else {
        continue;
      };

      let Some(bindings) = BindingClause::parse(binding_clause.as_str()) else {
        continue;
      };

      tracing::debug!(%specifier, %source, "Replacing import with global");

      output.push_str(&code[last_end..statement.start()]);
      output.push_str(&bindings.to_declarations(self.var_type, &source));
      last_end = statement.end();

      replaced_imports.push(ReplacedImport {
        specifier,
        source,
        span: statement.range(),
      });
    }

    output.push_str(&code[last_end..]);

    ReplaceImportsResult {
      code: output,
      replaced_imports,
    }
  }
}
