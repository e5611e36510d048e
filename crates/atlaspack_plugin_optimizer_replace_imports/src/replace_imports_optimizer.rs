use anyhow::Error;
use async_trait::async_trait;

use crate::import_replacer::ImportReplacer;
use crate::optimizer_plugin::{OptimizeContext, OptimizedBundle, OptimizerPlugin};
use crate::replace_imports_config::ReplaceImportsConfig;

/// Replaces imports of externalised modules in emitted bundles with reads off globals
#[derive(Debug)]
pub struct ReplaceImportsOptimizerPlugin {
  import_replacer: ImportReplacer,
}

impl ReplaceImportsOptimizerPlugin {
  pub fn new(config: ReplaceImportsConfig) -> Self {
    ReplaceImportsOptimizerPlugin {
      import_replacer: ImportReplacer::new(config),
    }
  }

  pub fn with_replacer(import_replacer: ImportReplacer) -> Self {
    ReplaceImportsOptimizerPlugin { import_replacer }
  }

  /// Configures the plugin from the `replaceImports` key of a package.json.
  ///
  /// Without that key no import is replaced.
  pub fn from_package_json(raw: &str) -> Result<Self, Error> {
    let config = ReplaceImportsConfig::from_package_json(raw)?.unwrap_or_default();

    Ok(ReplaceImportsOptimizerPlugin::new(config))
  }
}

#[async_trait]
impl OptimizerPlugin for ReplaceImportsOptimizerPlugin {
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(plugin = "ReplaceImportsOptimizerPlugin", bundle = ctx.bundle_name)
  )]
  async fn optimize<'a>(&self, ctx: OptimizeContext<'a>) -> Result<OptimizedBundle, Error> {
    let result = self.import_replacer.rewrite_with_report(ctx.contents);

    if !result.replaced_imports.is_empty() {
      tracing::debug!(
        count = result.replaced_imports.len(),
        "Replaced imports with globals"
      );
    }

    Ok(OptimizedBundle {
      contents: result.code,
    })
  }
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;

  async fn optimize(plugin: &ReplaceImportsOptimizerPlugin, contents: &str) -> String {
    plugin
      .optimize(OptimizeContext {
        bundle_name: "index.js",
        contents,
      })
      .await
      .unwrap()
      .contents
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn replaces_imports_in_bundle_contents() {
    let plugin = ReplaceImportsOptimizerPlugin::from_package_json(indoc! {r#"
      {
        "name": "app",
        "replaceImports": {
          "replacementLookup": { "@material-ui/core": "window.MaterialUI" },
          "replacementRegExps": [
            { "pattern": "^@material-ui/icons/(\\w+)$", "source": "window.MaterialUIIcons.${1}" }
          ]
        }
      }
    "#})
    .unwrap();

    let contents = indoc! {r#"
      import { Button as MuiButton } from '@material-ui/core';
      import * as Star from '@material-ui/icons/Star';
      import App from './App';
    "#};

    assert_eq!(
      optimize(&plugin, contents).await,
      indoc! {r#"
        const { Button: MuiButton } = window.MaterialUI;
        const Star = window.MaterialUIIcons.Star;
        import App from './App';
      "#}
    );
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn leaves_bundles_untouched_without_config() {
    let plugin = ReplaceImportsOptimizerPlugin::from_package_json(r#"{ "name": "app" }"#).unwrap();
    let contents = "import React from 'react';\nReact.render();";

    assert_eq!(optimize(&plugin, contents).await, contents);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn uses_a_custom_replacer() {
    let plugin = ReplaceImportsOptimizerPlugin::with_replacer(
      ImportReplacer::builder()
        .replacement_regexp("^@scope/(.+)$", |captures| {
          format!("window.Scope.{}", &captures[1])
        })
        .build(),
    );

    assert_eq!(
      optimize(&plugin, "import * as utils from '@scope/utils';").await,
      "const utils = window.Scope.utils;"
    );
  }

  #[test]
  fn errors_on_malformed_package_json() {
    assert!(ReplaceImportsOptimizerPlugin::from_package_json("not json").is_err());
  }
}
