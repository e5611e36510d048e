use async_trait::async_trait;
use std::fmt::Debug;

pub struct OptimizeContext<'a> {
  /// Name of the emitted bundle, used for diagnostics only
  pub bundle_name: &'a str,
  pub contents: &'a str,
}

#[derive(Debug, PartialEq)]
pub struct OptimizedBundle {
  pub contents: String,
}

/// Optimises a bundle
///
/// Optimizers run once the contents of a bundle are final, and may apply any transformation to
/// the emitted code before it is written.
///
/// Multiple optimizer plugins may run in series, and the result of each optimizer is passed to
/// the next.
#[async_trait]
pub trait OptimizerPlugin: Debug + Send + Sync {
  /// Transforms the contents of a bundle
  async fn optimize<'a>(&self, ctx: OptimizeContext<'a>) -> Result<OptimizedBundle, anyhow::Error>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug)]
  struct TestOptimizerPlugin {}

  #[async_trait]
  impl OptimizerPlugin for TestOptimizerPlugin {
    async fn optimize<'a>(
      &self,
      ctx: OptimizeContext<'a>,
    ) -> Result<OptimizedBundle, anyhow::Error> {
      Ok(OptimizedBundle {
        contents: ctx.contents.to_uppercase(),
      })
    }
  }

  #[test]
  fn can_be_defined_in_dyn_vec() {
    let mut optimizers = Vec::<Box<dyn OptimizerPlugin>>::new();

    optimizers.push(Box::new(TestOptimizerPlugin {}));

    assert_eq!(optimizers.len(), 1);
  }

  #[tokio::test]
  async fn passes_contents_through_optimizers_in_series() {
    let optimizers: Vec<Box<dyn OptimizerPlugin>> =
      vec![Box::new(TestOptimizerPlugin {}), Box::new(TestOptimizerPlugin {})];

    let mut contents = String::from("bundle");
    for optimizer in &optimizers {
      contents = optimizer
        .optimize(OptimizeContext {
          bundle_name: "index.js",
          contents: &contents,
        })
        .await
        .unwrap()
        .contents;
    }

    assert_eq!(contents, "BUNDLE");
  }
}
