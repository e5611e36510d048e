pub use import_replacer::*;
pub use optimizer_plugin::*;
pub use replace_imports_config::*;
pub use replace_imports_optimizer::*;

mod declarations;
mod import_replacer;
mod optimizer_plugin;
mod replace_imports_config;
mod replace_imports_optimizer;
