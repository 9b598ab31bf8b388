// Declaration model and loading
// What to evaluate: projects, features, metrics and output categories

pub mod declaration;
pub mod yaml_loader;

// Re-export main API
pub use declaration::{Declaration, Feature, ProjectDeclaration, StatisticCategory};
pub use yaml_loader::{declaration_from_str, load_declaration, DeclarationError};
