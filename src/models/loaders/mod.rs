pub mod toml_loader;

pub use toml_loader::{load_problem_file, parse_problem_toml};
