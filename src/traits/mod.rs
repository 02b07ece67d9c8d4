pub mod environment_resolver;
pub mod github_api;
pub mod scanner;
