pub mod resolver;
pub mod statusz;

pub use resolver::{ResolverOptions, TargetResolver};
pub use statusz::{StatusOptions, StatusPage};
