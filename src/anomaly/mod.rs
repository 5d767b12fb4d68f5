pub mod alias;
pub mod builder;
pub mod config;
pub mod error;
pub mod half_space_tree;
pub mod tree;

pub use config::HalfSpaceTreeConfig;
pub use error::HstError;
pub use half_space_tree::HalfSpaceTree;
