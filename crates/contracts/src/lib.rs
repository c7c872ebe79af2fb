pub mod alloy;
pub mod artifact;
pub mod paths;
