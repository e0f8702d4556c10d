pub mod index;
pub mod model;
pub mod normalizer;
pub mod resolver;
