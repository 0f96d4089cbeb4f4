pub mod middleware;
pub mod validation;
