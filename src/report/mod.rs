pub mod engagement;
pub mod metrics;
pub mod template;
pub mod validate;
