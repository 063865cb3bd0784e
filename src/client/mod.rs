pub mod scaffold;
pub mod validate;
