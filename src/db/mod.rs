pub mod entities;
pub mod enums;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;
