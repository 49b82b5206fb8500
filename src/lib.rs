pub mod error;
pub mod experiment;
pub mod sim;
pub mod topo;
pub mod wifi;

pub use error::{QdError, Result};

#[cfg(test)]
mod test;
