pub mod abi;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs_utils;
pub mod generator;
pub mod logging;
pub mod network;
pub mod templating;
pub mod types;
pub mod wizard;

#[cfg(test)]
pub mod test_utils;
