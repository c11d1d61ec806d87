pub mod config;
pub mod decide;
pub mod replay;
