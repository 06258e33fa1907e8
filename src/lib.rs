pub mod builder;
pub mod cli;
pub mod format;
pub mod writer;

pub use builder::run;
