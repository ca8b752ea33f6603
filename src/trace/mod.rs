pub mod logger;
pub mod trace;
