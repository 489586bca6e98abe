pub mod ninja;
pub mod scout;
