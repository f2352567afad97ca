pub mod driver;
pub mod policy;

pub use driver::AiDriver;
