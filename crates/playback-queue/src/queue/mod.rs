mod traits;
pub use traits::*;

mod types;
pub use types::*;

mod builder;
pub use builder::*;

mod watched;
pub use watched::*;

mod controller;
pub use controller::*;

#[cfg(test)]
mod controller_tests;
