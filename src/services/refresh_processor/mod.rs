mod processor;
mod traits;

pub(crate) use processor::*;
pub(crate) use traits::*;
