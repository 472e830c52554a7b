mod in_memory;
pub(crate) mod on_disk;

pub(crate) use in_memory::*;
