mod render;

pub(crate) use render::*;
