mod object_storage_client;
pub(crate) use object_storage_client::*;

mod refresh_processor;
pub(crate) use refresh_processor::*;

mod secret_provider;
pub(crate) use secret_provider::*;

mod youtube_search;
pub(crate) use youtube_search::*;
