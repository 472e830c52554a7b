mod health;
mod refresh;

pub(crate) use health::readiness_check;
pub(crate) use refresh::run_refresh;
