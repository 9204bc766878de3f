// Account creation. An account and its profile are always created together.

pub mod handlers;
pub mod namespace;
pub mod service;
