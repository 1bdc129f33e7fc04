pub mod config;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod record;
