pub mod cache;
pub mod fixtures;
pub mod history;
pub mod http_client;
pub mod matcher;
pub mod pipeline;
pub mod results;
pub mod scoring;
pub mod selector;
pub mod settle;
pub mod types;
