pub mod config;
pub mod logging;

pub mod crawler;
pub mod fetch_or_replace;
pub mod harvest;
pub mod http;
pub mod ledger;
pub mod pipeline;
pub mod run_log;
pub mod sitemap;
pub mod storage;
pub mod url_model;
