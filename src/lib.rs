pub mod aqi;
pub mod board;
pub mod cache;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod geocode;
pub mod interpolate;
pub mod output;
pub mod parser;
pub mod spatial;
pub mod station;
pub mod summary;
pub mod ward;
