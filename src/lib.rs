pub mod api;
pub mod cache;
pub mod config;
pub mod data_models;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod ranker;
pub mod search_client;
pub mod stats_fetcher;
pub mod youtube;

pub use data_models::{RankKey, ResultSet, SafeSearch, SearchOrder, SearchRequest, VideoRecord};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineOptions};
