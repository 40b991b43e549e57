use serde::{Deserialize, Serialize};

use crate::data_models::{DEFAULT_RESULTS, ResultSet, SafeSearch, SearchOrder, SearchRequest};
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default)]
    pub order: SearchOrder,
    #[serde(default)]
    pub safe_search: SafeSearch,
}

fn default_max_results() -> u32 {
    DEFAULT_RESULTS
}

impl SearchBody {
    pub fn into_request(self) -> Result<SearchRequest> {
        SearchRequest::new(self.query, self.max_results, self.order, self.safe_search)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: ResultSet,
    pub total_results: usize,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
