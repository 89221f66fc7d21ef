//! Researcher Search - clients for the search backends
//!
//! Azure AI Search is used for the internal PowerPoint report knowledge base;
//! Serper and OpenAI provide web search, selected through `SEARCH_PROVIDER`.

pub mod azure;
pub mod http;
pub mod openai_web;
pub mod serper;
pub mod web;

pub use azure::{AzureSearchClient, AzureSearchConfig, PowerPointReport, ReportRef, Slide};
pub use http::HttpClientConfig;
pub use openai_web::OpenAiWebSearch;
pub use serper::SerperClient;
pub use web::{create_web_search, WebSearchProvider, WebSearchResponse, WebSearchResult};
