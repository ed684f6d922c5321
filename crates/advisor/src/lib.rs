//! Advisor - FinOps recommendation review
//!
//! Fetches cost-optimization recommendations from a FinOps hub backend, lets
//! the user filter, search and select them, forwards the selection to the AI
//! analysis endpoint and merges the returned advice back into the list.

pub mod advice;
pub mod client;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod markup;
pub mod model;
pub mod normalize;
pub mod output;
pub mod selection;
pub mod session;
pub mod store;
pub mod view;

// Re-export commonly used types for easier testing
pub use client::{ClientConfig, ClientError, HttpClient, RecommendationApi};
pub use dashboard::{ActionError, Dashboard, Status};
pub use model::{Recommendation, Source, SourceDetails};
pub use store::{Entry, EntryId, Store};
