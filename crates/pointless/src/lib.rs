#![allow(clippy::doc_markdown)] // Allow brand names like OpenAI, Jira without backticks
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

//! Story point estimation from reference stories.
//!
//! This crate resolves a mix of inline stories and tracker references into
//! plain text, then asks a scoring backend to estimate points for a target
//! story by comparing it with reference stories of known size.
//!
//! - **Story model** - inline stories, reference stories, locations, request/response
//! - **Adapters** - fetch stories from Jira, including points field discovery
//! - **Pointers** - prompt an LLM (or a local stub) for a structured decision
//! - **Orchestrator** - resolve every location, then score
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pointless::{
//!     JiraAdapter, JiraConfig, LlmConfig, PointLessEngineBuilder, PointLessOrchestrator,
//!     PointLessRequest, ReferenceStory, StoryLocation,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = PointLessEngineBuilder::new(LlmConfig::from_env()?).build()?;
//!     let jira = JiraAdapter::new(JiraConfig::from_env())?;
//!     let orchestrator = PointLessOrchestrator::new(Arc::new(engine), Arc::new(jira));
//!
//!     let response = orchestrator
//!         .point_story(
//!             PointLessRequest::new(StoryLocation::jira("SCRUM-1")).with_reference(
//!                 ReferenceStory::new(
//!                     "The Simple Bug Fix",
//!                     "Fixed a typo in the login button text",
//!                     1.0,
//!                 ),
//!             ),
//!         )
//!         .await?;
//!
//!     println!("{} points: {}", response.points, response.explanation);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod pointer;

pub use adapter::{JiraAdapter, SourceRouter, StorySourceAdapter};
pub use config::{JiraConfig, LlmConfig, LlmProvider};
pub use error::{PointlessError, PointlessResult};
pub use models::{
    PointLessRequest, PointerRequest, PointerResponse, ReferenceStory, Story, StoryInput,
    StoryLocation, StorySource,
};
pub use orchestrator::PointLessOrchestrator;
pub use pointer::{
    LanguageModel, LocalModel, OpenAiModel, OutputSchema, PointLessEngine, PointLessEngineBuilder,
    Pointer,
};
