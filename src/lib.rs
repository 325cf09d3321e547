//! teachassist - streaming client for an AI teaching portal
//!
//! The portal's generation features (syllabus, lesson plan, quiz, Q&A,
//! homework help) are served by functions that answer with an SSE body of
//! `data: <JSON>` frames. This crate sends those requests and turns the
//! streamed body into one growing text, with:
//!
//! - **Streaming**: chunk decoding, line splitting, frame parsing and
//!   accumulation with progress callbacks and cancellation
//! - **API**: typed requests, status-to-error mapping, a mockable backend
//! - **Quiz**: answer-key stripping and question parsing for students
//! - **DOCX**: raw text extraction from uploaded documents
//!
//! # Quick Start
//!
//! ```ignore
//! use teachassist::api::{AssistantClient, Generator};
//! use teachassist::api::types::TeachingAssistantRequest;
//! use teachassist::notify::SilentNotifier;
//! use teachassist::streaming::CancelToken;
//!
//! let config = teachassist::config::Config::load(None)?;
//! let generator = Generator::new(AssistantClient::new(&config)?, Arc::new(SilentNotifier));
//! let request = TeachingAssistantRequest::quiz("doc-id").into();
//! let done = generator.generate(&request, &CancelToken::new(), |text| {
//!     println!("{} chars so far", text.len());
//! }).await?;
//! ```

// ─── Core ───────────────────────────────────────────────────────────
pub mod api;
pub mod config;
pub mod errors;
pub mod streaming;
pub mod telemetry;

// ─── Content utilities ─────────────────────────────────────────────
pub mod docx;
pub mod quiz;

// ─── Frontend ──────────────────────────────────────────────────────
pub mod cli;
pub mod notify;
