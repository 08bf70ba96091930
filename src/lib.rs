//! # property-search
//!
//! Natural-language search over a corpus of rental listings. A free-text
//! query is turned into structured constraints, a semantic candidate pool is
//! pulled from the vector index, and the pool is filtered, boosted and ranked
//! with a human-readable explanation per result.
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────┐
//!                        │  User Query  │
//!                        └──────┬───────┘
//!                               │
//!                  ┌────────────┴────────────┐
//!                  ▼                         ▼
//!        ┌───────────────────┐      ┌─────────────────┐
//!        │ Query Extraction  │      │ Query Embedding │
//!        │ LLM ─fallback─▶   │      │  (Ollama/OpenAI)│
//!        │ rules + vocabulary│      └────────┬────────┘
//!        └─────────┬─────────┘               │
//!                  │ constraints             ▼
//!                  │              ┌─────────────────────┐
//!                  │              │  Candidate Retrieval │
//!                  │              │  top 50 by cosine    │
//!                  │              └──────────┬──────────┘
//!                  └────────────┬────────────┘
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │  Hard Filters           │
//!                  │  budget, exact beds,    │
//!                  │  bathroom floor         │
//!                  └────────────┬────────────┘
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │  Boosts                 │
//!                  │  location +0.15         │
//!                  │  type +0.10, amenity    │
//!                  │  +0.05, proximity +0.10 │
//!                  └────────────┬────────────┘
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │ Stable sort, top_k,     │
//!                  │ explanations            │
//!                  └─────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, corpus path, and LLM settings
//! - [`models`] - Listings, structured constraints, candidates and request/response types
//! - [`knowledge`] - Vocabulary of cities, neighborhoods, amenities and nearby-place types
//! - [`query::rules`] - Deterministic regex and vocabulary constraint extraction
//! - [`query::llm`] - LLM constraint extraction with rule-based fallback
//! - [`search::vector`] - In-memory cosine-similarity index
//! - [`search::retriever`] - Candidate source seam over the vector index
//! - [`search::ranking`] - Hard filters, boosts, stable ranking and explanations
//! - [`llm::embeddings`] - Batch embedding generation via Ollama or OpenAI-compatible APIs
//! - [`llm::chat`] - Non-streaming JSON chat completions
//! - [`ingest`] - Corpus loading, listing embedding and index rebuilds
//! - [`api`] - Axum HTTP handlers for health, search, listings and reindexing
//! - [`state`] - Shared application state

pub mod api;
pub mod config;
pub mod ingest;
pub mod knowledge;
pub mod llm;
pub mod models;
pub mod query;
pub mod search;
pub mod state;
