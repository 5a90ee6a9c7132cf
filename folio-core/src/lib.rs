//! Core library for the folio portfolio site: data model, collaborator
//! traits with Supabase implementations, the content editing session, and
//! the top-level application state.

pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod notify;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
