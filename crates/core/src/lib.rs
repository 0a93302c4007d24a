//! Core of the Lobianco site: content model, persistence, uploads, sessions
//! and the procedure layer shared by the HTTP server and the client library.

#![deny(unused_doc_comments)]

pub mod auth;
pub mod content;
pub mod events;
pub mod seed;
pub mod service;
pub mod storage;
pub mod store;

pub use service::{Caller, ContentService, ServiceError, ServiceResult, Session, StoreHealth};
