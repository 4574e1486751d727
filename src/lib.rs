//! chat2html library
//!
//! Converts a Google Takeout "Google Chat" archive into styled, printable
//! HTML transcripts, one file per chat. The crate is split into:
//!
//! - `archive`: Takeout layout, JSON models, timestamps
//! - `shape`: heuristic Hebrew/Latin text-direction reshaping
//! - `document`: block model and the HTML backend
//! - `app`: CLI configuration and export orchestration

pub mod app;
pub mod archive;
pub mod document;
pub mod error;
pub mod sanitize;
pub mod shape;
