// Job search: query normalization, scoring, ranking and the HTTP handlers.
// Everything below handlers is pure and synchronous.

pub mod engine;
pub mod handlers;
pub mod query;
pub mod scoring;
