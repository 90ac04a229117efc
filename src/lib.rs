//! Sheet → Drive → WordPress synchronisation engine.
//!
//! Each spreadsheet row is an entity. For every entity the engine scans its
//! Drive folder, downloads new images, uploads web-ready variants exactly once,
//! upserts a single post and writes a page-builder document next to the files.

pub mod config;
pub mod drive;
pub mod entity;
pub mod logging;
pub mod model;
pub mod naming;
pub mod optimize;
pub mod pipeline;
pub mod publisher;
pub mod reconcile;
pub mod scanner;
pub mod sheet;
pub mod store;
pub mod summary;
pub mod template;
pub mod upsert;
pub mod wordpress;
