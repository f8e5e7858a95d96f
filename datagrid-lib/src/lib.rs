//! Data grid state library
//!
//! State management for an editable, sortable, selectable data grid: column
//! decoration, in-memory sorting, inline-edit drafts, saving through a
//! persistence service and reconciling refreshed rows.

pub mod cache;
pub mod config;
pub mod draft;
pub mod error;
pub mod event;
pub mod model;
pub mod selection;
pub mod service;
pub mod sort;

mod controller;

pub use controller::*;
