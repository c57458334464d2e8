// src/lib.rs

//! Folio: collection browsing engine for a headless-CMS marketing site.
//!
//! Fetches the site's remote content collections (news, team, projects),
//! normalizes the records, and drives paginated, searchable, filterable
//! listing views from a single controller.

pub mod controller;
pub mod error;
pub mod models;
pub mod pages;
pub mod services;
pub mod utils;
pub mod view;
