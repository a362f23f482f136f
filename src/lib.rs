//! Photography gallery service: landing page plus the gallery REST API.
//!
//! ARCHITECTURE
//! ============
//! `config` loads typed settings, `db` owns the pool and migrations,
//! `services` hold SQL and business rules, and `routes` shapes HTTP on top
//! of them. `images` and `models` are plain types shared by every layer.

pub mod config;
pub mod db;
pub mod images;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
