//! Core library for spotify-pkce-login
pub mod config;
pub mod error;
pub mod api;
pub mod session;
pub mod flow;
pub mod view;
