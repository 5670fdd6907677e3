pub mod access;
pub mod api_router;
pub mod auth;
pub mod config;
pub mod risks;
pub mod scoring;
pub mod security;
pub mod shared;
