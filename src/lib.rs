// Library exports for Masterblog
// This allows integration tests and external code to use Masterblog modules

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod shell;
pub mod view;
