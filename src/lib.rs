//! pitchside library
//!
//! Cached access to API-Football leagues, teams and fixtures. The binary is a
//! thin shell over `repository::FootballRepository`; the modules are public so
//! integration tests can assemble repositories with fake transports and clocks.

pub mod api;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod normalize;
pub mod repository;
pub mod season;
pub mod session;
