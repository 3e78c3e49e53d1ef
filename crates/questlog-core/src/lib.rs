//! Core library for questlog, a gamified productivity tracker client.
//!
//! This crate holds everything that is not presentation:
//!
//! - `api`: the request gateway that attaches the session credential to every
//!   call and turns authorization failures into a session-expired signal
//! - `auth`: credential encoding and the persisted session
//! - `events`: the session-expired publish/subscribe channel
//! - `models`: quests, goals, achievements, dashboard and admin types
//! - `storage`: the key-value cells that survive restarts
//! - `timer`: the single active quest timer and its one-second ticker
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod events;
pub mod models;
pub mod storage;
pub mod timer;
pub mod utils;
