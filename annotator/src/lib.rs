//! A/B loop markers and named breakpoints on top of an embeddable video
//! player, persisted per video in a cookie jar.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod jar;
pub mod library;
pub mod model;
pub mod monitor;
pub mod player;
pub mod render;
pub mod session;
pub mod video_id;

#[cfg(test)]
mod testing;
