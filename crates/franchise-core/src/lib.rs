//! Season lifecycle for the Franchise league simulation.
//!
//! This crate owns everything that moves a league through its seasons: the
//! staged league state, phase transitions with the preseason batch at
//! their heart, schedule generation, free agency, narrative events, the UI
//! message bridge, the account check, auto play, and the read-side views.
//!
//! # Modules
//!
//! - [`account`] -- Account status check and achievement upload.
//! - [`attributes`] -- Game attributes with season-scoped values.
//! - [`auto_play`] -- Arming a multi-season auto play.
//! - [`config`] -- Configuration loading from `franchise-config.yaml`.
//! - [`events`] -- Narrative events for the news feed.
//! - [`finances`] -- Budget levels and default ticket prices.
//! - [`free_agents`] -- AI signings and contract demands.
//! - [`league`] -- [`League`] and staged [`Txn`] operations.
//! - [`local`] -- Per-session state.
//! - [`phase`] -- Phase transitions.
//! - [`player`] -- Ratings development, values, and jersey numbers.
//! - [`random`] -- Random draws used across the simulation.
//! - [`runner`] -- The bounded auto play loop.
//! - [`schedule`] -- Schedule generation and upcoming games.
//! - [`team`] -- Team season rows, ratings, and identity updates.
//! - [`ui`] -- Messages from the league to the UI.
//! - [`views`] -- Read-side payloads.
//!
//! [`League`]: league::League
//! [`Txn`]: league::Txn

pub mod account;
pub mod attributes;
pub mod auto_play;
pub mod config;
pub mod events;
pub mod finances;
pub mod free_agents;
pub mod league;
pub mod local;
pub mod phase;
pub mod player;
pub mod random;
pub mod runner;
pub mod schedule;
pub mod team;
pub mod ui;
pub mod views;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;
