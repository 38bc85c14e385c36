// SPDX-License-Identifier: MIT

//! Crewsync: sync Concept2 rower workouts into a club-management database.
//!
//! This crate provides the backend glue between the club web app and the
//! Concept2 Logbook API: OAuth token exchange, token verification, and a
//! paginated workout sync that upserts results into Supabase.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SupabaseDb;
use services::{Concept2Client, SyncService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub concept2: Concept2Client,
    pub sync_service: SyncService,
}
