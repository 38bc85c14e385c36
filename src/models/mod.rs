// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod connection;
pub mod workout;

pub use connection::Connection;
pub use workout::WorkoutRecord;
