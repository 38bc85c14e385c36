//! Database layer (Supabase REST).

pub mod supabase;

pub use supabase::SupabaseDb;

/// Table names as constants.
pub mod tables {
    pub const CONNECTIONS: &str = "connections";
    pub const WORKOUTS: &str = "workouts";
}
