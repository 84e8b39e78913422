// Service exports
pub mod dispatch;
pub mod postgres;
pub mod store;
pub mod supabase;

pub use dispatch::{DispatchError, DispatchService, LoadRequestMatches};
pub use postgres::PostgresStore;
pub use store::{DispatchStore, StoreError};
pub use supabase::{SupabaseClient, SupabaseTables};
