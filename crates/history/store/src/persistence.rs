pub mod pool;
pub mod record;
pub mod schema;
pub mod store;
