/// Persistence layer
///
/// - `pool`: PostgreSQL connection pool construction and health checks
/// - `migrations`: startup migration runner

pub mod migrations;
pub mod pool;
