/// Database models
///
/// Each model owns its CRUD operations over the sqlx pool. Handlers
/// call these directly; there is no intermediate service layer.
///
/// # Models
///
/// - `user`: user accounts and roles
/// - `workshop`: workshop offerings
/// - `enrollment`: the enrollment ledger (user ↔ workshop)
/// - `home`: singleton homepage content

pub mod enrollment;
pub mod home;
pub mod user;
pub mod workshop;
