pub mod event_repo;
pub mod registration_repo;

pub use event_repo::PgEventSchedule;
pub use registration_repo::PgRegistrationStore;
