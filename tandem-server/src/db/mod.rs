//! Database access layer for tandem-server
//!
//! Queries run against the long-lived pool held in `AppState`. Multi-statement
//! writes (signup, preference replace, account deletion) are transactional.

pub mod languages;
pub mod users;

pub use languages::{load_languages, replace_languages};
pub use users::{
    create_user, delete_user, find_user_by_email, find_user_by_id, list_profiles,
    load_candidate_pool, NewUser,
};
