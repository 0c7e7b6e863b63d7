pub mod applications;
pub mod auth;
pub mod contracts;
pub mod gigs;
