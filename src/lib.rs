//! Registration data for a fan convention: events, charities, discounts,
//! merchandise, departments, attendees, staff and their emergency contacts,
//! managed through a GraphQL admin API.

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod graphql;
pub mod models;
pub mod util;
