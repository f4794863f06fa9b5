pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod push;
pub mod services;
pub mod store;

#[cfg(test)]
pub mod testing;
