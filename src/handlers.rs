// src/handlers.rs

pub mod auth;
pub mod contacts;
pub mod conversations;
pub mod organizations;
pub mod portal;
pub mod settings;
pub mod statuses;
