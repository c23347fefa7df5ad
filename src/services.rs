// src/services.rs

pub mod access_guard;
pub mod assignment_service;
pub mod auth;
pub mod contact_service;
pub mod conversation_service;
pub mod mailer;
pub mod notifier;
pub mod organization_service;
pub mod permission_resolver;
pub mod settings_service;
pub mod status_service;
