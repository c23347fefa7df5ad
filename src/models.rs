// src/models.rs

pub mod actor;
pub mod auth;
pub mod contact;
pub mod conversation;
pub mod inbox;
pub mod organization;
pub mod pagination;
pub mod permission;
pub mod scope;
pub mod settings;
pub mod status;
pub mod team;
pub mod view;

/// Identificador numérico das tabelas (BIGSERIAL no Postgres).
pub type DbId = i64;
