// src/models/permission.rs

// Slugs de permissão concedidos aos agentes através dos cargos.

pub const CONVERSATIONS_READ_ALL: &str = "conversations:read_all";
pub const CONVERSATIONS_READ_UNASSIGNED: &str = "conversations:read_unassigned";
pub const CONVERSATIONS_READ_ASSIGNED: &str = "conversations:read_assigned";
pub const CONVERSATIONS_READ_TEAM_INBOX: &str = "conversations:read_team_inbox";
pub const CONVERSATIONS_READ_TEAM_ALL: &str = "conversations:read_team_all";

pub const CONVERSATIONS_WRITE: &str = "conversations:write";
pub const CONVERSATIONS_UPDATE_USER_ASSIGNEE: &str = "conversations:update_user_assignee";
pub const CONVERSATIONS_UPDATE_TEAM_ASSIGNEE: &str = "conversations:update_team_assignee";
pub const CONVERSATIONS_UPDATE_STATUS: &str = "conversations:update_status";
pub const CONVERSATIONS_UPDATE_TAGS: &str = "conversations:update_tags";

pub const CONTACTS_READ: &str = "contacts:read";
pub const CONTACTS_WRITE: &str = "contacts:write";
pub const ORGANIZATIONS_MANAGE: &str = "organizations:manage";
pub const STATUS_MANAGE: &str = "status:manage";
pub const SETTINGS_MANAGE: &str = "settings:manage";
