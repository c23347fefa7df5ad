// src/services/permission_resolver.rs

use crate::{
    common::error::AppError,
    models::{permission, scope::Scope},
};

// Tabela fixa permissão -> escopo, avaliada em ordem
const SCOPE_RULES: [(&str, Scope); 4] = [
    (permission::CONVERSATIONS_READ_UNASSIGNED, Scope::Unassigned),
    (permission::CONVERSATIONS_READ_ASSIGNED, Scope::AssignedToMe),
    (permission::CONVERSATIONS_READ_TEAM_INBOX, Scope::TeamUnassigned),
    (permission::CONVERSATIONS_READ_TEAM_ALL, Scope::TeamAll),
];

/// Converte o conjunto de permissões do agente na lista de escopos que ele pode listar.
///
/// `read_all` devolve só `All`. `TeamUnassigned` é omitido quando `TeamAll`
/// também é concedido. Lista vazia vira `PermissionDenied`.
pub fn resolve_scopes(permissions: &[String]) -> Result<Vec<Scope>, AppError> {
    let granted = |slug: &str| permissions.iter().any(|p| p == slug);

    if granted(permission::CONVERSATIONS_READ_ALL) {
        return Ok(vec![Scope::All]);
    }

    let team_all = granted(permission::CONVERSATIONS_READ_TEAM_ALL);
    let mut scopes = Vec::with_capacity(SCOPE_RULES.len());
    for (slug, scope) in SCOPE_RULES {
        if !granted(slug) {
            continue;
        }
        if scope == Scope::TeamUnassigned && team_all {
            continue;
        }
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }

    if scopes.is_empty() {
        return Err(AppError::PermissionDenied("globals.permissionDenied"));
    }
    Ok(scopes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorKind;

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn read_all_short_circuits() {
        let scopes = resolve_scopes(&perms(&[
            permission::CONVERSATIONS_READ_UNASSIGNED,
            permission::CONVERSATIONS_READ_ALL,
            permission::CONVERSATIONS_READ_TEAM_ALL,
        ]))
        .unwrap();
        assert_eq!(scopes, vec![Scope::All]);
    }

    #[test]
    fn team_all_elides_team_unassigned() {
        let scopes = resolve_scopes(&perms(&[
            permission::CONVERSATIONS_READ_TEAM_INBOX,
            permission::CONVERSATIONS_READ_TEAM_ALL,
        ]))
        .unwrap();
        assert_eq!(scopes, vec![Scope::TeamAll]);
    }

    #[test]
    fn team_inbox_alone_gives_team_unassigned() {
        let scopes = resolve_scopes(&perms(&[permission::CONVERSATIONS_READ_TEAM_INBOX])).unwrap();
        assert_eq!(scopes, vec![Scope::TeamUnassigned]);
    }

    #[test]
    fn output_follows_rule_order_and_is_deduplicated() {
        let scopes = resolve_scopes(&perms(&[
            permission::CONVERSATIONS_READ_ASSIGNED,
            permission::CONVERSATIONS_READ_UNASSIGNED,
            permission::CONVERSATIONS_READ_ASSIGNED,
        ]))
        .unwrap();
        assert_eq!(scopes, vec![Scope::Unassigned, Scope::AssignedToMe]);
    }

    #[test]
    fn no_read_permission_is_denied() {
        let err = resolve_scopes(&perms(&[permission::CONVERSATIONS_WRITE])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }
}
