// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

type Catalog = HashMap<&'static str, &'static str>;

/// Catálogo de mensagens em memória (en, pt) com interpolação de `{name}`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, Catalog>,
}

const EN: &[(&str, &str)] = &[
    ("globals.invalid", "Invalid value: {name}."),
    ("globals.invalidFields", "One or more fields are invalid."),
    ("globals.empty", "{name} cannot be empty."),
    ("globals.required", "{name} is required."),
    ("globals.notFound", "{name} not found."),
    ("globals.permissionDenied", "Permission denied."),
    ("globals.internalError", "An unexpected error occurred."),
    ("conversation.resolveWithoutAssignee", "Cannot resolve a conversation without an assigned user."),
    ("conversation.viewPermissionDenied", "You are not allowed to use this view."),
    ("conversation.notMemberOfTeam", "You are not a member of this team."),
    ("contact.alreadyExistsWithEmail", "A contact with this email already exists."),
    ("contact.noEmailForSetPassword", "This contact has no email to send the set password link to."),
    ("status.cannotDeleteDefault", "Default statuses cannot be deleted."),
    ("portal.disabled", "The customer portal is disabled."),
    ("portal.noAccountWithEmail", "No account found with this email."),
    ("portal.defaultInboxRequired", "A default inbox is required to enable the portal."),
    ("inbox.disabled", "This inbox is disabled."),
    ("auth.invalidCredentials", "Invalid email or password."),
    ("auth.invalidToken", "Invalid or missing authentication token."),
    ("user.accountDisabled", "This account is disabled."),
    ("mail.sendFailed", "The email could not be sent."),
    ("terms.conversation", "Conversation"),
    ("terms.user", "User"),
    ("terms.team", "Team"),
    ("terms.view", "View"),
    ("terms.status", "Status"),
    ("terms.inbox", "Inbox"),
    ("terms.contact", "Contact"),
    ("terms.organization", "Organization"),
    ("terms.member", "Organization member"),
];

const PT: &[(&str, &str)] = &[
    ("globals.invalid", "Valor inválido: {name}."),
    ("globals.invalidFields", "Um ou mais campos são inválidos."),
    ("globals.empty", "{name} não pode ficar vazio."),
    ("globals.required", "{name} é obrigatório."),
    ("globals.notFound", "{name} não encontrado(a)."),
    ("globals.permissionDenied", "Permissão negada."),
    ("globals.internalError", "Ocorreu um erro inesperado."),
    ("conversation.resolveWithoutAssignee", "Não é possível resolver uma conversa sem agente atribuído."),
    ("conversation.viewPermissionDenied", "Você não pode usar esta visualização."),
    ("conversation.notMemberOfTeam", "Você não faz parte deste time."),
    ("contact.alreadyExistsWithEmail", "Já existe um contato com este e-mail."),
    ("contact.noEmailForSetPassword", "Este contato não tem e-mail para receber o link de senha."),
    ("status.cannotDeleteDefault", "Status padrão não podem ser excluídos."),
    ("portal.disabled", "O portal do cliente está desativado."),
    ("portal.noAccountWithEmail", "Nenhuma conta encontrada com este e-mail."),
    ("portal.defaultInboxRequired", "É preciso uma caixa de entrada padrão para ativar o portal."),
    ("inbox.disabled", "Esta caixa de entrada está desativada."),
    ("auth.invalidCredentials", "E-mail ou senha inválidos."),
    ("auth.invalidToken", "Token de autenticação inválido ou ausente."),
    ("user.accountDisabled", "Esta conta está desativada."),
    ("mail.sendFailed", "Não foi possível enviar o e-mail."),
    ("terms.conversation", "Conversa"),
    ("terms.user", "Usuário"),
    ("terms.team", "Time"),
    ("terms.view", "Visualização"),
    ("terms.status", "Status"),
    ("terms.inbox", "Caixa de entrada"),
    ("terms.contact", "Contato"),
    ("terms.organization", "Organização"),
    ("terms.member", "Membro da organização"),
];

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("pt", PT.iter().copied().collect());
        Self { catalogs }
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .copied()
    }

    /// Traduz `key`; idioma desconhecido cai no inglês e chave desconhecida volta como está.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.lookup(lang, key).unwrap_or(key).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    pub fn term(&self, lang: &str, entity: &str) -> String {
        self.lookup(lang, &format!("terms.{}", entity))
            .unwrap_or(entity)
            .to_string()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("de", "globals.required", &[("name", "`content`")]),
            "`content` is required."
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(I18nStore::new().translate("pt", "nope.missing", &[]), "nope.missing");
    }

    #[test]
    fn every_english_key_has_a_portuguese_entry() {
        let store = I18nStore::new();
        for (key, _) in EN {
            assert!(store.catalogs["pt"].contains_key(key), "falta {key} em pt");
        }
    }
}
