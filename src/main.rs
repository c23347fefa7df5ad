//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, portal::portal_guard};
use crate::services::notifier::spawn_webhook_forwarder;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env().expect("Falha ao carregar a configuração.");
    let app_state = AppState::new(&config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let _webhooks = spawn_webhook_forwarder(&app_state.event_bus, config.webhook_urls.clone(), config.side_effect_timeout)
        .expect("Falha ao iniciar o envio de webhooks.");

    // Rotas públicas de autenticação do painel
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Rotas do painel (agentes), todas atrás do JWT
    let agent_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route("/conversations", post(handlers::conversations::create_conversation))
        .route("/conversations/all", get(handlers::conversations::list_all))
        .route("/conversations/unassigned", get(handlers::conversations::list_unassigned))
        .route("/conversations/assigned", get(handlers::conversations::list_assigned))
        .route("/conversations/mentioned", get(handlers::conversations::list_mentioned))
        .route("/conversations/{uuid}", get(handlers::conversations::get_conversation))
        .route("/conversations/{uuid}/assignee/user", put(handlers::conversations::assign_user))
        .route("/conversations/{uuid}/assignee/team", put(handlers::conversations::assign_team))
        .route("/conversations/{uuid}/assignee/{kind}", delete(handlers::conversations::unassign))
        .route("/conversations/{uuid}/status", put(handlers::conversations::update_status))
        .route("/conversations/{uuid}/share", put(handlers::conversations::update_share))
        .route("/conversations/{uuid}/tags", put(handlers::conversations::set_tags))
        .route(
            "/conversations/{uuid}/custom-attributes",
            put(handlers::conversations::update_custom_attributes),
        )
        .route("/teams/{team_id}/conversations/unassigned", get(handlers::conversations::list_team_unassigned))
        .route("/teams/{team_id}/conversations/all", get(handlers::conversations::list_team_all))
        .route("/views/{view_id}/conversations", get(handlers::conversations::list_view))
        // Status
        .route(
            "/statuses",
            get(handlers::statuses::list_statuses).post(handlers::statuses::create_status),
        )
        .route(
            "/statuses/{id}",
            put(handlers::statuses::rename_status).delete(handlers::statuses::delete_status),
        )
        // Contatos
        .route("/contacts", post(handlers::contacts::create_contact))
        .route(
            "/contacts/{id}",
            get(handlers::contacts::get_contact).put(handlers::contacts::update_contact),
        )
        .route("/contacts/{id}/block", put(handlers::contacts::block_contact))
        .route("/contacts/{id}/send-set-password", post(handlers::contacts::send_set_password))
        .route("/contacts/{id}/organizations", get(handlers::contacts::list_memberships))
        // Organizações
        .route(
            "/organizations",
            get(handlers::organizations::list_organizations).post(handlers::organizations::create_organization),
        )
        .route(
            "/organizations/{id}",
            get(handlers::organizations::get_organization)
                .put(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            "/organizations/{id}/members",
            get(handlers::organizations::list_members).post(handlers::organizations::add_member),
        )
        .route(
            "/organizations/{id}/members/{contact_id}",
            put(handlers::organizations::update_member_share).delete(handlers::organizations::remove_member),
        )
        .route(
            "/organizations/{id}/domains",
            get(handlers::organizations::list_domains).post(handlers::organizations::add_domain),
        )
        .route("/organizations/{id}/domains/{domain}", delete(handlers::organizations::remove_domain))
        // Configurações
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Portal: login público e rotas do contato, ambos só com o portal ativo
    let portal_public_routes = Router::new()
        .route("/auth/login", post(handlers::auth::portal_login))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/set-password", post(handlers::auth::set_password));

    let portal_contact_routes = Router::new()
        .route("/me", get(handlers::portal::get_me))
        .route(
            "/conversations",
            get(handlers::portal::list_conversations).post(handlers::portal::create_conversation),
        )
        .route("/conversations/{uuid}", get(handlers::portal::get_conversation))
        .route("/conversations/{uuid}/messages", post(handlers::portal::send_message))
        .route("/conversations/{uuid}/close", post(handlers::portal::close_conversation))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let portal_routes = portal_public_routes
        .merge(portal_contact_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), portal_guard));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/portal", portal_routes)
        .nest("/api", agent_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", config.bind_addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
