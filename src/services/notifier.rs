// src/services/notifier.rs

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use crate::models::actor::{Actor, ActorRef};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "conversation.created")]
    ConversationCreated,
    #[serde(rename = "conversation.user_assigned")]
    UserAssigned,
    #[serde(rename = "conversation.team_assigned")]
    TeamAssigned,
    #[serde(rename = "conversation.user_unassigned")]
    UserUnassigned,
    #[serde(rename = "conversation.team_unassigned")]
    TeamUnassigned,
    #[serde(rename = "conversation.status_changed")]
    StatusChanged,
    #[serde(rename = "conversation.tags_changed")]
    TagsChanged,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ConversationCreated => "conversation.created",
            EventKind::UserAssigned => "conversation.user_assigned",
            EventKind::TeamAssigned => "conversation.team_assigned",
            EventKind::UserUnassigned => "conversation.user_unassigned",
            EventKind::TeamUnassigned => "conversation.team_unassigned",
            EventKind::StatusChanged => "conversation.status_changed",
            EventKind::TagsChanged => "conversation.tags_changed",
        }
    }
}

/// Evento de ciclo de vida, emitido depois que a escrita foi gravada.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub event: EventKind,
    pub conversation_uuid: Uuid,
    pub actor: ActorRef,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(event: EventKind, conversation_uuid: Uuid, actor: &Actor, payload: Value) -> Self {
        Self {
            event,
            conversation_uuid,
            actor: actor.reference(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Colaborador de notificação. Fire-and-forget: nada é devolvido ao chamador.
pub trait EventNotifier: Send + Sync {
    fn emit(&self, event: LifecycleEvent);
}

/// Barramento em processo sobre `tokio::sync::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventNotifier for EventBus {
    fn emit(&self, event: LifecycleEvent) {
        tracing::info!(
            event = event.event.as_str(),
            conversation = %event.conversation_uuid,
            actor_id = event.actor.id,
            "Evento emitido"
        );
        // Erro aqui só significa que não há assinantes
        let _ = self.sender.send(event);
    }
}

/// Assina o barramento e faz POST de cada evento em todos os webhooks configurados.
///
/// Falhas de entrega são apenas logadas. Sem URLs, nenhuma task é criada.
pub fn spawn_webhook_forwarder(
    bus: &EventBus,
    urls: Vec<String>,
    request_timeout: Duration,
) -> anyhow::Result<Option<JoinHandle<()>>> {
    if urls.is_empty() {
        return Ok(None);
    }

    let client = reqwest::Client::builder().timeout(request_timeout).build()?;
    Ok(Some(tokio::spawn(forward_to_webhooks(bus.subscribe(), client, urls))))
}

async fn forward_to_webhooks(
    mut receiver: broadcast::Receiver<LifecycleEvent>,
    client: reqwest::Client,
    urls: Vec<String>,
) {
    loop {
        let event = match receiver.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Encaminhador de webhooks atrasado, eventos descartados");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        for url in &urls {
            match client.post(url).json(&event).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => tracing::warn!(
                    url = url.as_str(),
                    status = response.status().as_u16(),
                    event = event.event.as_str(),
                    "Webhook respondeu com erro"
                ),
                Err(e) => tracing::warn!(
                    url = url.as_str(),
                    error = %e,
                    event = event.event.as_str(),
                    "Falha ao entregar webhook"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actor::{ContactIdentity, UserType};

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let actor = Actor::Contact(ContactIdentity {
            id: 9,
            first_name: "Rui".into(),
            last_name: "Costa".into(),
            email: None,
        });

        bus.emit(LifecycleEvent::new(
            EventKind::TagsChanged,
            Uuid::new_v4(),
            &actor,
            serde_json::json!({ "tags": ["vip"] }),
        ));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, EventKind::TagsChanged);
        assert_eq!(received.actor.user_type, UserType::Contact);
        assert_eq!(received.payload["tags"][0], "vip");
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::default();
        let actor = Actor::Contact(ContactIdentity {
            id: 1,
            first_name: "A".into(),
            last_name: "B".into(),
            email: None,
        });
        bus.emit(LifecycleEvent::new(EventKind::ConversationCreated, Uuid::new_v4(), &actor, Value::Null));
    }

    #[test]
    fn event_names_serialize_dotted() {
        let json = serde_json::to_value(EventKind::StatusChanged).unwrap();
        assert_eq!(json, "conversation.status_changed");
    }

    #[tokio::test]
    async fn forwarder_is_not_spawned_without_urls() {
        let bus = EventBus::default();
        let handle = spawn_webhook_forwarder(&bus, vec![], Duration::from_secs(1)).unwrap();
        assert!(handle.is_none());
    }

    // Lê uma requisição HTTP completa (cabeçalhos + corpo por Content-Length)
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    #[tokio::test]
    async fn events_are_posted_and_failing_urls_are_skipped() {
        use tokio::{io::AsyncWriteExt, net::TcpListener};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live_url = format!("http://{}/hooks", listener.local_addr().unwrap());

        // Porta fechada: conexão recusada, o evento segue para a próxima URL
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_url = format!("http://{}/hooks", closed.local_addr().unwrap());
        drop(closed);

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
            request
        });

        let bus = EventBus::default();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .no_proxy()
            .build()
            .unwrap();
        let forwarder = tokio::spawn(forward_to_webhooks(bus.subscribe(), client, vec![dead_url, live_url]));

        let conversation = Uuid::new_v4();
        let actor = Actor::Contact(ContactIdentity {
            id: 3,
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            email: None,
        });
        bus.emit(LifecycleEvent::new(
            EventKind::StatusChanged,
            conversation,
            &actor,
            serde_json::json!({ "statusId": 4 }),
        ));

        let request = tokio::time::timeout(Duration::from_secs(10), server)
            .await
            .expect("webhook não recebeu o evento")
            .unwrap();
        forwarder.abort();

        assert!(request.starts_with("POST /hooks "));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let json: Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["event"], "conversation.status_changed");
        assert_eq!(json["conversationUuid"], conversation.to_string());
        assert_eq!(json["payload"]["statusId"], 4);
    }
}
