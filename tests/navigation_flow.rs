use anyhow::Result;
use async_trait::async_trait;
use guide_bot::catalog::{Catalog, Section};
use guide_bot::navigation::menu::{back_keyboard, menu_keyboard};
use guide_bot::navigation::{
    Chunk, ConversationStore, DefaultGuideView, DeliveryError, GuideView, NavEvent,
    NavigationController, NavigationState, NavigationTransport,
};
use guide_bot::render::ContentRenderer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Send(Chunk),
    RemoveUi,
    Ack(Option<String>),
}

/// Transport that records every call; sends fail once `fail_after` sends succeeded.
#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    sends: AtomicUsize,
    fail_after: Option<usize>,
}

impl RecordingTransport {
    fn failing_after(sends: usize) -> Self {
        Self {
            fail_after: Some(sends),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn sent(&self) -> Vec<Chunk> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(chunk) => Some(chunk),
                _ => None,
            })
            .collect()
    }

    fn acks(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Ack(alert) => Some(alert),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl NavigationTransport for RecordingTransport {
    async fn send_chunk(&self, chunk: &Chunk) -> Result<()> {
        let n = self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| n >= limit) {
            anyhow::bail!("Forbidden: bot was blocked by the user");
        }
        self.record(Call::Send(chunk.clone()));
        Ok(())
    }

    async fn remove_ui(&self) -> Result<()> {
        self.record(Call::RemoveUi);
        Ok(())
    }

    async fn acknowledge(&self, alert: Option<String>) -> Result<()> {
        self.record(Call::Ack(alert));
        Ok(())
    }
}

fn section(id: &str, title: &str, body: &str) -> Section {
    Section {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
    }
}

fn controller_with(catalog: Catalog, max_len: usize) -> NavigationController {
    NavigationController::new(
        Arc::new(catalog),
        ContentRenderer::new(max_len),
        ConversationStore::new(60, 1_000),
        Duration::ZERO,
    )
}

fn atlas_controller() -> NavigationController {
    controller_with(
        Catalog::from_sections(vec![section("atlas", "Atlas", "<h2>Atlas</h2><p>Guide</p>")]),
        3500,
    )
}

#[tokio::test]
async fn start_shows_menu() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    let transport = RecordingTransport::default();

    controller.dispatch(&transport, 1, NavEvent::Start).await?;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, DefaultGuideView::welcome_message());
    assert_eq!(sent[0].keyboard, Some(menu_keyboard(controller.catalog())));
    assert_eq!(controller.store().snapshot(1).await, Some(NavigationState::Menu));
    Ok(())
}

#[tokio::test]
async fn selecting_section_renders_body_with_back_button() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    let transport = RecordingTransport::default();

    controller
        .dispatch(&transport, 1, NavEvent::from_callback_data("section:atlas"))
        .await?;

    assert_eq!(
        transport.sent(),
        vec![Chunk::with_keyboard("Atlas\n\nGuide", back_keyboard())]
    );
    assert_eq!(
        controller.store().snapshot(1).await,
        Some(NavigationState::Viewing("atlas".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn unknown_section_alerts_once_and_keeps_state() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    let transport = RecordingTransport::default();
    controller
        .dispatch(&transport, 1, NavEvent::SelectSection("atlas".to_string()))
        .await?;

    let lookup = RecordingTransport::default();
    controller
        .dispatch(&lookup, 1, NavEvent::from_callback_data("section:does-not-exist"))
        .await?;

    assert!(lookup.sent().is_empty());
    assert_eq!(
        lookup.acks(),
        vec![Some(DefaultGuideView::section_not_found().to_string())]
    );
    assert_eq!(
        controller.store().snapshot(1).await,
        Some(NavigationState::Viewing("atlas".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn back_returns_to_same_menu_as_start() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    let start = RecordingTransport::default();
    controller.dispatch(&start, 1, NavEvent::Start).await?;
    controller
        .dispatch(&RecordingTransport::default(), 1, NavEvent::SelectSection("atlas".to_string()))
        .await?;

    let back = RecordingTransport::default();
    controller
        .dispatch(&back, 1, NavEvent::from_callback_data("back"))
        .await?;

    assert_eq!(back.sent()[0].keyboard, start.sent()[0].keyboard);
    assert_eq!(controller.store().snapshot(1).await, Some(NavigationState::Menu));
    Ok(())
}

#[tokio::test]
async fn empty_catalog_menu_has_only_close() -> Result<(), DeliveryError> {
    let controller = controller_with(Catalog::default(), 3500);
    let transport = RecordingTransport::default();

    controller.dispatch(&transport, 1, NavEvent::Start).await?;

    let keyboard = transport.sent()[0].keyboard.clone().unwrap_or_else(|| panic!("menu keyboard"));
    assert_eq!(keyboard.inline_keyboard.len(), 1);
    assert_eq!(keyboard.inline_keyboard[0][0].text, DefaultGuideView::close_label());
    Ok(())
}

#[tokio::test]
async fn close_removes_ui_without_touching_state() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    controller
        .dispatch(&RecordingTransport::default(), 1, NavEvent::SelectSection("atlas".to_string()))
        .await?;

    let transport = RecordingTransport::default();
    controller
        .dispatch(&transport, 1, NavEvent::from_callback_data("close"))
        .await?;

    assert_eq!(transport.calls(), vec![Call::Ack(None), Call::RemoveUi]);
    assert_eq!(
        controller.store().snapshot(1).await,
        Some(NavigationState::Viewing("atlas".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn free_text_gets_help_prompt() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    let transport = RecordingTransport::default();

    controller
        .dispatch(&transport, 1, NavEvent::from_text("hello?"))
        .await?;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, DefaultGuideView::fallback_help());
    assert_eq!(sent[0].keyboard, Some(back_keyboard()));
    Ok(())
}

#[tokio::test]
async fn every_event_is_acknowledged_exactly_once() -> Result<(), DeliveryError> {
    let controller = atlas_controller();
    let events = [
        NavEvent::Start,
        NavEvent::SelectSection("atlas".to_string()),
        NavEvent::SelectSection("ghost".to_string()),
        NavEvent::Back,
        NavEvent::Close,
        NavEvent::Other("section:".to_string()),
    ];

    for event in events {
        let transport = RecordingTransport::default();
        controller.dispatch(&transport, 1, event.clone()).await?;
        assert_eq!(transport.acks().len(), 1, "event {event:?}");
        // The acknowledgement comes before anything else.
        assert!(matches!(transport.calls().first(), Some(Call::Ack(_))));
    }
    Ok(())
}

#[tokio::test]
async fn long_section_is_sent_in_order_with_button_on_last_chunk() -> Result<(), DeliveryError> {
    let body = (1..=30)
        .map(|i| format!("<p>Paragraph number {i} of the long guide.</p>"))
        .collect::<String>();
    let controller = controller_with(Catalog::from_sections(vec![section("long", "Long", &body)]), 200);
    let transport = RecordingTransport::default();

    controller
        .dispatch(&transport, 1, NavEvent::SelectSection("long".to_string()))
        .await?;

    let sent = transport.sent();
    assert!(sent.len() > 1);
    assert!(sent.iter().all(|c| c.text.chars().count() <= 200));
    assert!(sent[..sent.len() - 1].iter().all(|c| c.keyboard.is_none()));
    assert_eq!(sent[sent.len() - 1].keyboard, Some(back_keyboard()));
    assert!(sent[0].text.starts_with("Paragraph number 1 "));
    assert!(sent[sent.len() - 1].text.ends_with("Paragraph number 30 of the long guide."));
    Ok(())
}

#[tokio::test]
async fn failed_send_stops_sequence_and_keeps_new_state() {
    let body = (1..=30)
        .map(|i| format!("<p>Paragraph number {i} of the long guide.</p>"))
        .collect::<String>();
    let controller = controller_with(Catalog::from_sections(vec![section("long", "Long", &body)]), 200);
    let transport = RecordingTransport::failing_after(1);

    let result = controller
        .dispatch(&transport, 1, NavEvent::SelectSection("long".to_string()))
        .await;

    assert!(matches!(result, Err(DeliveryError::Aborted { sent: 1, .. })));
    assert_eq!(transport.sent().len(), 1);
    // A failed attempt is the only one after the first success.
    assert_eq!(transport.sends.load(Ordering::SeqCst), 2);
    assert_eq!(
        controller.store().snapshot(1).await,
        Some(NavigationState::Viewing("long".to_string()))
    );
}

#[tokio::test]
async fn conversations_do_not_share_state() -> Result<(), DeliveryError> {
    let controller = atlas_controller();

    controller
        .dispatch(&RecordingTransport::default(), 1, NavEvent::SelectSection("atlas".to_string()))
        .await?;
    controller
        .dispatch(&RecordingTransport::default(), 2, NavEvent::Start)
        .await?;

    assert_eq!(
        controller.store().snapshot(1).await,
        Some(NavigationState::Viewing("atlas".to_string()))
    );
    assert_eq!(controller.store().snapshot(2).await, Some(NavigationState::Menu));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_events_of_one_conversation_do_not_interleave() -> Result<(), DeliveryError> {
    let body = (1..=20)
        .map(|i| format!("<p>Line {i} of the section body.</p>"))
        .collect::<String>();
    let controller = Arc::new(NavigationController::new(
        Arc::new(Catalog::from_sections(vec![section("long", "Long", &body)])),
        ContentRenderer::new(60),
        ConversationStore::new(60, 1_000),
        Duration::from_millis(1),
    ));
    let transport = Arc::new(RecordingTransport::default());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let controller = controller.clone();
        let transport = transport.clone();
        handles.push(tokio::spawn(async move {
            controller
                .dispatch(transport.as_ref(), 7, NavEvent::SelectSection("long".to_string()))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap_or_else(|e| panic!("task panicked: {e}"))?;
    }

    // Acks may arrive at any time; the sends must be complete, unmixed sequences.
    assert_eq!(transport.acks(), vec![None; 4]);
    let sent: Vec<String> = transport.sent().into_iter().map(|c| c.text).collect();
    let per_event = sent.len() / 4;
    let expected = &sent[..per_event];
    assert!(per_event > 1);
    for block in sent.chunks(per_event) {
        assert_eq!(block, expected);
    }
    Ok(())
}

#[tokio::test]
async fn press_is_acknowledged_while_earlier_reply_is_in_flight() -> Result<(), DeliveryError> {
    let controller = Arc::new(atlas_controller());
    let transport = Arc::new(RecordingTransport::default());

    // Stand-in for a slow delivery still holding the conversation.
    let session = controller.store().session(1);
    let held = session.lock().await;

    let task = {
        let controller = controller.clone();
        let transport = transport.clone();
        tokio::spawn(async move {
            controller
                .dispatch(transport.as_ref(), 1, NavEvent::SelectSection("atlas".to_string()))
                .await
        })
    };

    let acked = tokio::time::timeout(Duration::from_secs(5), async {
        while transport.acks().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(acked.is_ok(), "acknowledgement waited for the conversation lock");
    assert!(transport.sent().is_empty());

    drop(held);
    task.await.unwrap_or_else(|e| panic!("task panicked: {e}"))?;
    assert_eq!(transport.sent().len(), 1);
    Ok(())
}
