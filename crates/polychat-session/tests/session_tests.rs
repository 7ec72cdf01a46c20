// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end turns over a mock registry and in-memory store.

use std::sync::Arc;

use polychat_core::media::FileUpload;
use polychat_core::{MediaKind, ProviderAdapter, ProviderKind, Role, User};
use polychat_registry::ProviderRegistry;
use polychat_session::ChatSession;
use polychat_test_utils::{MemoryStore, MockAdapter, ScriptedSend};

fn registry_with_google(google: MockAdapter) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::with_providers([
        Arc::new(google) as Arc<dyn ProviderAdapter>,
        Arc::new(MockAdapter::new(ProviderKind::HuggingFace)),
        Arc::new(MockAdapter::new(ProviderKind::Nvidia)),
    ]))
}

fn test_user() -> User {
    User {
        name: Some("Ada".into()),
        email: Some("ada@example.com".into()),
    }
}

#[tokio::test]
async fn full_turn_persists_the_streamed_response() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title("Streaming Basics")
        .with_send(ScriptedSend::text(&["Hel", "lo ", "there"]));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let chat = session
        .send("gemini-2.0-flash", None, "hi", Vec::new(), &test_user())
        .await
        .unwrap();

    assert_eq!(chat.title, "Streaming Basics");
    assert_eq!(chat.model, "gemini-2.0-flash");
    assert_eq!(chat.chat_history.len(), 2);

    let user_msg = &chat.chat_history[0];
    assert_eq!(user_msg.role, Role::User);
    assert_eq!(user_msg.content, "hi");

    let model_msg = &chat.chat_history[1];
    assert_eq!(model_msg.role, Role::Model);
    assert_eq!(model_msg.content, "Hello there");
    assert!(!model_msg.is_streaming);
    assert!(model_msg.id > user_msg.id);

    // Persisted snapshot matches the returned one.
    let stored = session.chats("ada@example.com").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].chat_history[1].content, "Hello there");
}

#[tokio::test]
async fn existing_chat_appends_without_regenerating_title() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title("First Title")
        .with_send(ScriptedSend::text(&["one"]))
        .with_send(ScriptedSend::text(&["two"]));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let chat = session
        .send("gemini-2.0-flash", None, "first", Vec::new(), &test_user())
        .await
        .unwrap();
    let chat = session
        .send("gemini-2.0-flash", Some(chat), "second", Vec::new(), &test_user())
        .await
        .unwrap();

    assert_eq!(chat.title, "First Title");
    assert_eq!(chat.chat_history.len(), 4);
    assert_eq!(chat.chat_history[3].content, "two");

    // Upserted, not duplicated.
    let stored = session.chats("ada@example.com").await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn title_failure_falls_back_to_default() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title_error("quota exceeded")
        .with_send(ScriptedSend::text(&["ok"]));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let chat = session
        .send("gemini-2.0-flash", None, "hi", Vec::new(), &test_user())
        .await
        .unwrap();
    assert_eq!(chat.title, "New Chat");
}

#[tokio::test]
async fn channel_error_discards_partial_text_and_still_persists() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title("T")
        .with_send(ScriptedSend::failing(&["partial "], "invalid credentials"));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let chat = session
        .send("gemini-2.0-flash", None, "hi", Vec::new(), &test_user())
        .await
        .unwrap();

    let model_msg = chat.chat_history.last().unwrap();
    assert!(model_msg.content.starts_with("Error:"), "got: {}", model_msg.content);
    assert!(model_msg.content.contains("invalid credentials"));
    assert!(!model_msg.content.contains("partial"));
    assert!(!model_msg.is_streaming);

    // The failed turn is still persisted.
    assert_eq!(session.chats("ada@example.com").await.unwrap().len(), 1);
}

#[tokio::test]
async fn generated_image_becomes_a_media_item() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title("T")
        .with_send(ScriptedSend::with_image(&["Here you go."], "cGl4ZWxz"));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let chat = session
        .send(
            "gemini-2.0-flash-preview-image-generation",
            None,
            "draw a cat",
            Vec::new(),
            &test_user(),
        )
        .await
        .unwrap();

    let model_msg = chat.chat_history.last().unwrap();
    assert_eq!(model_msg.content, "Here you go.");
    assert_eq!(chat.media_items.len(), 1);

    let item = &chat.media_items[0];
    assert_eq!(item.message_id, model_msg.id);
    assert_eq!(item.file_type, "image/png");
    assert_eq!(item.media_type, MediaKind::Image);
    assert_eq!(item.file_data, "cGl4ZWxz");
    assert_eq!(model_msg.media_ids, vec![item.id]);
}

#[tokio::test]
async fn uploads_are_correlated_to_the_user_message() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title("T")
        .with_send(ScriptedSend::text(&["noted"]));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let uploads = vec![FileUpload {
        file_name: "photo.jpg".into(),
        file_data: "aW1n".into(),
        file_type: "image/jpeg".into(),
    }];
    let chat = session
        .send("gemini-2.0-flash", None, "look at this", uploads, &test_user())
        .await
        .unwrap();

    let user_msg = &chat.chat_history[0];
    assert_eq!(chat.media_items.len(), 1);
    assert_eq!(chat.media_items[0].message_id, user_msg.id);
    assert_eq!(user_msg.media_ids, vec![chat.media_items[0].id]);
}

#[tokio::test]
async fn set_model_persists_the_switch() {
    let google = MockAdapter::new(ProviderKind::Google)
        .with_title("T")
        .with_send(ScriptedSend::text(&["hi"]));
    let session = ChatSession::new(registry_with_google(google), MemoryStore::new());

    let chat = session
        .send("gemini-2.0-flash", None, "hi", Vec::new(), &test_user())
        .await
        .unwrap();
    let chat = session
        .set_model(chat, "meta/llama-3.1-8b-instruct", &test_user())
        .await
        .unwrap();

    assert_eq!(chat.model, "meta/llama-3.1-8b-instruct");
    let stored = session.chats("ada@example.com").await.unwrap();
    assert_eq!(stored[0].model, "meta/llama-3.1-8b-instruct");
}

#[tokio::test]
async fn routed_provider_handles_the_send() {
    // A meta/ model id must reach the Nvidia mock, not Google.
    let nvidia = MockAdapter::new(ProviderKind::Nvidia)
        .with_title("Nvidia Chat")
        .with_send(ScriptedSend::text(&["from nvidia"]));
    let registry = Arc::new(ProviderRegistry::with_providers([
        Arc::new(MockAdapter::new(ProviderKind::Google)) as Arc<dyn ProviderAdapter>,
        Arc::new(MockAdapter::new(ProviderKind::HuggingFace)),
        Arc::new(nvidia),
    ]));
    let session = ChatSession::new(registry, MemoryStore::new());

    let chat = session
        .send("meta/llama-3.1-8b-instruct", None, "hi", Vec::new(), &test_user())
        .await
        .unwrap();
    assert_eq!(chat.title, "Nvidia Chat");
    assert_eq!(chat.chat_history[1].content, "from nvidia");
}
