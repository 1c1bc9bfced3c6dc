//! Integration tests per gli endpoints di conversazioni e messaggi

mod common;

#[cfg(test)]
mod chat_tests {
    use super::common::{
        bearer, create_test_jwt, create_test_server, durable_state, ephemeral_state, seed_member,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use axum_test::http::HeaderName;
    use serde_json::{Value, json};
    use server::entities::MemberRole;

    const GUEST: &str = "x-guest-id";
    const AUTH: &str = "authorization";

    async fn open_conversation(server: &TestServer, guest: &str, subject: &str) -> String {
        let response = server
            .post("/chat")
            .add_header(HeaderName::from_static(GUEST), guest)
            .json(&json!({ "subject": subject }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["conversation"]["id"]
            .as_str()
            .expect("conversation id")
            .to_string()
    }

    fn staff_token() -> String {
        create_test_jwt("staff-1", "Front Desk", MemberRole::Admin)
    }

    // ============================================================
    // Identità
    // ============================================================

    #[tokio::test]
    async fn test_chat_without_identity_is_unauthorized() {
        let server = create_test_server(ephemeral_state());

        server.get("/chat").await.assert_status_unauthorized();
        server
            .get("/chat/messages")
            .add_query_param("conversationId", "whatever")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_invalid_bearer_does_not_fall_back_to_guest() {
        let server = create_test_server(ephemeral_state());

        let response = server
            .get("/chat")
            .add_header(HeaderName::from_static(AUTH), "Bearer invalid_token_here")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_blank_guest_token_is_unauthorized() {
        let server = create_test_server(ephemeral_state());

        let response = server
            .get("/chat")
            .add_header(HeaderName::from_static(GUEST), "   ")
            .await;

        response.assert_status_unauthorized();
    }

    // ============================================================
    // POST /chat
    // ============================================================

    #[tokio::test]
    async fn test_create_conversation_as_guest() {
        let server = create_test_server(ephemeral_state());

        let response = server
            .post("/chat")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "subject": "  Birthday cake  " }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let conversation = &body["conversation"];
        assert_eq!(conversation["ownerId"], "guest-abc");
        assert_eq!(conversation["subject"], "Birthday cake");
        assert_eq!(conversation["status"], "open");
        assert!(conversation.get("createdAt").is_some());
        assert_eq!(conversation["createdAt"], conversation["updatedAt"]);
    }

    #[tokio::test]
    async fn test_create_conversation_uses_default_subject() {
        let server = create_test_server(ephemeral_state());

        let without_body = server
            .post("/chat")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .await;
        without_body.assert_status(StatusCode::CREATED);
        let body: Value = without_body.json();
        assert_eq!(body["conversation"]["subject"], "New Conversation");

        let blank = server
            .post("/chat")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "subject": "   " }))
            .await;
        blank.assert_status(StatusCode::CREATED);
        let body: Value = blank.json();
        assert_eq!(body["conversation"]["subject"], "New Conversation");
    }

    // ============================================================
    // GET /chat
    // ============================================================

    #[tokio::test]
    async fn test_list_is_scoped_to_owner_and_staff_sees_all() {
        let state = ephemeral_state();
        let member = seed_member(&state, "Marta", "marta@example.com", MemberRole::Enterprise).await;
        let server = create_test_server(state);
        let member_token = create_test_jwt(&member.id, &member.name, member.role);

        open_conversation(&server, "abc", "Cake").await;
        open_conversation(&server, "def", "Flowers").await;
        server
            .post("/chat")
            .add_header(HeaderName::from_static(AUTH), bearer(&member_token))
            .json(&json!({ "subject": "Catering" }))
            .await
            .assert_status(StatusCode::CREATED);

        let guest_view: Value = server
            .get("/chat")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .await
            .json();
        let guest_list = guest_view["conversations"].as_array().unwrap();
        assert_eq!(guest_list.len(), 1);
        assert_eq!(guest_list[0]["subject"], "Cake");
        assert_eq!(guest_list[0]["ownerName"], "");

        let staff_view: Value = server
            .get("/chat")
            .add_header(HeaderName::from_static(AUTH), bearer(&staff_token()))
            .await
            .json();
        let staff_list = staff_view["conversations"].as_array().unwrap();
        assert_eq!(staff_list.len(), 3);

        let catering = staff_list
            .iter()
            .find(|c| c["subject"] == "Catering")
            .expect("member conversation");
        assert_eq!(catering["ownerName"], "Marta");
        assert_eq!(catering["ownerEmail"], "marta@example.com");
    }

    #[tokio::test]
    async fn test_list_carries_last_message_preview() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;

        server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": "Chocolate please" }))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = server
            .get("/chat")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .await
            .json();
        let summary = &body["conversations"][0];
        assert_eq!(summary["lastMessage"], "Chocolate please");
        assert_eq!(summary["lastMessageRole"], "user");
        assert!(summary["lastMessageAt"].is_string());
    }

    // ============================================================
    // GET /chat/messages
    // ============================================================

    #[tokio::test]
    async fn test_list_messages_requires_conversation_id() {
        let server = create_test_server(ephemeral_state());

        server
            .get("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_list_messages_unknown_conversation_is_not_found() {
        let server = create_test_server(ephemeral_state());

        server
            .get("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .add_query_param("conversationId", "does-not-exist")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_other_guest_is_forbidden() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;

        let read = server
            .get("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "xyz")
            .add_query_param("conversationId", &id)
            .await;
        read.assert_status_forbidden();
        let body: Value = read.json();
        assert_eq!(body["error"], "Forbidden");
        assert!(body.get("details").is_none());

        server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "xyz")
            .json(&json!({ "conversationId": id, "content": "let me in" }))
            .await
            .assert_status_forbidden();
    }

    // ============================================================
    // POST /chat/messages
    // ============================================================

    #[tokio::test]
    async fn test_send_rejects_blank_content_and_persists_nothing() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;

        for content in [json!(""), json!("   "), Value::Null] {
            server
                .post("/chat/messages")
                .add_header(HeaderName::from_static(GUEST), "abc")
                .json(&json!({ "conversationId": id, "content": content }))
                .await
                .assert_status_bad_request();
        }

        let body: Value = server
            .get("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .add_query_param("conversationId", &id)
            .await
            .json();
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_oversized_content_is_rejected_before_lookup() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;
        let oversized = "a".repeat(5001);

        // conversazione inesistente: 400, non 404
        server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": "does-not-exist", "content": oversized }))
            .await
            .assert_status_bad_request();

        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&staff_token()))
            .json(&json!({ "conversationId": id, "status": "closed" }))
            .await
            .assert_status_ok();

        // conversazione chiusa: 400, non 409
        server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": oversized }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_send_limit_applies_to_trimmed_content() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;
        let padded = format!("  {}  ", "a".repeat(5000));

        let response = server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": padded }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"]["content"].as_str().unwrap().len(), 5000);
    }

    #[tokio::test]
    async fn test_send_malformed_body_is_bad_request() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;

        let response = server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": 42 }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_staff_reply_is_tagged_admin() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;

        let response = server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&staff_token()))
            .json(&json!({ "conversationId": id, "content": "Happy to help!" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"]["senderRole"], "admin");
        assert_eq!(body["message"]["senderId"], "staff-1");
        assert_eq!(body["message"]["conversationId"], id.as_str());
    }

    // ============================================================
    // PATCH /chat/messages
    // ============================================================

    #[tokio::test]
    async fn test_status_change_is_staff_only() {
        let state = ephemeral_state();
        let member = seed_member(&state, "Marta", "marta@example.com", MemberRole::Private).await;
        let server = create_test_server(state);
        let id = open_conversation(&server, "abc", "Cake").await;

        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "status": "closed" }))
            .await
            .assert_status_forbidden();

        // anche con payload invalido un non-staff riceve 403
        let member_token = create_test_jwt(&member.id, &member.name, member.role);
        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&member_token))
            .json(&json!({}))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_status_change_validates_payload() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;
        let token = staff_token();

        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&token))
            .json(&json!({ "conversationId": id, "status": "archived" }))
            .await
            .assert_status_bad_request();

        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&token))
            .json(&json!({ "status": "closed" }))
            .await
            .assert_status_bad_request();

        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&token))
            .json(&json!({ "conversationId": "nope", "status": "closed" }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_closed_conversation_rejects_sends_but_stays_readable() {
        let server = create_test_server(ephemeral_state());
        let id = open_conversation(&server, "abc", "Cake").await;

        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&staff_token()))
            .json(&json!({ "conversationId": id, "status": "closed" }))
            .await
            .assert_status_ok();

        for headers in [(GUEST, "abc".to_string()), (AUTH, bearer(&staff_token()))] {
            server
                .post("/chat/messages")
                .add_header(HeaderName::from_static(headers.0), headers.1)
                .json(&json!({ "conversationId": id, "content": "hello?" }))
                .await
                .assert_status(StatusCode::CONFLICT);
        }

        let body: Value = server
            .get("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .add_query_param("conversationId", &id)
            .await
            .json();
        assert_eq!(body["status"], "closed");

        // lo staff può riaprire
        server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&staff_token()))
            .json(&json!({ "conversationId": id, "status": "open" }))
            .await
            .assert_status_ok();
        server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": "back again" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    // ============================================================
    // Scenario completo, su entrambi i backend
    // ============================================================

    async fn birthday_cake_scenario(server: TestServer) {
        // 1. il guest apre la conversazione
        let id = open_conversation(&server, "abc", "Birthday cake").await;

        // 2. il guest scrive
        let sent = server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": "Can you deliver Saturday?" }))
            .await;
        sent.assert_status(StatusCode::CREATED);
        let sent: Value = sent.json();
        assert_eq!(sent["message"]["senderRole"], "user");

        // 3. lo staff sposta la conversazione su WhatsApp
        let patched = server
            .patch("/chat/messages")
            .add_header(HeaderName::from_static(AUTH), bearer(&staff_token()))
            .json(&json!({ "conversationId": id, "status": "whatsapp" }))
            .await;
        patched.assert_status_ok();
        let patched: Value = patched.json();
        assert_eq!(patched["conversation"]["status"], "whatsapp");

        // 4. ulteriori invii sono rifiutati
        server
            .post("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .json(&json!({ "conversationId": id, "content": "Still there?" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        // 5. la cronologia resta leggibile con un solo messaggio
        let history: Value = server
            .get("/chat/messages")
            .add_header(HeaderName::from_static(GUEST), "abc")
            .add_query_param("conversationId", &id)
            .await
            .json();
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "Can you deliver Saturday?");
        assert_eq!(history["status"], "whatsapp");
    }

    #[tokio::test]
    async fn test_birthday_cake_scenario_ephemeral() {
        birthday_cake_scenario(create_test_server(ephemeral_state())).await;
    }

    #[tokio::test]
    async fn test_birthday_cake_scenario_durable() {
        birthday_cake_scenario(create_test_server(durable_state().await)).await;
    }
}
