use super::*;
use crate::directory::{Partner, PartnerRole, StaticDirectory};
use crate::notify::InMemorySink;
use serde_json::json;

fn setup() -> (RequestStore, Arc<InMemorySink>) {
    let directory = Arc::new(StaticDirectory::from_partners([
        Partner::new("admin-1", "Operations Admin", PartnerRole::Admin),
        Partner::new("service-manager-1", "Service Manager", PartnerRole::Manager),
        Partner::new("el-mottaheda-group", "El Mottaheda Group", PartnerRole::Partner),
    ]));
    let sink = Arc::new(InMemorySink::new());
    let store = RequestStore::new(directory, sink.clone());
    (store, sink)
}

fn finishing_lead() -> NewLead {
    NewLead {
        partner_id: "el-mottaheda-group".to_string(),
        service_type: "finishing".to_string(),
        service_title: "Apartment finishing".to_string(),
        customer_name: "Hana".to_string(),
        customer_phone: "01111111111".to_string(),
        ..NewLead::default()
    }
}

fn contact_request(id: &str) -> Request {
    Request::new(
        id.to_string(),
        RequestType::ContactMessage,
        RequesterInfo::new("Omar", "01222222222"),
        json!({"message": "Call me", "topic": "general"}),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_add_lead_sets_defaults_and_notifies_partner() {
    let (store, sink) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    assert!(lead.id.starts_with("lead-"));
    assert_eq!(lead.status, LeadStatus::New);
    assert!(lead.messages.is_empty());

    let inbox = sink.list_for_user("el-mottaheda-group");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link, "/dashboard/leads");
    assert!(inbox[0].message.en.contains("Hana"));
}

#[tokio::test]
async fn test_add_lead_with_manager_notifies_manager() {
    let (store, sink) = setup();
    let mut input = finishing_lead();
    input.manager_id = Some("service-manager-1".to_string());
    let lead = store.add_lead(input).await;

    assert!(sink.list_for_user("el-mottaheda-group").is_empty());
    let inbox = sink.list_for_user("service-manager-1");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link, format!("/admin/leads/{}", lead.id));
}

#[tokio::test]
async fn test_update_lead_merges_and_bumps_updated_at() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let updated = store
        .update_lead(&lead.id, LeadUpdate::status(LeadStatus::SiteVisit))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, LeadStatus::SiteVisit);
    assert_eq!(updated.customer_name, "Hana");
    assert!(updated.updated_at > lead.updated_at);
}

#[tokio::test]
async fn test_update_lead_not_found() {
    let (store, _) = setup();
    assert!(store
        .update_lead("lead-missing", LeadUpdate::status(LeadStatus::Quoted))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_updated_at_strictly_increases() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;
    let mut last = lead.updated_at;
    for _ in 0..50 {
        let updated = store
            .update_lead(&lead.id, LeadUpdate::default())
            .await
            .unwrap()
            .unwrap();
        assert!(updated.updated_at > last);
        last = updated.updated_at;
    }
}

#[tokio::test]
async fn test_add_message_not_found() {
    let (store, _) = setup();
    let result =
        store.add_message_to_lead("lead-missing", NewLeadMessage::new(MessageSender::Admin, "hi"));
    assert!(result.is_none());
}

#[tokio::test]
async fn test_client_message_keeps_new_status() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;
    let after = store
        .add_message_to_lead(&lead.id, NewLeadMessage::new(MessageSender::Client, "hello?"))
        .unwrap();
    assert_eq!(after.status, LeadStatus::New);
    assert_eq!(after.messages.len(), 1);
}

#[tokio::test]
async fn test_partner_message_marks_contacted() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;
    let after = store
        .add_message_to_lead(
            &lead.id,
            NewLeadMessage::new(MessageSender::Partner, "We will call you"),
        )
        .unwrap();
    assert_eq!(after.status, LeadStatus::Contacted);
}

#[tokio::test]
async fn test_conversation_client_admin_admin() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let after_client = store
        .add_message_to_lead(&lead.id, NewLeadMessage::new(MessageSender::Client, "Is it available?"))
        .unwrap();
    assert_eq!(after_client.status, LeadStatus::New);

    let after_admin = store
        .add_message_to_lead(&lead.id, NewLeadMessage::new(MessageSender::Admin, "Yes"))
        .unwrap();
    assert_eq!(after_admin.status, LeadStatus::Contacted);

    let mut note = NewLeadMessage::new(MessageSender::Admin, "Follow up Sunday");
    note.kind = MessageKind::Note;
    note.sender_id = Some("admin-1".to_string());
    let last = store.add_message_to_lead(&lead.id, note).unwrap();

    assert_eq!(last.status, LeadStatus::Contacted);
    assert_eq!(last.messages.len(), 3);
    assert_eq!(last.messages[2].kind, MessageKind::Note);
    assert_eq!(last.messages[2].sender_id.as_deref(), Some("admin-1"));
}

#[tokio::test]
async fn test_thread_is_append_only_and_ordered() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let mut snapshots: Vec<LeadMessage> = Vec::new();
    for i in 0..10 {
        let sender = if i % 2 == 0 {
            MessageSender::Client
        } else {
            MessageSender::Partner
        };
        let after = store
            .add_message_to_lead(&lead.id, NewLeadMessage::new(sender, format!("m{}", i)))
            .unwrap();
        assert_eq!(after.messages.len(), snapshots.len() + 1);
        assert_eq!(&after.messages[..snapshots.len()], &snapshots[..]);
        snapshots = after.messages;
    }

    for pair in snapshots.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_insert_request_rejects_id_collision_with_lead() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;
    let clash = contact_request(&lead.id);
    assert_eq!(
        store.insert_request(clash),
        Err(StoreError::DuplicateId(lead.id.clone()))
    );
    assert_eq!(store.request_count(), 0);
}

#[tokio::test]
async fn test_insert_request_rejects_duplicate() {
    let (store, _) = setup();
    store.insert_request(contact_request("req-1")).unwrap();
    assert!(store.insert_request(contact_request("req-1")).is_err());
}

#[tokio::test]
async fn test_get_all_requests_unifies_and_sorts() {
    let (store, _) = setup();
    let mut older = contact_request("req-old");
    older.created_at = Utc::now() - Duration::hours(2);
    older.assigned_to = Some("admin-1".to_string());
    store.insert_request(older).unwrap();

    let lead = store.add_lead(finishing_lead()).await;

    let mut newest = contact_request("req-new");
    newest.created_at = Utc::now() + Duration::hours(1);
    store.insert_request(newest).unwrap();

    let all = store.get_all_requests().await;
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["req-new", lead.id.as_str(), "req-old"]);

    let projected = &all[1];
    assert_eq!(projected.request_type, RequestType::Lead);
    assert_eq!(projected.status, RequestStatus::New);
    assert_eq!(projected.assigned_to.as_deref(), Some("el-mottaheda-group"));
    assert_eq!(projected.assigned_to_name.as_deref(), Some("El Mottaheda Group"));

    assert_eq!(all[2].assigned_to_name.as_deref(), Some("Operations Admin"));
    assert!(all[0].assigned_to_name.is_none());
}

#[tokio::test]
async fn test_projection_uses_assigned_then_manager_then_partner() {
    let (store, _) = setup();
    let mut input = finishing_lead();
    input.manager_id = Some("service-manager-1".to_string());
    let lead = store.add_lead(input).await;

    let req = store.get_request_by_id(&lead.id).await.unwrap();
    assert_eq!(req.assigned_to.as_deref(), Some("service-manager-1"));

    store
        .update_lead(
            &lead.id,
            LeadUpdate {
                assigned_to: Some("admin-1".to_string()),
                ..LeadUpdate::default()
            },
        )
        .await
        .unwrap();
    let req = store.get_request_by_id(&lead.id).await.unwrap();
    assert_eq!(req.assigned_to.as_deref(), Some("admin-1"));
}

#[tokio::test]
async fn test_unknown_assignee_name_falls_back_to_id() {
    let (store, _) = setup();
    let mut req = contact_request("req-1");
    req.assigned_to = Some("customer-relations-manager-1".to_string());
    store.insert_request(req).unwrap();

    let fetched = store.get_request_by_id("req-1").await.unwrap();
    assert_eq!(
        fetched.assigned_to_name.as_deref(),
        Some("customer-relations-manager-1")
    );
}

#[tokio::test]
async fn test_get_request_by_id_not_found() {
    let (store, _) = setup();
    assert!(store.get_request_by_id("req-nope").await.is_none());
}

#[tokio::test]
async fn test_update_plain_request_merges() {
    let (store, _) = setup();
    store.insert_request(contact_request("req-1")).unwrap();
    let before = store.get_request_by_id("req-1").await.unwrap();

    let updated = store
        .update_request(
            "req-1",
            RequestUpdate {
                status: Some(RequestStatus::Reviewed),
                payload: Some(json!({"topic": "pricing", "priority": "high"})),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, RequestStatus::Reviewed);
    assert_eq!(updated.payload["message"], "Call me");
    assert_eq!(updated.payload["topic"], "pricing");
    assert_eq!(updated.payload["priority"], "high");
    assert!(updated.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_update_request_reassignment_notifies() {
    let (store, sink) = setup();
    store.insert_request(contact_request("req-1")).unwrap();

    let updated = store
        .update_request(
            "req-1",
            RequestUpdate {
                assigned_to: Some("el-mottaheda-group".to_string()),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.assigned_to_name.as_deref(), Some("El Mottaheda Group"));

    let inbox = sink.list_for_user("el-mottaheda-group");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link, "/dashboard/leads");

    // Same assignee again does not re-notify
    store
        .update_request(
            "req-1",
            RequestUpdate {
                assigned_to: Some("el-mottaheda-group".to_string()),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sink.list_for_user("el-mottaheda-group").len(), 1);
}

#[tokio::test]
async fn test_update_request_not_found() {
    let (store, _) = setup();
    let result = store
        .update_request("req-nope", RequestUpdate::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_update_lead_backed_request_maps_status() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let updated = store
        .update_request(
            &lead.id,
            RequestUpdate {
                status: Some(RequestStatus::Closed),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Closed);
    assert_eq!(store.get_lead(&lead.id).unwrap().status, LeadStatus::Completed);

    store
        .update_request(
            &lead.id,
            RequestUpdate {
                status: Some(RequestStatus::Rejected),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.get_lead(&lead.id).unwrap().status, LeadStatus::Cancelled);
}

#[tokio::test]
async fn test_update_lead_backed_in_progress_requires_lead_status() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let ambiguous = store
        .update_request(
            &lead.id,
            RequestUpdate {
                status: Some(RequestStatus::InProgress),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert_eq!(
        ambiguous,
        Err(StoreError::StatusMapping(StatusMappingError::Ambiguous(
            RequestStatus::InProgress
        )))
    );
    assert_eq!(store.get_lead(&lead.id).unwrap().status, LeadStatus::New);

    let precise = store
        .update_request(
            &lead.id,
            RequestUpdate {
                status: Some(RequestStatus::InProgress),
                lead_status: Some(LeadStatus::Quoted),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(precise.status, RequestStatus::InProgress);
    assert_eq!(store.get_lead(&lead.id).unwrap().status, LeadStatus::Quoted);
}

#[tokio::test]
async fn test_update_lead_backed_unmappable_status() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;
    let result = store
        .update_request(
            &lead.id,
            RequestUpdate {
                status: Some(RequestStatus::Approved),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(StoreError::StatusMapping(StatusMappingError::Unmappable(_)))
    ));
}

#[tokio::test]
async fn test_update_lead_backed_reassign() {
    let (store, sink) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let updated = store
        .update_request(
            &lead.id,
            RequestUpdate {
                assigned_to: Some("admin-1".to_string()),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.assigned_to.as_deref(), Some("admin-1"));
    assert_eq!(
        store.get_lead(&lead.id).unwrap().assigned_to.as_deref(),
        Some("admin-1")
    );
    let inbox = sink.list_for_user("admin-1");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link, format!("/admin/requests/{}", lead.id));
}

#[tokio::test]
async fn test_update_request_rejects_blank_assignee() {
    let (store, sink) = setup();
    let mut req = contact_request("req-p1");
    req.assigned_to = Some("admin-1".to_string());
    store.insert_request(req).unwrap();

    for blank in ["", "   "] {
        let result = store
            .update_request(
                "req-p1",
                RequestUpdate {
                    assigned_to: Some(blank.to_string()),
                    ..RequestUpdate::default()
                },
            )
            .await;
        assert_eq!(
            result,
            Err(StoreError::invalid_assignee("assignedTo", blank))
        );
    }

    let stored = store.get_request_by_id("req-p1").await.unwrap();
    assert_eq!(stored.assigned_to.as_deref(), Some("admin-1"));
    assert!(sink.list_for_user("").is_empty());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_update_request_rejects_unknown_assignee() {
    let (store, sink) = setup();
    store.insert_request(contact_request("req-p1")).unwrap();
    let lead = store.add_lead(finishing_lead()).await;

    let plain = store
        .update_request(
            "req-p1",
            RequestUpdate {
                assigned_to: Some("ghost-99".to_string()),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert!(matches!(plain, Err(StoreError::InvalidAssignee { .. })));

    let lead_backed = store
        .update_request(
            &lead.id,
            RequestUpdate {
                assigned_to: Some("  ".to_string()),
                status: Some(RequestStatus::Closed),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert!(matches!(lead_backed, Err(StoreError::InvalidAssignee { .. })));

    let unchanged = store.get_lead(&lead.id).unwrap();
    assert!(unchanged.assigned_to.is_none());
    assert_eq!(unchanged.status, LeadStatus::New);
    assert_eq!(unchanged.updated_at, lead.updated_at);
    assert!(sink.list_for_user("ghost-99").is_empty());
}

#[tokio::test]
async fn test_update_lead_rejects_unknown_manager() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let result = store
        .update_lead(
            &lead.id,
            LeadUpdate {
                manager_id: Some("ghost-99".to_string()),
                ..LeadUpdate::default()
            },
        )
        .await;
    assert_eq!(
        result,
        Err(StoreError::invalid_assignee("managerId", "ghost-99"))
    );
    assert!(store.get_lead(&lead.id).unwrap().manager_id.is_none());
}

#[tokio::test]
async fn test_reassignment_accepted_when_directory_down() {
    struct DownDirectory;

    #[async_trait::async_trait]
    impl crate::directory::PartnerDirectory for DownDirectory {
        async fn resolve_by_id(
            &self,
            _id: &str,
        ) -> Result<Option<Partner>, crate::directory::DirectoryError> {
            Err(crate::directory::DirectoryError::Unavailable(
                "timeout".to_string(),
            ))
        }
    }

    let sink = Arc::new(InMemorySink::new());
    let store = RequestStore::new(Arc::new(DownDirectory), sink.clone());
    store.insert_request(contact_request("req-p1")).unwrap();

    let updated = store
        .update_request(
            "req-p1",
            RequestUpdate {
                assigned_to: Some("listings-manager-1".to_string()),
                ..RequestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.assigned_to.as_deref(), Some("listings-manager-1"));
    assert_eq!(
        updated.assigned_to_name.as_deref(),
        Some("listings-manager-1")
    );
    let inbox = sink.list_for_user("listings-manager-1");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link, "/admin/requests/req-p1");

    // Blank ids never reach the directory
    let blank = store
        .update_request(
            "req-p1",
            RequestUpdate {
                assigned_to: Some(" ".to_string()),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert!(matches!(blank, Err(StoreError::InvalidAssignee { .. })));
}

#[tokio::test]
async fn test_update_lead_backed_rejects_payload() {
    let (store, _) = setup();
    let lead = store.add_lead(finishing_lead()).await;

    let result = store
        .update_request(
            &lead.id,
            RequestUpdate {
                payload: Some(json!({"customerNotes": "x"})),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert_eq!(result, Err(StoreError::not_applicable("payload", "lead")));

    let unchanged = store.get_lead(&lead.id).unwrap();
    assert_eq!(unchanged.customer_notes, "");
    assert_eq!(unchanged.updated_at, lead.updated_at);
}

#[tokio::test]
async fn test_update_plain_request_rejects_lead_status() {
    let (store, _) = setup();
    store.insert_request(contact_request("req-1")).unwrap();
    let before = store.get_request_by_id("req-1").await.unwrap();

    let result = store
        .update_request(
            "req-1",
            RequestUpdate {
                status: Some(RequestStatus::Reviewed),
                lead_status: Some(LeadStatus::Quoted),
                ..RequestUpdate::default()
            },
        )
        .await;
    assert_eq!(
        result,
        Err(StoreError::not_applicable("leadStatus", "non-lead"))
    );

    let after = store.get_request_by_id("req-1").await.unwrap();
    assert_eq!(after.status, RequestStatus::New);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn test_update_lead_owner_change_notifies() {
    let (store, sink) = setup();
    let lead = store.add_lead(finishing_lead()).await;
    assert_eq!(sink.list_for_user("el-mottaheda-group").len(), 1);

    // Manager takes over from the partner
    store
        .update_lead(
            &lead.id,
            LeadUpdate {
                manager_id: Some("service-manager-1".to_string()),
                ..LeadUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    let inbox = sink.list_for_user("service-manager-1");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link, format!("/admin/requests/{}", lead.id));

    store
        .update_lead(
            &lead.id,
            LeadUpdate {
                assigned_to: Some("admin-1".to_string()),
                ..LeadUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sink.list_for_user("admin-1").len(), 1);

    // Status-only and same-owner updates stay quiet
    store
        .update_lead(&lead.id, LeadUpdate::status(LeadStatus::Quoted))
        .await
        .unwrap();
    store
        .update_lead(
            &lead.id,
            LeadUpdate {
                assigned_to: Some("admin-1".to_string()),
                ..LeadUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sink.list_for_user("admin-1").len(), 1);
    assert_eq!(sink.len(), 3);
}

#[tokio::test]
async fn test_leads_for_partner_and_manager() {
    let (store, _) = setup();
    let a = store.add_lead(finishing_lead()).await;
    let mut managed = finishing_lead();
    managed.partner_id = "other-partner".to_string();
    managed.manager_id = Some("service-manager-1".to_string());
    let b = store.add_lead(managed).await;

    let partner_leads = store.leads_for_partner("el-mottaheda-group");
    assert_eq!(partner_leads.len(), 1);
    assert_eq!(partner_leads[0].id, a.id);

    let manager_leads = store.leads_for_manager("service-manager-1");
    assert_eq!(manager_leads.len(), 1);
    assert_eq!(manager_leads[0].id, b.id);

    assert_eq!(store.all_leads().len(), 2);
}

#[test]
fn test_next_timestamp_is_strictly_later() {
    let future = Utc::now() + Duration::hours(1);
    assert!(next_timestamp(future) > future);
    let past = Utc::now() - Duration::hours(1);
    assert!(next_timestamp(past) > past);
}

#[test]
fn test_merge_payload_non_object_replaces() {
    let mut payload = json!({"a": 1});
    merge_payload(&mut payload, json!("text"));
    assert_eq!(payload, json!("text"));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sender() -> impl Strategy<Value = MessageSender> {
        prop_oneof![
            Just(MessageSender::Client),
            Just(MessageSender::Partner),
            Just(MessageSender::Admin),
            Just(MessageSender::System),
        ]
    }

    proptest! {
        /// N appends grow the thread by exactly N and never rewrite history.
        #[test]
        fn prop_thread_append_only(messages in prop::collection::vec((sender(), "[a-z ]{0,16}"), 1..20)) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let (store, _) = setup();
            let lead = rt.block_on(store.add_lead(finishing_lead()));

            let mut history: Vec<LeadMessage> = Vec::new();
            for (sender, content) in &messages {
                let after = store
                    .add_message_to_lead(&lead.id, NewLeadMessage::new(*sender, content.clone()))
                    .unwrap();
                prop_assert_eq!(after.messages.len(), history.len() + 1);
                prop_assert_eq!(&after.messages[..history.len()], &history[..]);
                history = after.messages;
            }
            prop_assert_eq!(history.len(), messages.len());

            let expect_contacted = messages.iter().any(|(s, _)| s.is_team());
            let status = store.get_lead(&lead.id).unwrap().status;
            prop_assert_eq!(status == LeadStatus::Contacted, expect_contacted);
        }
    }
}
