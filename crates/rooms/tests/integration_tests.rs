//! End-to-end tests for the room, message, and invitation services against a
//! real SQLite database.

use cadence_config::DatabaseConfig;
use cadence_database::{prepare_database, run_migrations, MessagingError, SqlitePool, User,
    UserRepository};
use cadence_rooms::{
    CreateInvitationRequest, CreateRoomRequest, FileInput, InvitationService, MessageService,
    NewMessageInput, RoomService,
};
use tempfile::TempDir;

struct TestEnv {
    pool: SqlitePool,
    _dir: TempDir,
}

impl TestEnv {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("rooms.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 4,
        };
        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self { pool, _dir: dir }
    }

    async fn user(&self, name: &str) -> User {
        UserRepository::new(self.pool.clone())
            .create(name, &format!("{name}@example.com"), None)
            .await
            .unwrap()
    }

    fn rooms(&self) -> RoomService {
        RoomService::new(self.pool.clone())
    }

    fn messages(&self) -> MessageService {
        MessageService::new(self.pool.clone())
    }

    fn invitations(&self) -> InvitationService {
        InvitationService::new(self.pool.clone())
    }
}

fn text(content: &str) -> NewMessageInput {
    NewMessageInput {
        content: content.to_string(),
        message_type: None,
        file: None,
    }
}

fn group(title: &str, member_ids: Vec<String>) -> CreateRoomRequest {
    CreateRoomRequest {
        title: title.to_string(),
        kind: Some("group".to_string()),
        member_ids,
    }
}

#[tokio::test]
async fn send_message_updates_projection_and_history() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![bob.public_id.clone()]))
        .await
        .unwrap();
    assert_eq!(room.members.len(), 2);

    let sent = env.messages().send(&room.id, &alice, text("hi")).await.unwrap();
    assert_eq!(sent.content, "hi");
    assert_eq!(sent.sender.as_ref().unwrap().name, "alice");
    assert_eq!(sent.chat_room_id, room.id);

    // The room's projection reflects the persisted message.
    let listed = env.rooms().list_rooms(&bob).await.unwrap();
    let general = listed.iter().find(|r| r.id == room.id).unwrap();
    let last = general.last_message.as_ref().unwrap();
    assert_eq!(last.content, "hi");
    assert_eq!(last.sender.as_ref().unwrap().name, "alice");

    // Round trip: the same message comes back through list with identical
    // content, type, and id.
    let history = env.messages().list(&room.id, &bob, 1, 50).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, sent.id);
    assert_eq!(history[0].content, "hi");
    assert_eq!(history[0].message_type, "text");
}

#[tokio::test]
async fn history_pages_are_chronological() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![]))
        .await
        .unwrap();

    for n in 1..=5 {
        env.messages()
            .send(&room.id, &alice, text(&format!("m{n}")))
            .await
            .unwrap();
    }

    // Page 1 holds the newest messages but reads oldest-to-newest.
    let page1 = env.messages().list(&room.id, &alice, 1, 2).await.unwrap();
    let contents: Vec<&str> = page1.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m4", "m5"]);

    let page2 = env.messages().list(&room.id, &alice, 2, 2).await.unwrap();
    let contents: Vec<&str> = page2.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m2", "m3"]);
}

#[tokio::test]
async fn send_message_validation_and_permissions() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let mallory = env.user("mallory").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![]))
        .await
        .unwrap();

    let err = env
        .messages()
        .send(&room.id, &alice, text("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::Validation { .. }));

    let err = env
        .messages()
        .send(&room.id, &mallory, text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::PermissionDenied { .. }));

    let err = env
        .messages()
        .send("no-such-room", &alice, text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::RoomNotFound { .. }));

    // Clients cannot forge system messages.
    let forged = NewMessageInput {
        content: "joined".to_string(),
        message_type: Some("system".to_string()),
        file: None,
    };
    let err = env.messages().send(&room.id, &alice, forged).await.unwrap_err();
    assert!(matches!(err, MessagingError::Validation { .. }));
}

#[tokio::test]
async fn file_message_requires_descriptor_and_marks_projection() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;

    let room = env
        .rooms()
        .create_room(&alice, group("files", vec![]))
        .await
        .unwrap();

    let bare = NewMessageInput {
        content: "plan.pdf".to_string(),
        message_type: Some("file".to_string()),
        file: None,
    };
    let err = env.messages().send(&room.id, &alice, bare).await.unwrap_err();
    assert!(matches!(err, MessagingError::Validation { .. }));

    let with_file = NewMessageInput {
        content: "plan.pdf".to_string(),
        message_type: Some("file".to_string()),
        file: Some(FileInput {
            id: "blob_1".to_string(),
            name: "plan.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 4096,
        }),
    };
    let sent = env.messages().send(&room.id, &alice, with_file).await.unwrap();
    assert_eq!(sent.message_type, "file");
    assert_eq!(sent.file.as_ref().unwrap().name, "plan.pdf");

    let rooms = env.rooms().list_rooms(&alice).await.unwrap();
    let last = rooms[0].last_message.as_ref().unwrap();
    assert_eq!(last.content, "\u{1F4CE} plan.pdf");
}

#[tokio::test]
async fn invitation_workflow_end_to_end() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;
    let carol = env.user("carol").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![bob.public_id.clone()]))
        .await
        .unwrap();

    let invitation = env
        .invitations()
        .create(
            &room.id,
            &alice,
            CreateInvitationRequest {
                invitee_id: carol.public_id.clone(),
                message: Some("join us".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(invitation.status, "pending");
    assert_eq!(invitation.inviter.name, "alice");

    // A second invite for the same (room, invitee) conflicts, also from
    // another member.
    let err = env
        .invitations()
        .create(
            &room.id,
            &bob,
            CreateInvitationRequest {
                invitee_id: carol.public_id.clone(),
                message: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::DuplicateInvitation));

    // Carol sees it in her received list.
    let received = env.invitations().list_received(&carol).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].room_title, "general");

    // Accepting adds carol, persists the join system message, and reports the
    // side effects exactly once.
    let outcome = env
        .invitations()
        .respond(&invitation.id, &carol, "accept")
        .await
        .unwrap();
    assert_eq!(outcome.invitation.status, "accepted");
    let joined = outcome.joined.expect("side effects on first accept");
    assert_eq!(joined.user.name, "carol");
    assert_eq!(joined.message.content, "carol joined the room");
    assert_eq!(joined.message.message_type, "system");
    assert!(joined.message.sender.is_none());

    let rooms = env.rooms().list_rooms(&carol).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].members.len(), 3);

    // The join message is in the durable history.
    let history = env.messages().list(&room.id, &carol, 1, 50).await.unwrap();
    assert_eq!(history.last().unwrap().content, "carol joined the room");

    // A second respond on the same invitation conflicts.
    let err = env
        .invitations()
        .respond(&invitation.id, &carol, "accept")
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::AlreadyResponded));
}

#[tokio::test]
async fn invitation_guards() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;
    let mallory = env.user("mallory").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![bob.public_id.clone()]))
        .await
        .unwrap();

    // Non-members cannot invite.
    let err = env
        .invitations()
        .create(
            &room.id,
            &mallory,
            CreateInvitationRequest {
                invitee_id: bob.public_id.clone(),
                message: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::PermissionDenied { .. }));

    // Existing members cannot be invited.
    let err = env
        .invitations()
        .create(
            &room.id,
            &alice,
            CreateInvitationRequest {
                invitee_id: bob.public_id.clone(),
                message: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::AlreadyMember));

    // Unknown invitees fail lookup.
    let err = env
        .invitations()
        .create(
            &room.id,
            &alice,
            CreateInvitationRequest {
                invitee_id: "ghost".to_string(),
                message: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::UserNotFound { .. }));

    // Unknown action is a validation error.
    let invitation = env
        .invitations()
        .create(
            &room.id,
            &alice,
            CreateInvitationRequest {
                invitee_id: mallory.public_id.clone(),
                message: None,
            },
        )
        .await
        .unwrap();
    let err = env
        .invitations()
        .respond(&invitation.id, &mallory, "maybe")
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::Validation { .. }));
}

#[tokio::test]
async fn decline_leaves_membership_untouched() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let carol = env.user("carol").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![]))
        .await
        .unwrap();

    let invitation = env
        .invitations()
        .create(
            &room.id,
            &alice,
            CreateInvitationRequest {
                invitee_id: carol.public_id.clone(),
                message: None,
            },
        )
        .await
        .unwrap();

    let outcome = env
        .invitations()
        .respond(&invitation.id, &carol, "decline")
        .await
        .unwrap();
    assert_eq!(outcome.invitation.status, "declined");
    assert!(outcome.joined.is_none());

    assert!(env.rooms().list_rooms(&carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn last_leave_cascades_room_messages_and_invitations() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;
    let carol = env.user("carol").await;

    let room = env
        .rooms()
        .create_room(&alice, group("ephemeral", vec![bob.public_id.clone()]))
        .await
        .unwrap();
    env.messages().send(&room.id, &alice, text("hi")).await.unwrap();
    env.invitations()
        .create(
            &room.id,
            &alice,
            CreateInvitationRequest {
                invitee_id: carol.public_id.clone(),
                message: None,
            },
        )
        .await
        .unwrap();

    let first = env.rooms().leave_room(&room.id, &bob).await.unwrap();
    assert!(!first.room_deleted);
    assert_eq!(first.message.content, "bob left the room");

    let second = env.rooms().leave_room(&room.id, &alice).await.unwrap();
    assert!(second.room_deleted);

    // Room, messages, and pending invitations are all gone.
    let err = env.messages().list(&room.id, &alice, 1, 50).await.unwrap_err();
    assert!(matches!(err, MessagingError::RoomNotFound { .. }));
    assert!(env
        .invitations()
        .list_received(&carol)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn read_receipts_round_trip() {
    let env = TestEnv::new().await;
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let room = env
        .rooms()
        .create_room(&alice, group("general", vec![bob.public_id.clone()]))
        .await
        .unwrap();

    let sent = env.messages().send(&room.id, &alice, text("hi")).await.unwrap();
    env.messages().mark_read(&sent.id, &bob).await.unwrap();
    env.messages().mark_read(&sent.id, &bob).await.unwrap();

    let history = env.messages().list(&room.id, &alice, 1, 50).await.unwrap();
    assert_eq!(history[0].read_by.len(), 1);
    assert_eq!(history[0].read_by[0].user_id, bob.public_id);
}
