use futures::future::join_all;
use serde_json::json;

use crate::common::{TestApp, routes};

mod casting {
    use super::*;

    #[tokio::test]
    async fn logged_in_user_can_vote() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;
        let alice = app.logged_in_user("alice", "secret1").await;

        let res = alice.vote(bob).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["message"], "Vote saved successfully.");
        assert_eq!(res.body["candidate"], "Bob");

        let votes = app.votes_of(app.user_id("alice").await).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].candidate_id, bob);
    }

    #[tokio::test]
    async fn voting_requires_a_logged_in_user() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;

        let res = app.session().vote(bob).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "LOGIN_REQUIRED");
        assert_eq!(res.body["error"], "Please log in before voting.");
    }

    #[tokio::test]
    async fn admin_session_alone_cannot_vote() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;

        let res = admin.vote(bob).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn authentication_is_checked_before_the_candidate() {
        let app = TestApp::spawn().await;

        let res = app.session().vote(999).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unknown_candidate_is_not_found_and_records_nothing() {
        let app = TestApp::spawn().await;
        let alice = app.logged_in_user("alice", "secret1").await;

        let res = alice.vote(999).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(res.body["error"], "Candidate not found.");
        assert!(app.votes_of(app.user_id("alice").await).await.is_empty());
    }

    #[tokio::test]
    async fn missing_or_unusable_candidate_id_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_candidate(&admin, "Bob").await;
        let alice = app.logged_in_user("alice", "secret1").await;

        for body in [
            json!({}),
            json!({"candidateId": "bob"}),
            json!({"candidateId": 99999999999i64}),
        ] {
            let res = alice.post(routes::VOTE, &body).await;

            assert_eq!(res.status, 404, "{body}: {}", res.text);
            assert_eq!(res.body["code"], "NOT_FOUND");
            assert_eq!(res.body["error"], "Candidate not found.");
        }
        assert!(app.votes_of(app.user_id("alice").await).await.is_empty());
    }

    #[tokio::test]
    async fn numeric_string_candidate_id_is_accepted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;
        let alice = app.logged_in_user("alice", "secret1").await;

        let res = alice
            .post(routes::VOTE, &json!({"candidateId": bob.to_string()}))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["candidate"], "Bob");
        let votes = app.votes_of(app.user_id("alice").await).await;
        assert_eq!(votes[0].candidate_id, bob);
    }
}

mod revoting {
    use super::*;

    #[tokio::test]
    async fn second_vote_overwrites_the_first() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;
        let carol = app.create_candidate(&admin, "Carol").await;
        let alice = app.logged_in_user("alice", "secret1").await;
        let alice_id = app.user_id("alice").await;

        assert_eq!(alice.vote(bob).await.status, 200);
        let first = app.votes_of(alice_id).await;

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let res = alice.vote(carol).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["candidate"], "Carol");

        let votes = app.votes_of(alice_id).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].id, first[0].id);
        assert_eq!(votes[0].candidate_id, carol);
        assert!(votes[0].created_at > first[0].created_at);
    }

    #[tokio::test]
    async fn failed_revote_keeps_the_existing_vote() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;
        let alice = app.logged_in_user("alice", "secret1").await;
        alice.vote(bob).await;

        let res = alice.vote(999).await;
        assert_eq!(res.status, 404);

        let votes = app.votes_of(app.user_id("alice").await).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].candidate_id, bob);
    }

    #[tokio::test]
    async fn concurrent_votes_by_one_user_leave_a_single_row() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;
        let carol = app.create_candidate(&admin, "Carol").await;
        let alice = app.logged_in_user("alice", "secret1").await;

        let attempts = (0..8).map(|i| alice.vote(if i % 2 == 0 { bob } else { carol }));
        let results = join_all(attempts).await;
        for res in &results {
            assert_eq!(res.status, 200, "vote failed: {}", res.text);
        }

        let votes = app.votes_of(app.user_id("alice").await).await;
        assert_eq!(votes.len(), 1);
        assert!(votes[0].candidate_id == bob || votes[0].candidate_id == carol);
    }

    #[tokio::test]
    async fn votes_of_different_users_are_independent() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let bob = app.create_candidate(&admin, "Bob").await;
        let carol = app.create_candidate(&admin, "Carol").await;
        let alice = app.logged_in_user("alice", "secret1").await;
        let dave = app.logged_in_user("dave", "secret2").await;

        alice.vote(bob).await;
        dave.vote(carol).await;

        assert_eq!(app.votes_of(app.user_id("alice").await).await[0].candidate_id, bob);
        assert_eq!(app.votes_of(app.user_id("dave").await).await[0].candidate_id, carol);
    }
}
