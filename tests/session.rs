//! Tests for the display state and the live editing session.
mod common;
use common::*;
use snapchain_codegen::error::{EmitError, RefinementError};
use snapchain_codegen::prelude::*;
use snapchain_codegen::refine::MockRefinementClient;
use snapchain_codegen::session::ErrorCategory;
use std::sync::Arc;
use std::time::Duration;

fn session_with_struct() -> (LiveSession, NodeId) {
    let mut graph = empty_graph();
    let id = account_struct(&mut graph, "Vault", &[("owner", "Pubkey")]);
    let scheduler = Arc::new(scheduler_for(&graph, 25));
    (
        LiveSession::new(graph, scheduler, Duration::from_millis(300)),
        id,
    )
}

fn refiner(response: &str) -> Refiner<MockRefinementClient> {
    Refiner::new(
        MockRefinementClient::new(response),
        RefinementConfig::default(),
    )
}

// --- CodeState transitions ---

#[test]
fn test_generation_failure_keeps_last_good_code() {
    let mut state = CodeState::new();
    assert!(state.apply_generation(1, Ok("good".to_string())));

    let error = EmitError::MissingRequiredField {
        node_id: NodeId::new("blk-9"),
        field: "name".to_string(),
    };
    assert!(state.apply_generation(2, Err(error)));
    assert_eq!(state.code(), "good");
    assert_eq!(state.revision(), 1);

    let banner = state.banner().unwrap();
    assert_eq!(banner.category, ErrorCategory::Generator);
    assert_eq!(banner.node_id, Some(NodeId::new("blk-9")));
    assert!(banner.message.contains("name"));

    state.dismiss_banner();
    assert!(state.banner().is_none());
}

#[test]
fn test_stale_generation_is_ignored() {
    let mut state = CodeState::new();
    state.apply_generation(5, Ok("newer".to_string()));
    assert!(!state.apply_generation(3, Ok("older".to_string())));
    assert_eq!(state.code(), "newer");
}

#[test]
fn test_refined_code_survives_until_next_edit() {
    let mut state = CodeState::new();
    state.apply_generation(4, Ok("generated".to_string()));
    assert!(state.apply_refinement(4, Ok("refined".to_string())));
    assert_eq!(state.source(), CodeSource::Refined);

    // Same revision: the graph has not changed since the refinement.
    assert!(!state.apply_generation(4, Ok("generated".to_string())));
    assert_eq!(state.code(), "refined");

    assert!(state.apply_generation(5, Ok("regenerated".to_string())));
    assert_eq!(state.code(), "regenerated");
    assert_eq!(state.source(), CodeSource::Generated);
}

#[test]
fn test_collaborator_failure_is_a_separate_category() {
    let mut state = CodeState::new();
    state.apply_generation(1, Ok("generated".to_string()));
    state.apply_refinement(1, Err(RefinementError::Http("connection refused".to_string())));

    assert_eq!(state.code(), "generated");
    assert_eq!(state.source(), CodeSource::Generated);
    let banner = state.banner().unwrap();
    assert_eq!(banner.category, ErrorCategory::Collaborator);
    assert_eq!(banner.node_id, None);
}

// --- LiveSession ---

#[tokio::test]
async fn test_generate_now_publishes_code() {
    let (session, _) = session_with_struct();
    let code = session.generate_now().await.unwrap();

    let state = session.state();
    assert_eq!(state.code(), code);
    assert!(code.contains("pub struct Vault {"));
    assert_eq!(state.source(), CodeSource::Generated);
}

#[tokio::test]
async fn test_broken_edit_shows_banner_over_old_code() {
    let (session, id) = session_with_struct();
    let good = session.generate_now().await.unwrap();

    session
        .edit(|graph| graph.set_field(&id, "name", ""))
        .await
        .unwrap();
    assert!(session.generate_now().await.is_err());

    let state = session.state();
    assert_eq!(state.code(), good);
    assert_eq!(state.banner().unwrap().node_id, Some(id));
}

#[tokio::test]
async fn test_refinement_replaces_code_until_graph_changes() {
    let (session, id) = session_with_struct();
    session.generate_now().await.unwrap();

    let refined = session
        .refine(&refiner("```rust\npub struct Vault { pub owner: Pubkey, pub bump: u8 }\n```"), "Add a bump")
        .await
        .unwrap();
    assert_eq!(session.state().code(), refined);
    assert_eq!(session.state().source(), CodeSource::Refined);

    // Regenerating the unchanged graph keeps the refinement.
    session.generate_now().await.unwrap();
    assert_eq!(session.state().code(), refined);

    session
        .edit(|graph| graph.set_field(&id, "name", "Safe"))
        .await
        .unwrap();
    session.generate_now().await.unwrap();
    assert!(session.state().code().contains("pub struct Safe {"));
    assert_eq!(session.state().source(), CodeSource::Generated);
}

#[tokio::test]
async fn test_refinement_failure_keeps_generated_code() {
    let (session, _) = session_with_struct();
    let generated = session.generate_now().await.unwrap();

    let failing = Refiner::new(
        MockRefinementClient::failing(RefinementError::Http("offline".to_string())),
        RefinementConfig::default(),
    );
    assert!(session.refine(&failing, "Anything").await.is_err());

    let state = session.state();
    assert_eq!(state.code(), generated);
    assert_eq!(state.banner().unwrap().category, ErrorCategory::Collaborator);
}

#[tokio::test]
async fn test_failed_edit_does_not_bump_revision() {
    let (session, id) = session_with_struct();
    let revisions = session.revisions();
    let before = *revisions.borrow();

    assert!(
        session
            .edit(|graph| graph.set_field(&id, "colour", "blue"))
            .await
            .is_err()
    );
    assert_eq!(*revisions.borrow(), before);
    assert_eq!(session.snapshot().await.revision(), before);
}

#[tokio::test(start_paused = true)]
async fn test_background_generator_debounces_edits() {
    let (session, id) = session_with_struct();
    let mut updates = session.subscribe();
    let generator = session.spawn_generator();

    for name in ["First", "Second", "Third"] {
        session
            .edit(|graph| graph.set_field(&id, "name", name))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    updates.changed().await.unwrap();
    let state = updates.borrow_and_update().clone();
    assert!(state.code().contains("pub struct Third {"));
    assert_eq!(state.revision(), session.snapshot().await.revision());

    drop(session);
    generator.await.unwrap();
}
