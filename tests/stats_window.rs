mod common;

use std::fs;

use focusflow::{
    CompleteSessionParams, DistractionInput, FocusStats, SessionType, StartSessionParams,
};
use uuid::Uuid;

use common::test_controller;

fn params(session_type: SessionType, duration_minutes: u32) -> StartSessionParams {
    StartSessionParams {
        duration_minutes,
        session_type,
        break_duration_minutes: None,
    }
}

async fn run_completed(
    controller: &focusflow::SessionController,
    user: Uuid,
    session_type: SessionType,
    actual_duration: u32,
) {
    controller
        .start_session(user, params(session_type, 25))
        .await
        .unwrap();
    controller
        .complete_session(
            user,
            CompleteSessionParams {
                actual_duration: Some(actual_duration),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_window_yields_all_zero_stats() {
    let (controller, temp_dir) = test_controller("stats_empty");
    let user = Uuid::new_v4();

    let stats = controller.compute_stats(user, None).await.unwrap();
    assert_eq!(stats, FocusStats::default());

    let _ = fs::remove_dir_all(&temp_dir);
}

#[tokio::test]
async fn mixed_window_aggregates_and_streak() {
    let (controller, temp_dir) = test_controller("stats_mixed");
    let user = Uuid::new_v4();

    run_completed(&controller, user, SessionType::Focus, 25).await;
    run_completed(&controller, user, SessionType::Focus, 30).await;
    run_completed(&controller, user, SessionType::Focus, 20).await;
    controller
        .start_session(user, params(SessionType::Focus, 25))
        .await
        .unwrap();
    controller
        .log_distraction(
            user,
            DistractionInput {
                name: "phone".into(),
                duration_seconds: Some(45),
                session_id: None,
            },
        )
        .await
        .unwrap();

    let stats = controller.compute_stats(user, Some(7)).await.unwrap();
    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.completed_sessions, 3);
    assert_eq!(stats.total_focus_minutes, 75);
    assert_eq!(stats.total_distractions, 1);
    assert_eq!(stats.average_session_duration, 25.0);
    assert_eq!(stats.completion_rate, 75.0);
    // Everything completed today: a one-day streak.
    assert_eq!(stats.current_streak, 1);

    let _ = fs::remove_dir_all(&temp_dir);
}

#[tokio::test]
async fn breaks_are_excluded_from_focus_minutes() {
    let (controller, temp_dir) = test_controller("stats_breaks");
    let user = Uuid::new_v4();

    run_completed(&controller, user, SessionType::Focus, 50).await;
    run_completed(&controller, user, SessionType::Break, 5).await;
    run_completed(&controller, user, SessionType::LongBreak, 15).await;

    let stats = controller.compute_stats(user, None).await.unwrap();
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.completed_sessions, 3);
    assert_eq!(stats.total_focus_minutes, 50);
    assert_eq!(stats.completion_rate, 100.0);

    let _ = fs::remove_dir_all(&temp_dir);
}

#[tokio::test]
async fn cancelled_sessions_leave_no_trace_in_stats() {
    let (controller, temp_dir) = test_controller("stats_cancelled");
    let user = Uuid::new_v4();

    run_completed(&controller, user, SessionType::Focus, 25).await;

    controller
        .start_session(user, params(SessionType::Focus, 25))
        .await
        .unwrap();
    controller
        .log_distraction(
            user,
            DistractionInput {
                name: "doorbell".into(),
                duration_seconds: None,
                session_id: None,
            },
        )
        .await
        .unwrap();
    controller.cancel_session(user).await.unwrap();

    let stats = controller.compute_stats(user, None).await.unwrap();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.completed_sessions, 1);
    assert_eq!(stats.total_distractions, 0);

    let _ = fs::remove_dir_all(&temp_dir);
}

#[tokio::test]
async fn stats_are_scoped_to_the_user() {
    let (controller, temp_dir) = test_controller("stats_scoped");
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    run_completed(&controller, alice, SessionType::Focus, 25).await;

    let stats = controller.compute_stats(bob, None).await.unwrap();
    assert_eq!(stats, FocusStats::default());

    let _ = fs::remove_dir_all(&temp_dir);
}
