use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use focusflow::{Database, SessionController};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A controller over a fresh database in a per-test temp directory.
pub fn test_controller(test_name: &str) -> (SessionController, PathBuf) {
    let _ = env_logger::builder().is_test(true).try_init();

    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let temp_dir = env::temp_dir().join(format!(
        "focusflow_test_{}_{}_{}",
        std::process::id(),
        test_name,
        counter
    ));
    let _ = std::fs::remove_dir_all(&temp_dir);

    let db = Database::new(temp_dir.join("focusflow.sqlite3")).expect("failed to open test db");
    (SessionController::new(db), temp_dir)
}
