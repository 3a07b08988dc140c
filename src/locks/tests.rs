//! Tests for the locks subsystem.

use super::*;
use crate::error::HighlanderError;
use crate::test_support::{FakeProcesses, write_raw_record};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use tempfile::TempDir;

/// Create a temporary directory and the (not yet existing) lock path inside it.
fn create_test_lock() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let lock_dir = temp_dir.path().join(".pid");
    (temp_dir, lock_dir)
}

fn processes() -> FakeProcesses {
    FakeProcesses::new(100, 1_700_000_000.5).with_process(200, 1_690_000_000.125)
}

#[test]
fn test_claim_fresh_path() {
    let (_temp_dir, lock_dir) = create_test_lock();

    assert_eq!(claim(&lock_dir).unwrap(), Claim::Claimed);
    assert!(lock_dir.is_dir());
}

#[test]
fn test_claim_existing_directory_is_already_held() {
    let (_temp_dir, lock_dir) = create_test_lock();
    fs::create_dir(&lock_dir).unwrap();

    assert_eq!(claim(&lock_dir).unwrap(), Claim::AlreadyHeld);
}

#[test]
fn test_claim_missing_parent_is_fatal() {
    let (_temp_dir, lock_dir) = create_test_lock();
    let nested = lock_dir.join("deeper").join(".pid");

    let err = claim(&nested).unwrap_err();

    assert!(matches!(err, HighlanderError::Claim { .. }));
    assert!(err.to_string().contains("deeper"));
}

#[test]
fn test_concurrent_claims_have_exactly_one_winner() {
    let (_temp_dir, lock_dir) = create_test_lock();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let lock_dir = lock_dir.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                claim(&lock_dir).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<Claim> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let claimed = outcomes.iter().filter(|c| **c == Claim::Claimed).count();
    let held = outcomes.iter().filter(|c| **c == Claim::AlreadyHeld).count();
    assert_eq!(claimed, 1);
    assert_eq!(held, threads - 1);
}

#[test]
fn test_try_claim_guard_releases_on_drop() {
    let (_temp_dir, lock_dir) = create_test_lock();

    let guard = try_claim(&lock_dir).unwrap().expect("fresh lock");
    assert_eq!(guard.path(), lock_dir.as_path());
    assert!(try_claim(&lock_dir).unwrap().is_none());

    drop(guard);

    assert!(!lock_dir.exists());
    assert!(try_claim(&lock_dir).unwrap().is_some());
}

#[test]
fn test_lock_guard_manual_release() {
    let (_temp_dir, lock_dir) = create_test_lock();
    let guard = try_claim(&lock_dir).unwrap().unwrap();

    guard.release().unwrap();

    assert!(!lock_dir.exists());
}

#[test]
fn test_lock_guard_manual_release_of_vanished_lock_fails() {
    let (_temp_dir, lock_dir) = create_test_lock();
    let guard = try_claim(&lock_dir).unwrap().unwrap();
    fs::remove_dir(&lock_dir).unwrap();

    let err = guard.release().unwrap_err();

    assert!(matches!(err, HighlanderError::InvalidLockLocation { .. }));
}

#[test]
fn test_write_and_read_record() {
    let (_temp_dir, lock_dir) = create_test_lock();
    fs::create_dir(&lock_dir).unwrap();
    let record = LockRecord::new(100, 1_700_000_000.5);

    write_record(&lock_dir, &record).unwrap();

    assert_eq!(
        fs::read_to_string(info_path(&lock_dir)).unwrap(),
        "100 1700000000.500000"
    );
    assert_eq!(read_record(&lock_dir).unwrap(), record);
}

#[test]
fn test_write_record_twice_fails() {
    let (_temp_dir, lock_dir) = create_test_lock();
    fs::create_dir(&lock_dir).unwrap();
    write_record(&lock_dir, &LockRecord::new(100, 1.0)).unwrap();

    let err = write_record(&lock_dir, &LockRecord::new(200, 2.0)).unwrap_err();

    assert!(matches!(err, HighlanderError::RecordAlreadyExists { .. }));
    assert_eq!(read_record(&lock_dir).unwrap(), LockRecord::new(100, 1.0));
}

#[test]
fn test_read_record_missing_file_is_invalid() {
    let (_temp_dir, lock_dir) = create_test_lock();
    fs::create_dir(&lock_dir).unwrap();

    let err = read_record(&lock_dir).unwrap_err();

    assert!(matches!(err, HighlanderError::InvalidRecord { .. }));
}

#[test]
fn test_read_record_malformed_content_is_invalid() {
    let (_temp_dir, lock_dir) = create_test_lock();

    for content in ["", "abc def", "123", "1 2 3", "123,123.12"] {
        write_raw_record(&lock_dir, content);
        let err = read_record(&lock_dir).unwrap_err();
        assert!(
            matches!(err, HighlanderError::InvalidRecord { .. }),
            "content {content:?} should be invalid"
        );
    }
}

#[test]
fn test_inspect_classifies_paths() {
    let (temp_dir, lock_dir) = create_test_lock();
    assert_eq!(inspect(&lock_dir).unwrap(), Location::Absent);

    fs::create_dir(&lock_dir).unwrap();
    assert_eq!(inspect(&lock_dir).unwrap(), Location::Directory);

    let file = temp_dir.path().join("plain");
    fs::write(&file, "x").unwrap();
    assert_eq!(inspect(&file).unwrap(), Location::NotDirectory);
}

#[test]
fn test_release_removes_directory_and_record() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "100 1.000000");

    release(&lock_dir).unwrap();

    assert!(!lock_dir.exists());
}

#[test]
fn test_release_on_regular_file_fails() {
    let (_temp_dir, lock_dir) = create_test_lock();
    fs::write(&lock_dir, "not a directory").unwrap();

    let err = release(&lock_dir).unwrap_err();

    assert!(matches!(err, HighlanderError::InvalidLockLocation { .. }));
    assert!(lock_dir.is_file());
}

#[test]
fn test_release_on_missing_path_fails() {
    let (_temp_dir, lock_dir) = create_test_lock();

    let err = release(&lock_dir).unwrap_err();

    assert!(matches!(err, HighlanderError::InvalidLockLocation { .. }));
}

#[test]
fn test_lenient_release_tolerates_missing_path() {
    let (_temp_dir, lock_dir) = create_test_lock();

    release_with(&lock_dir, ReleaseMode::Lenient).unwrap();
    release_lenient(&lock_dir);

    assert!(!lock_dir.exists());
}

#[test]
fn test_assess_live_holder() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "200 1690000000.125000");

    let assessment = assess(&lock_dir, &processes()).unwrap();

    assert_eq!(
        assessment,
        Assessment::Live(LockRecord::new(200, 1_690_000_000.125))
    );
}

#[test]
fn test_assess_dead_holder() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "99999999999 1.1");

    let assessment = assess(&lock_dir, &processes()).unwrap();

    assert_eq!(
        assessment,
        Assessment::Stale {
            reason: StaleReason::HolderGone,
            record: Some(LockRecord::new(99_999_999_999, 1.1)),
        }
    );
}

#[test]
fn test_assess_reused_pid() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "200 1234.000000");

    let assessment = assess(&lock_dir, &processes()).unwrap();

    assert!(matches!(
        assessment,
        Assessment::Stale {
            reason: StaleReason::PidReused,
            ..
        }
    ));
}

#[test]
fn test_assess_invalid_record() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "abc def");

    let assessment = assess(&lock_dir, &processes()).unwrap();

    assert_eq!(
        assessment,
        Assessment::Stale {
            reason: StaleReason::InvalidRecord,
            record: None,
        }
    );
    // Assessment alone never touches the lock.
    assert!(lock_dir.is_dir());
}

#[test]
fn test_detect_reclaims_stale_lock() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "99999999999 1.1");

    let detection = detect(&lock_dir, &processes()).unwrap();

    assert_eq!(detection, Detection::Reclaimed(StaleReason::HolderGone));
    assert!(!lock_dir.exists());
}

#[test]
fn test_detect_leaves_live_lock() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "100 1700000000.500000");

    let detection = detect(&lock_dir, &processes()).unwrap();

    assert_eq!(
        detection,
        Detection::Live(LockRecord::new(100, 1_700_000_000.5))
    );
    assert!(lock_dir.is_dir());
}

#[test]
fn test_detect_tolerates_lock_released_concurrently() {
    let (_temp_dir, lock_dir) = create_test_lock();

    // The holder released between the existence check and the record read.
    let detection = detect(&lock_dir, &processes()).unwrap();

    assert_eq!(detection, Detection::Reclaimed(StaleReason::InvalidRecord));
    assert!(!lock_dir.exists());
}

#[test]
fn test_status_free() {
    let (_temp_dir, lock_dir) = create_test_lock();

    let status = status(&lock_dir, &processes()).unwrap();

    assert!(matches!(status, LockStatus::Free));
    assert!(!status.is_held());
}

#[test]
fn test_status_held() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "200 1690000000.125000");

    let status = status(&lock_dir, &processes()).unwrap();

    assert!(status.is_held());
    let LockStatus::Held(info) = status else {
        panic!("expected held lock");
    };
    assert_eq!(info.path, lock_dir);
    assert_eq!(info.record.pid, 200);
}

#[test]
fn test_status_stale_is_read_only() {
    let (_temp_dir, lock_dir) = create_test_lock();
    write_raw_record(&lock_dir, "99999999999 1.1");

    let status = status(&lock_dir, &processes()).unwrap();

    assert!(matches!(
        status,
        LockStatus::Stale {
            reason: StaleReason::HolderGone,
            ..
        }
    ));
    assert!(lock_dir.is_dir());
}

#[test]
fn test_status_on_regular_file_fails() {
    let (_temp_dir, lock_dir) = create_test_lock();
    fs::write(&lock_dir, "x").unwrap();

    let err = status(&lock_dir, &processes()).unwrap_err();

    assert!(matches!(err, HighlanderError::InvalidLockLocation { .. }));
}

#[test]
fn test_lock_info_age_string() {
    let now = Utc::now().timestamp() as f64;
    let info = |start: f64| LockInfo {
        path: PathBuf::from("/tmp/.pid"),
        record: LockRecord::new(1, start),
    };

    assert!(info(now).age_string().ends_with('m'));
    assert!(info(now - 2.0 * 3600.0).age_string().contains('h'));
    assert!(info(now - 3.0 * 86_400.0).age_string().contains('d'));
    assert_eq!(info(1e300).age_string(), "unknown");
}

#[test]
fn test_lock_info_display() {
    let info = LockInfo {
        path: PathBuf::from("/tmp/job/.pid"),
        record: LockRecord::new(4242, Utc::now().timestamp() as f64),
    };

    let display = format!("{}", info);
    assert!(display.contains("/tmp/job/.pid"));
    assert!(display.contains("pid: 4242"));
}

#[test]
fn test_stale_reason_display() {
    assert_eq!(
        StaleReason::PidReused.to_string(),
        "holder pid was reused by another process"
    );
}
