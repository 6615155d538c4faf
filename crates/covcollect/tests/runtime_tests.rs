//! End-to-end runtime tests: hits from many threads, periodic and exit
//! collection, and reading the file back.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use covcollect::{Cover, CoverageProfile};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn table(n: usize) -> Arc<Cover> {
    let names = (0..n).map(|i| format!("f{i}")).collect();
    let lines = (0..n as u32).map(|i| i * 10 + 1).collect();
    Arc::new(Cover::new(names, lines).expect("table"))
}

#[test]
fn concurrent_hits_are_all_recorded() {
    let cover = table(64);
    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let cover = Arc::clone(&cover);
            thread::spawn(move || {
                for index in (worker..64).step_by(8) {
                    cover.hit(index);
                    cover.hit(index);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert!((0..64).all(|i| cover.is_hit(i)));
}

#[test]
fn exit_hook_output_reads_back_as_profile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cover.out");
    let cover = table(4);
    {
        let _exit = cover.collect_on_drop(&path);
        cover.hit(1);
        cover.hit(3);
    }

    let profile = CoverageProfile::read(&path).unwrap();
    assert_eq!(profile.records(), cover.records().as_slice());
    let covered: Vec<_> = profile.covered().map(|r| r.name.clone()).collect();
    assert_eq!(covered, vec!["f1", "f3"]);
    assert_eq!(profile.summary().covered_functions, 2);
}

#[test]
fn exit_hook_runs_while_periodic_loop_is_armed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cover.out");
    let cover = table(32);
    let periodic = cover.spawn_periodic_collect("1h", &path).unwrap();
    assert!(periodic.is_some());
    {
        let _exit = cover.collect_on_drop(&path);
        for i in 0..32 {
            cover.hit(i);
        }
    }

    let profile = CoverageProfile::read(&path).unwrap();
    assert_eq!(profile.records().len(), 32);
}
