//! Black-box tests driving the built binary against a scripted repository.

use std::path::Path;
use std::process::Command;

use git2::{Repository, Signature, Time};

const ACCOUNT_V1: &str = "\
class Account {
    int balance;

    void deposit(int amount) {
        assert amount > 0;
        balance += amount;
    }
}
";

const ACCOUNT_V2: &str = "\
class Account {
    int balance;

    void deposit(int amount) {
        assert amount > 0 : \"deposit\";
        balance += amount;
    }
}
";

fn commit_at(repo: &Repository, dir: &Path, name: &str, content: &str, message: &str, when: i64) {
    std::fs::write(dir.join(name), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let time = Time::new(when, 0);
    let sig = Signature::new("tester", "tester@example.com", &time).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

fn scripted_repo(dir: &Path) {
    let repo = Repository::init(dir).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "tester").unwrap();
        config.set_str("user.email", "tester@example.com").unwrap();
    }
    commit_at(&repo, dir, "Account.java", ACCOUNT_V1, "initial import", 1_000);
    commit_at(
        &repo,
        dir,
        "Account.java",
        ACCOUNT_V2,
        "fix: reject zero deposits",
        2_000,
    );
}

// Run from inside the tempdir so config resolution never sees a stray
// .fixlens.toml from the developer's checkout.
fn fixlens(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fixlens"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn survey_reports_counts_as_json() {
    let dir = tempfile::tempdir().unwrap();
    scripted_repo(dir.path());

    let output = fixlens(dir.path())
        .args(["survey", "--format", "json", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "survey failed: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["commits"], 2);
    assert_eq!(report["fixCommits"], 1);
    assert_eq!(report["declarationsTouched"], 1);
    assert_eq!(report["matched"], 1);
    assert_eq!(report["matchedPercentage"], 100.0);
    assert_eq!(report["headDeclarations"], 1);
    assert_eq!(report["headMatched"], 1);
    assert_eq!(report["headMatchedPercentage"], 100.0);
    assert_eq!(report["policy"], "assert");
}

#[test]
fn survey_loop_policy_matches_nothing_here() {
    let dir = tempfile::tempdir().unwrap();
    scripted_repo(dir.path());

    let output = fixlens(dir.path())
        .args(["survey", "--format", "json", "--policy", "loop", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["policy"], "loop");
    assert_eq!(report["matched"], 0);
    assert_eq!(report["matchedPercentage"], 0.0);
}

#[test]
fn commits_lists_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    scripted_repo(dir.path());

    let output = fixlens(dir.path())
        .args(["commits", "--format", "json", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let commits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let commits = commits.as_array().unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0]["summary"], "fix: reject zero deposits");
    assert_eq!(commits[1]["summary"], "initial import");
}

#[test]
fn commits_fix_only_filters() {
    let dir = tempfile::tempdir().unwrap();
    scripted_repo(dir.path());

    let output = fixlens(dir.path())
        .args(["commits", "--fix-only", "--format", "json", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let commits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(commits.as_array().unwrap().len(), 1);
}

#[test]
fn resolve_head_names_the_fixed_method() {
    let dir = tempfile::tempdir().unwrap();
    scripted_repo(dir.path());

    let output = fixlens(dir.path())
        .args(["resolve", "HEAD", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "resolve failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("match"));
    assert!(stdout.contains("deposit"));
    assert!(stdout.contains("Account.java"));
}

#[test]
fn census_counts_the_tip_tree() {
    let dir = tempfile::tempdir().unwrap();
    scripted_repo(dir.path());

    let output = fixlens(dir.path())
        .args(["census", "--format", "json", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let census: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(census["files"], 1);
    assert_eq!(census["declarations"], 1);
    assert_eq!(census["matched"], 1);
}

#[test]
fn survey_outside_a_repository_fails_with_a_hint() {
    let dir = tempfile::tempdir().unwrap();

    let output = fixlens(dir.path())
        .args(["survey", "--repo"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not a git repository"));
}
