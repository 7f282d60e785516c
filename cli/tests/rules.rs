use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

fn rolegate() -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("rolegate")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

fn write_rules(dir: &TempDir, contents: &str) -> Result<PathBuf> {
    let path = dir.path().join("rules.json");
    fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn embedded_table_validates_clean() -> Result<()> {
    rolegate()?
        .args(["rules", "validate"])
        .assert()
        .success()
        .stdout(contains("ok: 11 policies"));
    Ok(())
}

#[test]
fn validate_reports_duplicates_and_contradictions() -> Result<()> {
    let dir = TempDir::new()?;
    let rules = write_rules(
        &dir,
        r#"{"restrictTeamInvite": {"all": [
            {"roleName": "team_user", "permission": "invite_user", "shouldHave": true},
            {"roleName": "team_user", "permission": "invite_user", "shouldHave": true},
            {"roleName": "team_user", "permission": "invite_user", "shouldHave": false}
        ]}}"#,
    )?;

    let output = rolegate()?
        .args(["rules", "validate", "--json", "--rules"])
        .arg(&rules)
        .output()?;
    assert!(!output.status.success());

    let issues: Vec<JsonValue> = serde_json::from_slice(&output.stdout)?;
    let kinds: Vec<&str> = issues
        .iter()
        .filter_map(|issue| issue["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"duplicate_rule"));
    assert!(kinds.contains(&"contradictory_rule"));
    Ok(())
}

#[test]
fn validate_reports_repeated_keys() -> Result<()> {
    let dir = TempDir::new()?;
    let rules = write_rules(
        &dir,
        r#"{"inviteGuests": {
            "TEAM_ADMIN": [{"roleName": "team_admin", "permission": "invite_guest", "shouldHave": true}],
            "TEAM_ADMIN": [{"roleName": "team_user", "permission": "invite_guest", "shouldHave": false}]
        }}"#,
    )?;

    let output = rolegate()?
        .args(["rules", "validate", "--json", "--rules"])
        .arg(&rules)
        .output()?;
    assert!(!output.status.success());

    let issues: Vec<JsonValue> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        issues,
        vec![serde_json::json!({
            "kind": "repeated_value_key",
            "policy": "InviteGuests",
            "value": "TEAM_ADMIN",
        })]
    );
    Ok(())
}

#[test]
fn malformed_table_names_the_entry() -> Result<()> {
    let dir = TempDir::new()?;
    let rules = write_rules(
        &dir,
        r#"{"inviteGuests": {"TEAM_ADMIN": [{"roleName": "team_admin", "permission": "invite_guest"}]}}"#,
    )?;

    rolegate()?
        .args(["rules", "validate", "--rules"])
        .arg(&rules)
        .assert()
        .failure()
        .stderr(contains("inviteGuests.TEAM_ADMIN[0]").and(contains("shouldHave")));
    Ok(())
}

#[test]
fn lookup_prints_rules_for_a_value() -> Result<()> {
    let output = rolegate()?
        .args(["rules", "lookup", "inviteGuests", "TEAM_ADMIN"])
        .output()?;
    assert!(output.status.success());

    let rules: Vec<JsonValue> = serde_json::from_slice(&output.stdout)?;
    assert!(rules.iter().any(|rule| {
        rule["roleName"] == "team_admin"
            && rule["permission"] == "invite_guest"
            && rule["shouldHave"] == true
    }));
    Ok(())
}

#[test]
fn lookup_of_unregistered_value_is_empty() -> Result<()> {
    let output = rolegate()?
        .args(["rules", "lookup", "InviteGuests", "SOMETIMES"])
        .output()?;
    assert!(output.status.success());
    let rules: Vec<JsonValue> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(rules, Vec::<JsonValue>::new());
    Ok(())
}

#[test]
fn lookup_of_unknown_policy_fails() -> Result<()> {
    rolegate()?
        .args(["rules", "lookup", "enableTelepathy", "on"])
        .assert()
        .failure()
        .stderr(contains("no policy named 'EnableTelepathy'"));
    Ok(())
}

#[test]
fn embedded_table_verifies_with_and_without_license() -> Result<()> {
    rolegate()?
        .args(["rules", "verify"])
        .assert()
        .success()
        .stdout(contains("licensed: false"));
    rolegate()?
        .args(["rules", "verify", "--licensed"])
        .assert()
        .success()
        .stdout(contains("licensed: true"));
    Ok(())
}

#[test]
fn verify_fails_when_a_later_policy_overrides_an_assertion() -> Result<()> {
    let dir = TempDir::new()?;
    let rules = write_rules(
        &dir,
        r#"{
            "restrictTeamInvite": {"all": [{"roleName": "team_user", "permission": "invite_user", "shouldHave": true}]},
            "inviteGuests": {"DISABLED": [{"roleName": "team_user", "permission": "invite_user", "shouldHave": false}]}
        }"#,
    )?;

    rolegate()?
        .args(["rules", "verify", "--rules"])
        .arg(&rules)
        .assert()
        .failure()
        .stdout(contains(
            "expected 'team_user' to have 'invite_user' permission when 'RestrictTeamInvite' is set to 'all'",
        ));
    Ok(())
}
