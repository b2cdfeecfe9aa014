use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SHOPLINE_ENV: &[&str] = &[
    "SHOPLINE_STORE",
    "SHOPLINE_STORE_ALIASES",
    "SHOPLINE_OUTPUT",
    "SHOPLINE_API_BASE_URL",
    "SHOPLINE_ACCESS_TOKEN",
    "SHOPLINE_API_TOKEN",
    "SHOPLINE_TOKEN",
    "SHOPLINE_LOG",
];

fn spl(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spl").unwrap();
    for var in SHOPLINE_ENV {
        cmd.env_remove(var);
    }
    cmd.env("SHOPLINE_CONFIG_DIR", config_dir);
    cmd
}

fn login(config_dir: &Path, name: &str, handle: &str) {
    spl(config_dir)
        .args(["auth", "login", "--name", name, "--handle", handle, "--token", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved profile"));
}

#[test]
fn test_aliased_list_dry_run() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo", "demo-shop");

    spl(temp.path())
        .args(["o", "l", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"method\": \"GET\""))
        .stdout(predicate::str::contains("\"path\": \"/orders\""))
        .stdout(predicate::str::contains("\"profile\": \"demo\""))
        .stdout(predicate::str::contains(
            "https://demo-shop.myshopline.com/admin/openapi/",
        ));
}

#[test]
fn test_formatted_id_accepted() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo", "demo-shop");

    spl(temp.path())
        .args(["product", "get", "[product:$prod_1]", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"/products/prod_1\""));
}

#[test]
fn test_limit_and_flag_aliases() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo", "demo-shop");

    spl(temp.path())
        .args(["orders", "ls", "--limit", "5", "--S", "open", "--dr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"page_size\": \"5\""))
        .stdout(predicate::str::contains("\"status\": \"open\""));
}

#[test]
fn test_negative_limit_rejected() {
    let temp = TempDir::new().unwrap();

    spl(temp.path())
        .args(["o", "l", "--limit", "-1", "--dry-run"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("limit must be >= 0"));
}

#[test]
fn test_store_url_selects_profile_with_note() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo", "demo-shop");
    login(temp.path(), "other", "other-shop");

    spl(temp.path())
        .args([
            "--store",
            "https://demo-shop.myshopline.com/admin",
            "orders",
            "list",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"profile\": \"demo\""))
        .stderr(predicate::str::contains(
            "Using profile \"demo\" (matched from \"https://demo-shop.myshopline.com/admin\")",
        ));
}

#[test]
fn test_ambiguous_store_is_an_error() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo-a", "shop-a");
    login(temp.path(), "demo-b", "shop-b");

    spl(temp.path())
        .args(["--store", "demo", "o", "l", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiple matches: demo-a, demo-b"));
}

#[test]
fn test_multiple_profiles_need_a_store() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo-a", "shop-a");
    login(temp.path(), "demo-b", "shop-b");

    spl(temp.path())
        .args(["o", "l", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("use --store"));
}

#[test]
fn test_direct_token_skips_store() {
    let temp = TempDir::new().unwrap();

    spl(temp.path())
        .env("SHOPLINE_ACCESS_TOKEN", "env_tok")
        .args(["orders", "list", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://open.shopline.io/v1"))
        .stdout(predicate::str::contains("\"profile\"").not());
}

#[test]
fn test_destructive_needs_confirmation() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo", "demo-shop");

    spl(temp.path())
        .args(["--no-input", "orders", "cancel", "ord_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --yes"));
}

#[test]
fn test_help_json_reports_aliases() {
    let temp = TempDir::new().unwrap();

    spl(temp.path())
        .args(["help-json", "o", "l"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"list\""))
        .stdout(predicate::str::contains("\"alias_of\": \"page-size\""));
}

#[test]
fn test_query_requires_json_output() {
    let temp = TempDir::new().unwrap();

    spl(temp.path())
        .args(["schema", "--output", "text", "--query", ".name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("require --output json"));
}

#[test]
fn test_config_round_trip() {
    let temp = TempDir::new().unwrap();

    spl(temp.path())
        .args(["config", "output", "json"])
        .assert()
        .success();
    spl(temp.path())
        .args(["config", "output"])
        .assert()
        .success()
        .stdout(predicate::str::diff("json\n"));
    spl(temp.path())
        .args(["config", "output", "yaml"])
        .assert()
        .failure();
}

#[test]
fn test_auth_list_and_logout() {
    let temp = TempDir::new().unwrap();
    login(temp.path(), "demo", "demo-shop");

    spl(temp.path())
        .args(["auth", "ls", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"handle\": \"demo-shop\""));
    spl(temp.path())
        .args(["auth", "logout", "demo"])
        .assert()
        .success();
    spl(temp.path())
        .args(["auth", "logout", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile not found"));
}

#[cfg(unix)]
#[test]
fn test_login_keeps_credentials_private() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("spl");
    login(&config_dir, "demo", "demo-shop");

    let mode = std::fs::metadata(config_dir.join("credentials.json"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o077, 0);
}
