use assert_cmd::cargo::cargo_bin_cmd;

fn help(args: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("rosterctl");
    let output = cmd
        .args(args)
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn top_level_help_lists_commands() {
    let text = help(&[]);
    for command in ["users", "roles", "tui", "config"] {
        assert!(text.contains(command), "help missing '{command}'");
    }
    assert!(text.contains("--data-dir"), "help missing --data-dir");
}

#[test]
fn users_list_help_mentions_filters() {
    let text = help(&["users", "list"]);
    assert!(text.contains("--status"), "list help missing --status");
    assert!(text.contains("--role"), "list help missing --role");
    assert!(text.contains("--recent"), "list help missing --recent");
    assert!(text.contains("--sort"), "list help missing --sort");
}

#[test]
fn roles_add_help_mentions_permissions() {
    let text = help(&["roles", "add"]);
    assert!(
        text.contains("--permission"),
        "roles add help missing --permission"
    );
}
