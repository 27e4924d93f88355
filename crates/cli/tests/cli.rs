use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("bookshelf-cli")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "migrate", "settings"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn settings_fails_without_signing_secret() {
    Command::cargo_bin("bookshelf-cli")
        .unwrap()
        .arg("settings")
        .env_remove("BOOKSHELF_AUTH__JWT_SECRET")
        .env("BOOKSHELF_CONFIG_DIR", "/nonexistent")
        .current_dir(std::env::temp_dir())
        .assert()
        .failure();
}
