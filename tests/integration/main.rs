//! Integration tests for dockd

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Temporary home for config, scratch, caches and applications
    struct Sandbox {
        dir: TempDir,
        config: PathBuf,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();
            std::fs::create_dir_all(root.join("applications")).unwrap();

            let config = root.join("config.toml");
            let content = format!(
                r#"
[general]
journal = true

[paths]
scratch_dir = "{root}/scratch"
cache_dir = "{root}/cache"
settings_file = "{root}/docked.toml"
journal_file = "{root}/journal.log"
application_dirs = ["{root}/applications"]
"#,
                root = root.display()
            );
            std::fs::write(&config, content).unwrap();

            Self { dir, config }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("dockd");
            cmd.arg("--config").arg(&self.config);
            cmd
        }

        fn descriptor(&self, dir: &str, id: &str, name: &str) -> PathBuf {
            let dir = self.root().join(dir);
            std::fs::create_dir_all(&dir).unwrap();
            let path = dir.join(format!("{id}.desktop"));
            std::fs::write(
                &path,
                format!("[Desktop Entry]\nName={name}\nExec={id} %U\nIcon={id}\n"),
            )
            .unwrap();
            path
        }
    }

    fn dockd() -> Command {
        cargo_bin_cmd!("dockd")
    }

    #[test]
    fn help_displays() {
        dockd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Dock entry identity"));
    }

    #[test]
    fn version_displays() {
        dockd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("dockd"));
    }

    #[test]
    fn config_path_follows_flag() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[paths]"));
    }

    #[test]
    fn list_empty() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No docked entries"));
    }

    #[test]
    fn dock_installed_descriptor_then_list() {
        let sandbox = Sandbox::new();
        let path = sandbox.descriptor("applications", "editor", "Editor");

        sandbox
            .cmd()
            .arg("dock")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Docked"));

        sandbox
            .cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("editor\n"));

        let settings = std::fs::read_to_string(sandbox.root().join("docked.toml")).unwrap();
        assert!(settings.contains("\"editor\""));

        sandbox
            .cmd()
            .arg("dock")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("already docked"));
    }

    #[test]
    fn dock_foreign_descriptor_aliases_into_scratch() {
        let sandbox = Sandbox::new();
        let path = sandbox.descriptor("downloads", "webapp", "Web App");

        sandbox.cmd().arg("dock").arg(&path).assert().success();

        let scratch: Vec<_> = std::fs::read_dir(sandbox.root().join("scratch"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(scratch.len(), 1);
        assert!(scratch[0].starts_with("docked:d:"));
        assert_eq!(
            std::fs::read(sandbox.root().join("scratch").join(&scratch[0])).unwrap(),
            std::fs::read(&path).unwrap()
        );

        sandbox
            .cmd()
            .args(["cache", "show", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(scratch[0].as_str()));

        sandbox.cmd().arg("undock").arg(&path).assert().success();
        assert!(std::fs::read_dir(sandbox.root().join("scratch"))
            .unwrap()
            .next()
            .is_none());

        let journal = std::fs::read_to_string(sandbox.root().join("journal.log")).unwrap();
        assert!(journal.contains("entry.docked"));
        assert!(journal.contains("entry.undocked"));
    }

    #[test]
    fn undock_unknown_descriptor_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("undock")
            .arg(sandbox.root().join("missing.desktop"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Descriptor not found"));
    }

    #[test]
    fn watch_docks_window_without_descriptor() {
        let sandbox = Sandbox::new();
        let input = concat!(
            r#"{"type":"opened","window":{"id":1,"title":"Notes","#,
            r#""icon":"data:image/png;base64,Zm9v","command":"/usr/bin/notes","#,
            r#""executable":"/usr/bin/notes","class":"NotesWin"}}"#,
            "\n",
            r#"{"type":"dock","window":1}"#,
            "\n",
            r#"{"type":"dock","window":1}"#,
            "\n",
            "not json\n",
        );

        sandbox
            .cmd()
            .arg("watch")
            .write_stdin(input)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""ok":true"#))
            .stdout(predicate::str::contains(r#""ok":false"#));

        let scratch = sandbox.root().join("scratch");
        let mut names: Vec<String> = std::fs::read_dir(&scratch)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 3);
        assert!(names[0].ends_with(".desktop"));
        assert!(names[1].ends_with(".png"));
        assert!(names[2].ends_with(".sh"));

        let descriptor = std::fs::read_to_string(scratch.join(&names[0])).unwrap();
        assert!(descriptor.contains("Name=Notes\n"));
        assert!(descriptor.contains(&format!("Icon={}\n", scratch.join(&names[1]).display())));

        // windowless after restart, still pinned
        sandbox
            .cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("docked-without-window"));
    }
}
