//! Integration tests for goscript

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::Path;
use tempfile::TempDir;

/// A goscript command with its cache and config isolated in `temp`
fn goscript(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("goscript");
    cmd.env("GOSCRIPT_CACHE_DIR", temp.path().join("cache"))
        .env("GOSCRIPT_CONFIG", temp.path().join("config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_script(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

mod cli_tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run Go files as scripts"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("goscript"));
    }

    #[test]
    fn missing_input_is_rejected() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("inline code (-c) is required"));
    }

    #[test]
    fn missing_script_is_reported() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .arg(temp.path().join("nope.go"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("reading script").and(predicate::str::contains("nope.go")));
    }

    #[test]
    fn cache_path_follows_env() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached scripts"));
    }

    #[test]
    fn cache_list_json_empty() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn cache_gc_dry_run_on_empty_cache() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .args(["cache", "gc", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Dry run"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[build]"));
    }

    #[test]
    fn config_path_follows_env() {
        let temp = TempDir::new().unwrap();
        goscript(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_writes_defaults() {
        let temp = TempDir::new().unwrap();
        goscript(&temp).args(["config", "init"]).assert().success();

        let written = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(written.contains("gc_days = 30"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[cache\n").unwrap();

        goscript(&temp)
            .args(["cache", "path"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid configuration"));
    }
}

/// Runs against the real Go toolchain; skipped when `go` is not installed
mod go_tests {
    use super::*;
    use predicates::prelude::*;

    fn have_go() -> bool {
        which::which("go").is_ok()
    }

    const HELLO: &str = "#!/usr/bin/env goscript\npackage main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"ok\")\n}\n";

    #[test]
    fn runs_a_script() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "hello.go", HELLO);

        goscript(&temp)
            .arg(&script)
            .assert()
            .success()
            .stdout("ok\n");
    }

    #[test]
    fn forwards_arguments() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let script = write_script(
            temp.path(),
            "args.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc main() {\n\tfmt.Println(os.Args[1:])\n}\n",
        );

        goscript(&temp)
            .arg(&script)
            .args(["a", "-v", "--flag"])
            .assert()
            .success()
            .stdout("[a -v --flag]\n");
    }

    #[test]
    fn forwards_exit_code() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let script = write_script(
            temp.path(),
            "exit.go",
            "package main\n\nimport \"os\"\n\nfunc main() {\n\tos.Exit(3)\n}\n",
        );

        goscript(&temp).arg(&script).assert().code(3);
    }

    #[test]
    fn compile_error_keeps_line_numbers() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let script = write_script(
            temp.path(),
            "broken.go",
            "#!/usr/bin/env goscript\npackage main\nfunc main() { undefinedCall() }\n",
        );

        goscript(&temp)
            .arg(&script)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("main.go:3"));

        assert!(!temp.path().join("cache").join("bin").exists()
            || std::fs::read_dir(temp.path().join("cache").join("bin"))
                .unwrap()
                .flatten()
                .all(|dir| !dir.path().join("app").exists()));
    }

    #[test]
    fn second_run_uses_the_cache() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "hello.go", HELLO);

        goscript(&temp).arg(&script).assert().success();

        goscript(&temp)
            .env("RUST_LOG", "goscript=debug")
            .arg(&script)
            .assert()
            .success()
            .stdout("ok\n")
            .stderr(predicate::str::contains("Cache hit"));

        goscript(&temp)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::is_match("^[0-9a-f]{64}\n$").unwrap());
    }

    #[test]
    fn builds_to_output_path() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "hello.go", HELLO);
        let out = temp.path().join("hello-bin");

        goscript(&temp)
            .arg("-o")
            .arg(&out)
            .arg(&script)
            .assert()
            .success()
            .stdout(predicate::str::contains("Compiled into"));

        Command::new(&out).assert().success().stdout("ok\n");
    }

    #[test]
    fn runs_inline_code() {
        if !have_go() {
            return;
        }
        let temp = TempDir::new().unwrap();

        goscript(&temp)
            .args(["-c", "println(\"inline\")"])
            .assert()
            .success()
            .stderr(predicate::str::contains("inline"));
    }
}
