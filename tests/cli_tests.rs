//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn textconf(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("textconf"));
    cmd.current_dir(dir);
    for var in ["TEXTCONF_SEPARATOR", "TEXTCONF_STRICT", "TEXTCONF_CONTEXT_STYLE", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// `conf/run.yaml` pointing at `conf/run.sh.tera`.
fn project() -> TempDir {
    let tmp = TempDir::new().expect("tmp");
    let conf = tmp.path().join("conf");
    fs::create_dir_all(&conf).expect("mkdir");
    fs::write(
        conf.join("run.yaml"),
        "_template_: run.sh.tera\n\
         model:\n  name: mlp\n  hidden: 64\n\
         train:\n  lr: 0.001\n  epochs: 10\n\
         tag: ${model.name}-h${model.hidden}\n",
    )
    .expect("write");
    fs::write(
        conf.join("run.sh.tera"),
        "python train.py --model {{ model.name }} --lr {{ train.lr | fmt(spec=\".1e\") }} \
         --epochs {{ train.epochs }} --tag {{ tag }}\n",
    )
    .expect("write");
    tmp
}

#[test]
fn test_cli_version() {
    let tmp = TempDir::new().expect("tmp");
    textconf(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("textconf"));
}

#[test]
fn test_cli_help() {
    let tmp = TempDir::new().expect("tmp");
    textconf(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("scaffold"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_render_to_stdout() {
    let tmp = project();
    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml"])
        .assert()
        .success()
        .stdout("python train.py --model mlp --lr 1.0e-03 --epochs 10 --tag mlp-h64\n");
}

#[test]
fn test_render_with_overrides_and_vars() {
    let tmp = project();
    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "-s", "model.hidden=128", "-s", "train.lr=0.01"])
        .args(["--var", "tag=manual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--lr 1.0e-02"))
        .stdout(predicate::str::contains("--tag manual"));
}

#[test]
fn test_render_unknown_override_key() {
    let tmp = project();
    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "-s", "train.seed=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key not found"));

    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "-s", "+train.seed=1"])
        .assert()
        .success();
}

#[test]
fn test_render_flat_context_with_explicit_template() {
    let tmp = project();
    fs::write(tmp.path().join("flat.tera"), "{{ model__name }}/{{ train__epochs }}")
        .expect("write");
    textconf(tmp.path())
        .args(["render", "flat.tera", "-c", "conf/run.yaml", "--flat", "--separator", "__"])
        .assert()
        .success()
        .stdout("mlp/10");
}

#[test]
fn test_render_template_dir_and_subdir() {
    let tmp = project();
    let dir = tmp.path().join("shared").join("templates");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("name.tera"), "{{ model.name | pascal_case }}").expect("write");
    textconf(tmp.path())
        .args(["render", "name.tera", "-c", "conf/run.yaml"])
        .args(["--template-dir", "shared", "--template-subdir", "templates"])
        .assert()
        .success()
        .stdout("Mlp");
}

#[test]
fn test_render_missing_template() {
    let tmp = project();
    textconf(tmp.path())
        .args(["render", "nope.tera", "-c", "conf/run.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template 'nope.tera' not found"));
}

#[test]
fn test_render_missing_value_is_an_error_unless_lenient() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("cfg.yaml"), "dataset: ???\nname: x\n").expect("write");
    fs::write(tmp.path().join("t.tera"), "{{ name }} {{ dataset }}").expect("write");

    textconf(tmp.path())
        .args(["render", "t.tera", "-c", "cfg.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing mandatory value: dataset"));

    textconf(tmp.path())
        .args(["render", "t.tera", "-c", "cfg.yaml", "--lenient"])
        .assert()
        .success()
        .stdout("x ???");
}

#[test]
fn test_render_output_and_check() {
    let tmp = project();
    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "-o", "out/run.sh"])
        .assert()
        .success()
        .stderr(predicate::str::contains("created"));
    let written = fs::read_to_string(tmp.path().join("out").join("run.sh")).expect("read");
    assert!(written.starts_with("python train.py --model mlp"));

    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "-o", "out/run.sh", "--check"])
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));

    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "-s", "train.epochs=20"])
        .args(["-o", "out/run.sh", "--check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("would change"));
    let unchanged = fs::read_to_string(tmp.path().join("out").join("run.sh")).expect("read");
    assert_eq!(unchanged, written);
}

#[test]
fn test_check_requires_output() {
    let tmp = project();
    textconf(tmp.path()).args(["render", "-c", "conf/run.yaml", "--check"]).assert().failure();
}

#[test]
fn test_settings_file_is_discovered() {
    let tmp = project();
    fs::write(
        tmp.path().join("textconf.toml"),
        "[textconf]\ncontext_style = \"flat\"\noutput_dir = \"build\"\n",
    )
    .expect("write");
    fs::write(tmp.path().join("flat.tera"), "{{ model_hidden }}").expect("write");

    textconf(tmp.path())
        .args(["render", "flat.tera", "-c", "conf/run.yaml", "-o", "h.txt"])
        .assert()
        .success();
    let out = fs::read_to_string(tmp.path().join("build").join("h.txt")).expect("read");
    assert_eq!(out, "64");
}

#[test]
fn test_environment_overrides_settings_file() {
    let tmp = project();
    fs::write(tmp.path().join("textconf.toml"), "context_style = \"flat\"\nseparator = \"-\"\n")
        .expect("write");
    fs::write(tmp.path().join("flat.tera"), "{{ model__name }}").expect("write");

    textconf(tmp.path())
        .env("TEXTCONF_SEPARATOR", "__")
        .args(["render", "flat.tera", "-c", "conf/run.yaml"])
        .assert()
        .success()
        .stdout("mlp");
}

#[test]
fn test_explicit_invalid_settings_file_fails() {
    let tmp = project();
    fs::write(tmp.path().join("bad.toml"), "strict = \"maybe\"\n").expect("write");
    textconf(tmp.path())
        .args(["render", "-c", "conf/run.yaml", "--settings", "bad.toml"])
        .assert()
        .failure();
}

#[test]
fn test_show_resolves_interpolations() {
    let tmp = project();
    textconf(tmp.path())
        .args(["show", "-c", "conf/run.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tag: mlp-h64"));

    textconf(tmp.path())
        .args(["show", "-c", "conf/run.yaml", "--no-resolve", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tag\": \"${model.name}-h${model.hidden}\""));
}

#[test]
fn test_show_toml() {
    let tmp = project();
    textconf(tmp.path())
        .args(["show", "-c", "conf/run.yaml", "-f", "toml", "-s", "~_template_"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[train]"))
        .stdout(predicate::str::contains("epochs = 10"));
}

#[test]
fn test_rust_log_is_honored() {
    let tmp = project();
    textconf(tmp.path())
        .args(["show", "-c", "conf/run.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("resolving").not());

    textconf(tmp.path())
        .env("RUST_LOG", "debug")
        .args(["show", "-c", "conf/run.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("resolving ${model.name}"));
}

#[test]
fn test_show_rejects_unknown_format() {
    let tmp = project();
    textconf(tmp.path())
        .args(["show", "-c", "conf/run.yaml", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output format"));
}

#[test]
fn test_scaffold_writes_template_and_defaults() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("job.sh"), "srun -N {nodes=2} train --lr {lr:.1e=3e-4}\n")
        .expect("write");

    textconf(tmp.path()).args(["scaffold", "job.sh", "--prefix", "job"]).assert().success();

    let template = fs::read_to_string(tmp.path().join("job.tera")).expect("template");
    assert_eq!(template, "srun -N {{ job.nodes }} train --lr {{ job.lr | fmt(spec=\".1e\") }}\n");
    let defaults = fs::read_to_string(tmp.path().join("job.yaml")).expect("defaults");
    assert_eq!(defaults, "job:\n  lr: 0.0003\n  nodes: 2\n");

    // The generated pair renders back to the original text.
    fs::write(tmp.path().join("job.yaml"), format!("_template_: job.tera\n{defaults}"))
        .expect("write");
    textconf(tmp.path())
        .args(["render", "-c", "job.yaml"])
        .assert()
        .success()
        .stdout("srun -N 2 train --lr 3.0e-04\n");
}

#[test]
fn test_scaffold_glob_and_out_dir() {
    let tmp = TempDir::new().expect("tmp");
    fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
    fs::write(tmp.path().join("src").join("a.cfg"), "x={x=1}\n").expect("write");
    fs::write(tmp.path().join("src").join("b.cfg"), "plain text\n").expect("write");

    textconf(tmp.path())
        .args(["scaffold", "src/*.cfg", "--out-dir", "gen"])
        .assert()
        .success();
    assert!(tmp.path().join("gen").join("a.tera").is_file());
    assert!(tmp.path().join("gen").join("a.yaml").is_file());
    assert!(!tmp.path().join("gen").join("b.tera").exists());
}

#[test]
fn test_scaffold_yaml_input_is_preserved() {
    let tmp = TempDir::new().expect("tmp");
    let source = "optimizer: adam\nlr: {lr=0.1}\nnote: keep me\n";
    fs::write(tmp.path().join("model.yaml"), source).expect("write");

    textconf(tmp.path()).args(["scaffold", "model.yaml"]).assert().success();

    assert_eq!(fs::read_to_string(tmp.path().join("model.yaml")).expect("read"), source);
    let defaults = fs::read_to_string(tmp.path().join("model.defaults.yaml")).expect("read");
    assert_eq!(defaults, "lr: 0.1\n");
    let template = fs::read_to_string(tmp.path().join("model.tera")).expect("read");
    assert_eq!(template, "optimizer: adam\nlr: {{ lr }}\nnote: keep me\n");

    // Scaffolding the directory again leaves the generated files alone.
    textconf(tmp.path()).args(["scaffold", "."]).assert().success();
    assert_eq!(fs::read_to_string(tmp.path().join("model.yaml")).expect("read"), source);
}

#[test]
fn test_scaffold_shared_stem_fails_without_writing() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("run.sh"), "N={nodes=2}\n").expect("write");
    fs::write(tmp.path().join("run.py"), "lr={lr=0.1}\n").expect("write");

    textconf(tmp.path())
        .args(["scaffold", "run.sh", "run.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("both scaffold to"))
        .stderr(predicate::str::contains("run.sh"))
        .stderr(predicate::str::contains("run.py"));
    assert!(!tmp.path().join("run.tera").exists());
}

#[test]
fn test_scaffold_stdin() {
    let tmp = TempDir::new().expect("tmp");
    textconf(tmp.path())
        .args(["scaffold", "--stdin"])
        .write_stdin("depth={depth=4}")
        .assert()
        .success()
        .stdout("depth={{ depth }}\n---\ndepth: 4\n");
}

#[test]
fn test_scaffold_duplicate_parameter_fails() {
    let tmp = TempDir::new().expect("tmp");
    textconf(tmp.path())
        .args(["scaffold", "--stdin"])
        .write_stdin("{a=1} {a=2}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate parameter name 'a'"));
}

#[test]
fn test_completions() {
    let tmp = TempDir::new().expect("tmp");
    textconf(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("textconf"));
}
