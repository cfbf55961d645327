//! Scaffold command implementation

use anyhow::{Context, Result};
use clap::Args;
use globset::{Glob, GlobSetBuilder};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::output;
use crate::render::write_output;
use crate::scaffold::Scaffold;

#[derive(Args)]
pub struct ScaffoldArgs {
    /// Files, directories or glob patterns to scan
    #[arg(value_name = "INPUT", required_unless_present = "stdin")]
    pub inputs: Vec<String>,

    /// Nest every default under this key (templates then use `PREFIX.name`)
    #[arg(short, long, value_name = "KEY")]
    pub prefix: Option<String>,

    /// Write outputs here instead of next to each input
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Read text from stdin and print the template and defaults to stdout
    #[arg(long, conflicts_with_all = ["inputs", "out_dir"])]
    pub stdin: bool,
}

pub fn run(args: ScaffoldArgs) -> Result<()> {
    let prefix = args.prefix.as_deref();

    if args.stdin {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("Failed reading stdin")?;
        let scaffold = Scaffold::new(&text, prefix)?;
        print!("{}", scaffold.template());
        if !scaffold.template().ends_with('\n') {
            println!();
        }
        println!("---");
        print!("{}", scaffold.defaults_yaml()?);
        return Ok(());
    }

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No input files matched: {}", args.inputs.join(" "));
    }

    let plans = plan(&files, prefix, args.out_dir.as_deref())?;
    if plans.is_empty() {
        tracing::warn!("No `{{name=default}}` parameters found in {} file(s)", files.len());
        return Ok(());
    }
    check_targets(&files, &plans)?;

    for plan in &plans {
        let outcome = write_output(&plan.template, plan.scaffold.template())?;
        output::written(outcome, &plan.template);
        let outcome = write_output(&plan.defaults, &plan.scaffold.defaults_yaml()?)?;
        output::written(outcome, &plan.defaults);
    }
    Ok(())
}

/// One input with parameters and the two files generated from it.
struct Plan {
    input: PathBuf,
    scaffold: Scaffold,
    template: PathBuf,
    defaults: PathBuf,
}

fn plan(files: &[PathBuf], prefix: Option<&str>, out_dir: Option<&Path>) -> Result<Vec<Plan>> {
    let mut plans = Vec::new();
    for file in files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed reading {}", file.display()))?;
        let scaffold =
            Scaffold::new(&text, prefix).with_context(|| format!("In {}", file.display()))?;
        if scaffold.fields().is_empty() {
            tracing::debug!("no parameters in {}, skipping", file.display());
            continue;
        }
        let (template, defaults) = output_paths(file, out_dir);
        plans.push(Plan { input: file.clone(), scaffold, template, defaults });
    }
    Ok(plans)
}

/// Refuse to overwrite an input or to write one target from two inputs.
fn check_targets(files: &[PathBuf], plans: &[Plan]) -> Result<()> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    for plan in plans {
        for target in [&plan.template, &plan.defaults] {
            if let Some(input) = files.iter().find(|f| same_path(f, target)) {
                anyhow::bail!(
                    "Scaffolding {} would overwrite input {}",
                    plan.input.display(),
                    input.display()
                );
            }
            let key = normalize(target);
            if let Some(other) = claimed.insert(key, plan.input.as_path()) {
                anyhow::bail!(
                    "{} and {} both scaffold to {}",
                    other.display(),
                    plan.input.display(),
                    target.display()
                );
            }
        }
    }
    Ok(())
}

fn normalize(path: &Path) -> PathBuf {
    let path = path.strip_prefix(".").unwrap_or(path);
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) if dir.exists() => match dir.canonicalize() {
            Ok(dir) => dir.join(name),
            Err(_) => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a == b || normalize(a) == normalize(b)
}

/// `<stem>.tera` and `<stem>.yaml`, next to the input or under `out_dir`.
///
/// A `.yaml` input would be its own defaults file, so it gets
/// `<stem>.defaults.yaml` instead.
fn output_paths(input: &Path, out_dir: Option<&Path>) -> (PathBuf, PathBuf) {
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("scaffold");
    let template = dir.join(format!("{stem}.tera"));
    let defaults = dir.join(format!("{stem}.yaml"));
    if same_path(&defaults, input) {
        return (template, dir.join(format!("{stem}.defaults.yaml")));
    }
    (template, defaults)
}

/// Files this command writes: templates, `*.defaults.yaml`, and a
/// `<stem>.yaml` next to a `<stem>.tera` when no `<stem>.defaults.yaml`
/// marks the yaml as the scaffolded source.
fn is_generated(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if name.ends_with(".tera") || name.ends_with(".defaults.yaml") {
        return true;
    }
    name.strip_suffix(".yaml").is_some_and(|stem| {
        path.with_file_name(format!("{stem}.tera")).is_file()
            && !path.with_file_name(format!("{stem}.defaults.yaml")).is_file()
    })
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Expand files, directories and glob patterns into a sorted file list.
///
/// Directory walks skip hidden entries and previously generated outputs.
fn collect_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    let mut globs = GlobSetBuilder::new();
    let mut has_globs = false;

    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            files.extend(walk_files(path));
        } else if is_glob(pattern) {
            globs.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {pattern}"))?);
            has_globs = true;
        } else {
            anyhow::bail!("Input not found: {}", pattern);
        }
    }

    if has_globs {
        let set = globs.build()?;
        for file in walk_files(Path::new(".")) {
            let relative = file.strip_prefix(".").unwrap_or(&file);
            if set.is_match(relative) {
                files.insert(relative.to_path_buf());
            }
        }
    }
    Ok(files.into_iter().collect())
}

fn walk_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !is_generated(p))
        .collect()
}
