//! Developer tasks for the geowkb workspace.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

const CLIPPY_CORE_AND_GEO: &[&str] = &[
    "clippy", "-p", "geowkb-core", "-p", "geowkb-geo", "--all-targets", "--", "-D", "warnings",
];
const CLIPPY_RAYON: &[&str] = &[
    "clippy", "-p", "geowkb-core", "--features", "rayon", "--all-targets", "--", "-D", "warnings",
];

/// Cargo invocations run by `precommit`, in order.
const QUICK: &[&[&str]] = &[
    &["fmt", "--all", "--", "--check"],
    CLIPPY_CORE_AND_GEO,
    &["test", "--workspace"],
];

/// Extra invocations for `precommit --full`: the parallel batch drivers.
const FULL: &[&[&str]] = &[CLIPPY_RAYON, &["test", "-p", "geowkb-core", "--features", "rayon"]];

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let outcome = match args.as_slice() {
        ["precommit"] => precommit(false),
        ["precommit", "--full"] => precommit(true),
        ["install-hooks"] => install_hooks(),
        _ => {
            eprintln!("usage: cargo run -p xtask -- precommit [--full] | install-hooks");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn workspace_root() -> PathBuf {
    // xtask/ sits directly under the workspace root.
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn precommit(full: bool) -> Result<(), String> {
    let root = workspace_root();
    let extra: &[&[&str]] = if full { FULL } else { &[] };
    QUICK
        .iter()
        .chain(extra)
        .try_for_each(|args| cargo(&root, args))
}

fn cargo(root: &Path, args: &[&str]) -> Result<(), String> {
    let line = format!("cargo {}", args.join(" "));
    eprintln!("+ {line}");
    let status = Command::new(env::var("CARGO").unwrap_or_else(|_| "cargo".into()))
        .args(args)
        .current_dir(root)
        .status()
        .map_err(|e| format!("{line}: {e}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{line} exited with {status}"))
    }
}

fn install_hooks() -> Result<(), String> {
    let root = workspace_root();
    let hooks = root.join(".git").join("hooks");
    if !hooks.is_dir() {
        return Err(format!("{} is not a git checkout", root.display()));
    }

    let hook = hooks.join("pre-commit");
    let script = "#!/usr/bin/env sh\nset -eu\ncargo run --quiet -p xtask -- precommit\n";
    fs::write(&hook, script).map_err(|e| format!("{}: {e}", hook.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755))
            .map_err(|e| format!("{}: {e}", hook.display()))?;
    }

    println!("pre-commit hook written to {}", hook.display());
    Ok(())
}
