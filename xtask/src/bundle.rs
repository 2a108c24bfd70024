//! `bundle`: build the web shell.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context};

/// Run `dx build` in the web shell crate.
pub fn run(release: bool) -> anyhow::Result<()> {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("crates")
        .join("vision-ui");

    let mut cmd = Command::new("dx");
    let _ = cmd.current_dir(&crate_dir).args(["build", "--platform", "web"]);
    if release {
        let _ = cmd.arg("--release");
    }
    log::info!("running {cmd:?} in {}", crate_dir.display());

    let status = cmd
        .status()
        .context("failed to run `dx`; install it with `cargo install dioxus-cli`")?;
    if !status.success() {
        bail!("dx build exited with {status}");
    }
    log::info!("bundle written to {}", crate_dir.join("dist").display());
    Ok(())
}
