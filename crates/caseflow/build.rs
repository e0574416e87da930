use std::fs;
use std::path::Path;

use clap::CommandFactory;

// cli.rs is compiled into the build script as well; it only uses clap and
// clap_complete, both present in [build-dependencies].
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    render_man_tree(&cli::Cli::command(), &man_dir);
}

/// Emit `caseflow.1`, `caseflow-grievances.1`, ... by walking the command
/// tree. Hidden subcommands are skipped.
fn render_man_tree(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut page)
        .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
    let path = dir.join(format!("{name}.1"));
    fs::write(&path, page).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    for sub in cmd.get_subcommands() {
        if sub.is_hide_set() {
            continue;
        }
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        render_man_tree(&sub, dir);
    }
}
