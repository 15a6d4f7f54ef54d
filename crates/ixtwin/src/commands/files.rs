//! Resource file command handlers.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tabled::Tabled;

use ixtwin_core::{CoreError, ResourceFile, Twin, UploadFile};

use crate::cli::{FilesArgs, FilesCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
}

fn file_row(f: &ResourceFile) -> FileRow {
    FileRow {
        name: f.name.clone(),
        kind: f.kind.to_string(),
    }
}

#[derive(Serialize)]
struct DumpEntry {
    name: String,
}

#[derive(Tabled)]
struct DumpRow {
    #[tabled(rename = "RIB Dump")]
    name: String,
}

#[derive(Serialize)]
struct UploadOutcome {
    message: String,
    files: Vec<String>,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(twin: &Twin, args: FilesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FilesCommand::List => {
            let files = twin.catalog().refresh().await?.to_vec();
            let out = output::render_list(&global.output, &files, file_row, |f| f.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FilesCommand::Upload { path } => {
            let file = read_upload(&path, file_name(&path)?)?;
            let names = vec![file.file_name.clone()];
            let message =
                util::with_spinner("Uploading...", global, twin.catalog().upload(file)).await?;
            print_upload(&UploadOutcome { message, files: names }, global);
            Ok(())
        }

        FilesCommand::UploadDir { path } => {
            let files = collect_directory(&path)?;
            let names = files.iter().map(|f| f.file_name.clone()).collect();
            let message = util::with_spinner(
                "Uploading directory...",
                global,
                twin.catalog().upload_directory(files),
            )
            .await?;
            print_upload(&UploadOutcome { message, files: names }, global);
            Ok(())
        }

        FilesCommand::RibDumps => {
            let dumps: Vec<DumpEntry> = twin
                .gateway()
                .list_rib_dumps()
                .await
                .map_err(CoreError::from)?
                .into_iter()
                .map(|name| DumpEntry { name })
                .collect();
            let out = output::render_list(
                &global.output,
                &dumps,
                |d| DumpRow {
                    name: d.name.clone(),
                },
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn print_upload(outcome: &UploadOutcome, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        outcome,
        |o| o.message.clone(),
        |o| o.files.join("\n"),
    );
    output::print_output(&out, global.quiet);
}

// ── Local files ─────────────────────────────────────────────────────

fn file_name(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::Validation {
            field: "path".into(),
            reason: format!("{} has no usable file name", path.display()),
        })
}

fn read_upload(path: &Path, name: String) -> Result<UploadFile, CliError> {
    let contents = std::fs::read(path)?;
    Ok(UploadFile::new(name, contents))
}

/// Every regular file under `root`, named by its path relative to the
/// parent of `root` with `/` separators, sorted by name.
fn collect_directory(root: &Path) -> Result<Vec<UploadFile>, CliError> {
    if !root.is_dir() {
        return Err(CliError::Validation {
            field: "path".into(),
            reason: format!("{} is not a directory", root.display()),
        });
    }
    let top = file_name(root)?;

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    let mut pending = vec![(top, root.to_path_buf())];
    while let Some((prefix, dir)) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let relative = format!("{prefix}/{name}");
            let kind = entry.file_type()?;
            if kind.is_dir() {
                pending.push((relative, entry.path()));
            } else if kind.is_file() {
                found.push((relative, entry.path()));
            }
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    found
        .into_iter()
        .map(|(name, path)| read_upload(&path, name))
        .collect()
}
