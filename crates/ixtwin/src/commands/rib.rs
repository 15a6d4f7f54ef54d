//! RIB comparison and capture handlers.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use ixtwin_core::{ComparisonResult, RouteServer, Twin};

use crate::cli::{GlobalOpts, RibArgs, RibCommand};
use crate::commands::util;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::{self, Tone};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "Route Server")]
    name: String,
    #[tabled(rename = "Daemon")]
    kind: String,
    #[tabled(rename = "RIB Command")]
    command: &'static str,
}

fn server_row(rs: &RouteServer) -> ServerRow {
    ServerRow {
        name: rs.name.clone(),
        kind: rs.kind.to_string(),
        command: rs.kind.rib_dump_command(),
    }
}

#[derive(Serialize)]
struct SavedDump {
    route_server: String,
    path: PathBuf,
    bytes: usize,
}

// ── Detail views ────────────────────────────────────────────────────

fn comparison_detail(result: &ComparisonResult, details: bool, color: bool) -> String {
    let mut out = String::new();
    let verdict = if result.is_match() {
        output::paint("RIBs match", Tone::Good, color)
    } else {
        output::paint(
            &format!("{} differences", result.differences_count),
            Tone::Bad,
            color,
        )
    };
    let _ = writeln!(out, "{verdict}");
    let _ = writeln!(out, "Live RIB lines:      {}", result.live_rib_lines);
    let _ = write!(out, "Uploaded RIB lines:  {}", result.uploaded_rib_lines);
    if !result.message.is_empty() {
        let _ = write!(out, "\n{}", result.message);
    }

    if details {
        for (title, lines) in [
            ("Only in live RIB", &result.only_in_live),
            ("Only in uploaded RIB", &result.only_in_uploaded),
        ] {
            if lines.is_empty() {
                continue;
            }
            let _ = write!(out, "\n\n{title} ({}):", lines.len());
            for line in lines {
                let _ = write!(out, "\n  {line}");
            }
        }
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    twin: &Twin,
    args: RibArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        RibCommand::Servers => {
            let servers = twin.rib().load_route_servers().await?;
            if servers.is_empty() {
                output::print_note("No route servers in the topology configuration", global.quiet);
                return Ok(());
            }
            let out = output::render_list(&global.output, servers.as_slice(), server_row, |rs| {
                rs.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RibCommand::Compare {
            server,
            file,
            details,
        } => {
            twin.rib().select_target(server)?;
            twin.rib().select_file(file)?;
            let result =
                util::with_spinner("Comparing RIBs...", global, twin.rib().compare()).await?;
            if details {
                twin.rib().toggle_details();
            }

            let out = output::render_single(
                &global.output,
                result.as_ref(),
                |r| comparison_detail(r, details, color),
                |r| r.differences_count.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RibCommand::Download { server, out_dir } => {
            twin.rib().load_route_servers().await?;
            twin.rib().select_target(server.as_str())?;
            let dump = util::with_spinner(
                "Downloading live RIB...",
                global,
                twin.rib().download_live_rib(),
            )
            .await?;

            let dir = out_dir
                .or_else(|| resolved.download_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&dir)?;
            let path = dir.join(&dump.file_name);
            std::fs::write(&path, dump.contents.as_bytes())?;
            tracing::info!(path = %path.display(), "live RIB saved");

            let saved = SavedDump {
                route_server: server,
                path,
                bytes: dump.contents.len(),
            };
            let out = output::render_single(
                &global.output,
                &saved,
                |s| format!("Saved {} ({} bytes)", s.path.display(), s.bytes),
                |s| s.path.display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ComparisonResult {
        ComparisonResult {
            live_rib_lines: 120,
            uploaded_rib_lines: 118,
            differences_count: 2,
            only_in_live: vec!["10.0.0.0/24".into(), "10.0.1.0/24".into()],
            only_in_uploaded: Vec::new(),
            message: String::new(),
        }
    }

    #[test]
    fn summary_hides_lists_until_expanded() {
        let summary = comparison_detail(&result(), false, false);
        assert!(summary.starts_with("2 differences"));
        assert!(!summary.contains("10.0.0.0/24"));

        let expanded = comparison_detail(&result(), true, false);
        assert!(expanded.contains("Only in live RIB (2):\n  10.0.0.0/24\n  10.0.1.0/24"));
        assert!(!expanded.contains("Only in uploaded RIB"));
    }

    #[test]
    fn matching_ribs_say_so() {
        let same = ComparisonResult {
            differences_count: 0,
            only_in_live: Vec::new(),
            ..result()
        };
        assert!(comparison_detail(&same, true, false).starts_with("RIBs match"));
    }
}
