//! Machine statistics handler.

use tabled::Tabled;

use ixtwin_core::{MachineStats, Twin};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Tone};

#[derive(Tabled)]
struct MachineRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "CPU %")]
    cpu: String,
    #[tabled(rename = "Memory MB")]
    memory: String,
    #[tabled(rename = "PIDs")]
    pids: String,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn machine_row(m: &MachineStats, color: bool) -> MachineRow {
    let tone = if m.is_running() { Tone::Good } else { Tone::Dim };
    MachineRow {
        name: m.name.clone(),
        status: output::paint(&m.status, tone, color),
        image: m.image.clone(),
        cpu: or_dash(m.cpu_usage_pct.map(|c| format!("{c:.1}"))),
        memory: or_dash(m.memory_usage_mb.map(|mb| format!("{mb:.1}"))),
        pids: or_dash(m.pids),
    }
}

pub async fn handle(twin: &Twin, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let stats = twin.machine_stats().await?;
    let out = output::render_list(
        &global.output,
        &stats,
        |m| machine_row(m, color),
        |m| m.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
