use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, ContentArrangement, Table, presets::NOTHING};
use opn2drive::Ym2612;
use opn2drive::bus::RecordingPort;
use opn2drive::chip::RegisterWrite;
use opn2drive::chip::registers::register_name;

use super::apply;
use crate::script::{parse, read_script};

/// Print every register write a script produces, grouped by event.
pub fn trace(script: &Path, show_init: bool) -> Result<()> {
    let text = read_script(script)?;
    let lines =
        parse(&text).with_context(|| format!("failed to parse script: {}", script.display()))?;

    let mut chip = Ym2612::new(RecordingPort::new());
    chip.init().context("failed to initialize the chip")?;

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Line"),
        Cell::new("Event"),
        Cell::new("Result"),
        Cell::new("Port"),
        Cell::new("Addr"),
        Cell::new("Register"),
        Cell::new("Data"),
    ]);

    let init = chip.bus_mut().take();
    if show_init {
        add_rows(&mut table, "-", "init", &format!("{} writes", init.len()), &init);
    }

    for line in &lines {
        let outcome = apply(&mut chip, line.event)?;
        let writes = chip.bus_mut().take();
        add_rows(
            &mut table,
            &line.line.to_string(),
            &line.event.to_string(),
            &outcome.to_string(),
            &writes,
        );
    }

    println!("{table}");
    Ok(())
}

fn add_rows(table: &mut Table, line: &str, event: &str, outcome: &str, writes: &[RegisterWrite]) {
    if writes.is_empty() {
        table.add_row(vec![line, event, outcome, "", "", "", ""]);
        return;
    }
    for (i, write) in writes.iter().enumerate() {
        let (line, event, outcome) = if i == 0 {
            (line, event, outcome)
        } else {
            ("", "", "")
        };
        table.add_row(vec![
            Cell::new(line),
            Cell::new(event),
            Cell::new(outcome),
            Cell::new(write.port),
            Cell::new(format!("0x{:02X}", write.address)),
            Cell::new(register_name(write.address)),
            Cell::new(format!("0x{:02X}", write.data)),
        ]);
    }
}
