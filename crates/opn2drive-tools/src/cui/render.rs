use std::path::Path;

use anyhow::{Context, Result};
use opn2drive::Ym2612;

use super::{Outcome, apply};
use crate::script::{parse, read_script, total_samples};
use crate::vgm::{VgmWriter, write_vgm};

/// Run a note script through the driver and write the register stream as
/// a VGM file.
///
/// Notes still sounding at the end of the script are keyed off so the file
/// ends silent.
pub fn render(script: &Path, output: &Path, gzip: bool, clock: u32) -> Result<()> {
    let text = read_script(script)?;
    let lines =
        parse(&text).with_context(|| format!("failed to parse script: {}", script.display()))?;

    let mut chip = Ym2612::new(VgmWriter::new(clock));
    chip.init().context("failed to initialize the chip")?;

    let mut rejected = 0;
    for line in &lines {
        match apply(&mut chip, line.event)? {
            Outcome::Waited(samples) => chip.bus_mut().wait(samples),
            Outcome::Rejected(_) => rejected += 1,
            _ => {}
        }
    }
    let hanging = chip.all_notes_off()?;
    if hanging > 0 {
        tracing::debug!("released {} notes left sounding", hanging);
    }

    let writer = chip.into_inner();
    let writes = writer.writes();
    let samples = total_samples(&lines);
    write_vgm(output, &writer.finish(), gzip)?;

    tracing::info!(
        "{} events, {} rejected, {} register writes, {} samples",
        lines.len(),
        rejected,
        writes,
        samples
    );
    if output != Path::new("-") {
        println!(
            "{}: {} register writes, {:.2} s",
            output.display(),
            writes,
            samples as f64 / 44_100.0
        );
    }
    Ok(())
}
