use std::ops::RangeInclusive;

use anyhow::{Result, bail};
use comfy_table::{Cell, ContentArrangement, Table, presets::NOTHING};
use opn2drive::chip::fnumber::{
    MAX_NOTE, OCTAVE_MULTIPLIER, SEMITONE_HZ, encode, fnum_block_to_freq,
};

/// Notes `from..=to` with `to` clamped to the encodable range.
fn note_range(from: u8, to: u8) -> Result<RangeInclusive<u8>> {
    let to = to.min(MAX_NOTE);
    if from > to {
        bail!("empty note range {}..={} (notes go up to {})", from, to, MAX_NOTE);
    }
    Ok(from..=to)
}

/// Print the note to F-number/block table for notes `from..=to`.
///
/// `Chip Hz` is the tone the registers produce at `clock`.
pub fn fnum_table(clock: u32, from: u8, to: u8) -> Result<()> {
    let notes = note_range(from, to)?;

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Note"),
        Cell::new("Table Hz"),
        Cell::new("Block"),
        Cell::new("F-Num"),
        Cell::new("0xA4"),
        Cell::new("0xA0"),
        Cell::new("Chip Hz"),
    ]);

    for note in notes {
        let regs = encode(note)?;
        let table_hz =
            SEMITONE_HZ[(note % 12) as usize] * OCTAVE_MULTIPLIER[(note / 12) as usize];
        let chip_hz = fnum_block_to_freq(regs.fnum(), regs.block(), clock as f64)?;
        table.add_row(vec![
            Cell::new(note),
            Cell::new(format!("{:.2}", table_hz)),
            Cell::new(regs.block()),
            Cell::new(regs.fnum()),
            Cell::new(format!("0x{:02X}", regs.high)),
            Cell::new(format!("0x{:02X}", regs.low)),
            Cell::new(format!("{:.2}", chip_hz)),
        ]);
    }

    println!("{table}");
    Ok(())
}
