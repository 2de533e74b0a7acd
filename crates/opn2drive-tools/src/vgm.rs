use std::fs::File;
use std::io::{Write, stdout};
use std::path::Path;

use anyhow::Context;
use flate2::Compression;
use flate2::write::GzEncoder;
use opn2drive::bus::RegisterPort;
use opn2drive::chip::{Port, RegisterWrite};
use opn2drive::chip::fnumber::DEFAULT_MASTER_CLOCK_HZ;
use opn2drive::error::BusError;

/// Header size of a VGM 1.50 file. Commands start right after it.
const HEADER_SIZE: usize = 0x40;
const VERSION: u32 = 0x0000_0150;

const CMD_YM2612_PORT0: u8 = 0x52;
const CMD_YM2612_PORT1: u8 = 0x53;
const CMD_WAIT: u8 = 0x61;
const CMD_END: u8 = 0x66;

pub const DEFAULT_CLOCK: u32 = DEFAULT_MASTER_CLOCK_HZ as u32;

/// Register port that appends every write to a VGM command stream.
///
/// Waits are added with `wait`; `finish` prepends the header.
#[derive(Debug, Clone)]
pub struct VgmWriter {
    clock: u32,
    commands: Vec<u8>,
    total_samples: u32,
    writes: usize,
}

impl VgmWriter {
    pub fn new(clock: u32) -> Self {
        Self {
            clock,
            commands: Vec::new(),
            total_samples: 0,
            writes: 0,
        }
    }

    /// Advance by `samples` 44.1 kHz samples.
    pub fn wait(&mut self, samples: u32) {
        let mut remaining = samples;
        while remaining > 0 {
            let chunk = remaining.min(u16::MAX as u32) as u16;
            self.commands.push(CMD_WAIT);
            self.commands.extend_from_slice(&chunk.to_le_bytes());
            remaining -= chunk as u32;
        }
        self.total_samples = self.total_samples.saturating_add(samples);
    }

    /// Register writes appended so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Terminate the stream and return the complete file.
    pub fn finish(mut self) -> Vec<u8> {
        self.commands.push(CMD_END);

        let mut out = vec![0u8; HEADER_SIZE];
        let eof_offset = (HEADER_SIZE + self.commands.len() - 0x04) as u32;
        let data_offset = (HEADER_SIZE - 0x34) as u32;
        out[0x00..0x04].copy_from_slice(b"Vgm ");
        out[0x04..0x08].copy_from_slice(&eof_offset.to_le_bytes());
        out[0x08..0x0C].copy_from_slice(&VERSION.to_le_bytes());
        out[0x18..0x1C].copy_from_slice(&self.total_samples.to_le_bytes());
        out[0x2C..0x30].copy_from_slice(&self.clock.to_le_bytes());
        out[0x34..0x38].copy_from_slice(&data_offset.to_le_bytes());
        out.extend_from_slice(&self.commands);
        out
    }
}

impl RegisterPort for VgmWriter {
    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError> {
        let command = match write.port {
            Port::Zero => CMD_YM2612_PORT0,
            Port::One => CMD_YM2612_PORT1,
        };
        self.commands
            .extend_from_slice(&[command, write.address, write.data]);
        self.writes += 1;
        Ok(())
    }
}

/// Write `bytes` to a path (or stdout for `-`), gzipped when `gzip` is set
/// or the path ends in `.vgz`.
pub fn write_vgm(path: &Path, bytes: &[u8], gzip: bool) -> anyhow::Result<()> {
    let is_vgz = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("vgz"))
        .unwrap_or(false);

    let out: Box<dyn Write> = if path == Path::new("-") {
        Box::new(stdout().lock())
    } else {
        Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output file: {}", path.display()))?,
        )
    };

    if gzip || is_vgz {
        let mut encoder = GzEncoder::new(out, Compression::default());
        encoder
            .write_all(bytes)
            .context("failed to write compressed output")?;
        encoder
            .finish()
            .context("failed to finish gzip stream")?
            .flush()
            .context("failed to flush output")?;
    } else {
        let mut out = out;
        out.write_all(bytes).context("failed to write output")?;
        out.flush().context("failed to flush output")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_fields() {
        let mut vgm = VgmWriter::new(DEFAULT_CLOCK);
        vgm.write(RegisterWrite::global(0x28, 0xF0)).unwrap();
        vgm.wait(100);
        let bytes = vgm.finish();

        assert_eq!(&bytes[0..4], b"Vgm ");
        assert_eq!(u32_at(&bytes, 0x04) as usize, bytes.len() - 4);
        assert_eq!(u32_at(&bytes, 0x08), 0x150);
        assert_eq!(u32_at(&bytes, 0x18), 100);
        assert_eq!(u32_at(&bytes, 0x2C), 7_670_454);
        assert_eq!(0x34 + u32_at(&bytes, 0x34) as usize, HEADER_SIZE);
        assert_eq!(
            &bytes[HEADER_SIZE..],
            &[0x52, 0x28, 0xF0, 0x61, 100, 0, 0x66]
        );
    }

    #[test]
    fn test_port_one_command() {
        let mut vgm = VgmWriter::new(DEFAULT_CLOCK);
        vgm.write(RegisterWrite::new(0xA4, 0x11, Port::One)).unwrap();
        assert_eq!(vgm.writes(), 1);
        let bytes = vgm.finish();
        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 3], &[0x53, 0xA4, 0x11]);
    }

    #[test]
    fn test_long_wait_is_split() {
        let mut vgm = VgmWriter::new(DEFAULT_CLOCK);
        vgm.wait(70_000);
        vgm.wait(0);
        let bytes = vgm.finish();
        assert_eq!(u32_at(&bytes, 0x18), 70_000);
        assert_eq!(
            &bytes[HEADER_SIZE..],
            &[0x61, 0xFF, 0xFF, 0x61, 0x71, 0x11, 0x66]
        );
    }
}
