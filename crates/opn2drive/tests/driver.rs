use opn2drive::bus::{RecordingPort, RegisterPort};
use opn2drive::chip::{Port, RegisterWrite};
use opn2drive::voice::ChannelIndex;
use opn2drive::{BusError, DriverError, VoiceError, Ym2612};

fn chip() -> Ym2612<RecordingPort> {
    let mut chip = Ym2612::new(RecordingPort::new());
    chip.init().unwrap();
    chip.bus_mut().clear();
    chip
}

#[test]
fn test_round_trip_write_sequence() {
    let mut chip = chip();

    let index = chip.key_on(60, 100).unwrap();
    assert_eq!(index.get(), 0);
    assert_eq!(index.port(), Port::Zero);
    assert_eq!(index.offset(), 0);
    assert_eq!(index.key_offset(), 0);

    let mut expected = vec![
        RegisterWrite::new(0xA4, 0x11, Port::Zero),
        RegisterWrite::new(0xA0, 0x15, Port::Zero),
    ];
    for port in Port::ALL {
        for slot in 0..3 {
            expected.push(RegisterWrite::new(0x4C + slot, 0x00, port));
        }
    }
    expected.push(RegisterWrite::global(0x28, 0xF0));
    assert_eq!(chip.bus_mut().take(), expected);

    assert_eq!(chip.key_off(60).unwrap(), index);
    assert_eq!(
        chip.bus().writes(),
        &[RegisterWrite::global(0x28, 0x00)]
    );
    assert!(chip.channels().iter().all(|c| !c.is_active()));
}

#[test]
fn test_exhaustion() {
    let mut chip = chip();
    for (i, note) in [60, 62, 64, 65, 67, 69].into_iter().enumerate() {
        assert_eq!(chip.key_on(note, 100).unwrap().get(), i as u8);
    }
    let channels = chip.channels().clone();
    chip.bus_mut().clear();

    assert_eq!(
        chip.key_on(71, 100),
        Err(DriverError::Voice(VoiceError::ChannelsExhausted { note: 71 }))
    );
    assert!(chip.bus().writes().is_empty());
    assert_eq!(chip.channels(), &channels);
}

#[test]
fn test_key_on_order_across_ports() {
    let mut chip = chip();
    let mut keyed = Vec::new();
    for note in 40..46 {
        chip.key_on(note, 100).unwrap();
        let key_on = chip.bus_mut().take().pop().unwrap();
        assert_eq!(key_on.address, 0x28);
        assert_eq!(key_on.port, Port::Zero);
        keyed.push(key_on.data);
    }
    assert_eq!(keyed, vec![0xF0, 0xF1, 0xF2, 0xF4, 0xF5, 0xF6]);
}

#[test]
fn test_frequency_written_to_voice_port() {
    let mut chip = chip();
    for note in 60..64 {
        chip.key_on(note, 100).unwrap();
    }
    chip.bus_mut().clear();

    // voice 4: port 1, slot 1
    let index = chip.key_on(100, 100).unwrap();
    assert_eq!(index.get(), 4);
    let writes = chip.bus().writes();
    assert_eq!(writes[0], RegisterWrite::new(0xA5, 0x1D, Port::One));
    assert_eq!(writes[1], RegisterWrite::new(0xA1, 0x74, Port::One));
    assert_eq!(writes.last(), Some(&RegisterWrite::global(0x28, 0xF5)));
}

#[test]
fn test_reuse_of_freed_slot() {
    let mut chip = chip();
    for note in [60, 62, 64, 65] {
        chip.key_on(note, 100).unwrap();
    }
    let released = chip.key_off(64).unwrap();
    assert_eq!(released.get(), 2);

    let index = chip.key_on(72, 90).unwrap();
    assert_eq!(index.get(), 2);
    let channel = chip.allocator().channel(index);
    assert_eq!(channel.note(), Some(72));
    assert_eq!(channel.velocity(), Some(90));
}

#[test]
fn test_key_off_unknown_note_writes_nothing() {
    let mut chip = chip();
    chip.key_on(60, 100).unwrap();
    chip.bus_mut().clear();

    assert_eq!(
        chip.key_off(61),
        Err(DriverError::Voice(VoiceError::NoteNotActive { note: 61 }))
    );
    assert!(chip.bus().writes().is_empty());
    assert_eq!(chip.allocator().active_count(), 1);

    chip.key_off(60).unwrap();
    assert_eq!(
        chip.key_off(60).err().and_then(|e| e.voice()),
        Some(VoiceError::NoteNotActive { note: 60 })
    );
}

#[test]
fn test_out_of_range_note_writes_nothing() {
    let mut chip = chip();
    assert_eq!(
        chip.key_on(140, 100),
        Err(DriverError::Voice(VoiceError::NoteOutOfRange { note: 140 }))
    );
    assert!(chip.bus().writes().is_empty());
    assert_eq!(chip.allocator().active_count(), 0);
}

/// Port that fails after a fixed number of writes.
struct FailingPort {
    inner: RecordingPort,
    remaining: usize,
}

impl RegisterPort for FailingPort {
    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError> {
        if self.remaining == 0 {
            return Err(BusError::DataBus);
        }
        self.remaining -= 1;
        self.inner.write(write)
    }
}

#[test]
fn test_bus_failure_rolls_back_allocation() {
    let mut chip = Ym2612::new(FailingPort {
        inner: RecordingPort::new(),
        remaining: usize::MAX,
    });
    chip.init().unwrap();
    chip.bus_mut().inner.clear();
    // frequency writes succeed, the first velocity write fails
    chip.bus_mut().remaining = 2;

    assert_eq!(
        chip.key_on(60, 100),
        Err(DriverError::Bus(BusError::DataBus))
    );
    assert_eq!(chip.allocator().active_count(), 0);
    assert_eq!(chip.bus().inner.writes().len(), 2);

    chip.bus_mut().remaining = usize::MAX;
    assert_eq!(chip.key_on(60, 100).unwrap(), ChannelIndex::new(0).unwrap());
}

#[test]
fn test_key_off_bus_failure_keeps_voice_tracked() {
    let mut chip = Ym2612::new(FailingPort {
        inner: RecordingPort::new(),
        remaining: usize::MAX,
    });
    chip.init().unwrap();
    let index = chip.key_on(60, 100).unwrap();
    chip.bus_mut().inner.clear();
    chip.bus_mut().remaining = 0;

    assert_eq!(chip.key_off(60), Err(DriverError::Bus(BusError::DataBus)));
    assert_eq!(chip.allocator().active_count(), 1);
    assert_eq!(chip.allocator().find(60), Some(index));

    // the key-off can be retried once the bus recovers
    chip.bus_mut().remaining = usize::MAX;
    assert_eq!(chip.key_off(60), Ok(index));
    assert_eq!(
        chip.bus().inner.writes(),
        &[RegisterWrite::global(0x28, 0x00)]
    );
    assert_eq!(chip.allocator().active_count(), 0);
}

#[test]
fn test_all_notes_off_bus_failure_keeps_unsilenced_voices() {
    let mut chip = Ym2612::new(FailingPort {
        inner: RecordingPort::new(),
        remaining: usize::MAX,
    });
    chip.init().unwrap();
    for note in [60, 64, 67] {
        chip.key_on(note, 100).unwrap();
    }
    chip.bus_mut().inner.clear();
    chip.bus_mut().remaining = 1;

    assert_eq!(chip.all_notes_off(), Err(BusError::DataBus));
    assert_eq!(chip.bus().inner.writes().len(), 1);
    assert_eq!(chip.allocator().find(60), None);
    assert_eq!(chip.allocator().active_count(), 2);

    chip.bus_mut().remaining = usize::MAX;
    assert_eq!(chip.all_notes_off(), Ok(2));
    let data: Vec<u8> = chip.bus().inner.writes().iter().map(|w| w.data).collect();
    assert_eq!(data, vec![0x00, 0x01, 0x02]);
    assert_eq!(chip.allocator().active_count(), 0);
}

#[test]
fn test_driver_over_borrowed_port() {
    let mut port = RecordingPort::new();
    {
        let mut chip = Ym2612::new(&mut port);
        chip.init().unwrap();
        chip.key_on(60, 100).unwrap();
    }
    assert_eq!(port.resets(), 1);
    assert_eq!(
        port.writes().last(),
        Some(&RegisterWrite::global(0x28, 0xF0))
    );
}
