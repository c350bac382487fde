use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use okto::display::{Display, TermDisplay};
use okto::input::{Input, TermInput};
use okto::machine::{Machine, MachineError, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use okto::sound::{Mute, SimpleBeep, Sound};

/// CHIP-8 for the terminal
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// ROM image, loaded at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = 700, value_parser = clap::value_parser!(u32).range(1..))]
    hz: u32,

    /// leave the PC speaker alone
    #[arg(long)]
    mute: bool,
}

/// timers always count at 60Hz, whatever the instruction rate
const TIMER_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let rom = fs::read(&args.rom)
        .with_context(|| format!("reading ROM {}", args.rom.display()))?;

    let mut machine = Machine::new();
    machine.load(&rom)?;

    let mut input = TermInput::new()?;
    let mut display = TermDisplay::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    run(
        &mut machine,
        &mut display,
        &mut input,
        sound.as_mut(),
        Duration::from_secs(1) / args.hz,
    )
}

/// The host loop: keys in, one step, frame out, bell, timers, pacing.
/// Unknown opcodes are logged and skipped; stack faults end the run.
fn run(
    machine: &mut Machine,
    display: &mut impl Display,
    input: &mut impl Input,
    sound: &mut dyn Sound,
    step_interval: Duration,
) -> anyhow::Result<()> {
    let mut next_tick = Instant::now() + TIMER_INTERVAL;
    let mut next_step = Instant::now();

    loop {
        let keys = input.read_keys()?;
        if keys.quit {
            return Ok(());
        }
        machine.set_keys(keys.down);

        match machine.step() {
            Ok(()) => {}
            Err(err @ MachineError::UnknownOpcode { .. }) => {
                eprintln!("Warning: {}", err);
            }
            Err(err) => return Err(err).context("emulation halted"),
        }

        if machine.draw_flag() {
            display.draw(machine.display())?;
            machine.clear_draw_flag();
        }

        if let Err(err) = sound.set_active(machine.sound_active()) {
            eprintln!("Warning: can't drive the speaker: {}", err);
        }

        // the timer clock is decoupled from the step clock; catch up on
        // however many 60Hz intervals have passed
        let now = Instant::now();
        while next_tick <= now {
            machine.tick_timers();
            next_tick += TIMER_INTERVAL;
        }

        next_step += step_interval;
        let now = Instant::now();
        if next_step > now {
            spin_sleep::sleep(next_step - now);
        } else {
            // fell behind; restart the schedule rather than bursting
            next_step = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okto::display::DummyDisplay;
    use okto::input::DummyInput;
    use okto::machine::KEY_COUNT;

    #[test]
    fn test_run_presents_frames_and_stops_on_quit() {
        let mut machine = Machine::new();
        // clear the screen, jump back, forever
        machine.load(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new([false; KEY_COUNT], 10);
        let mut sound = Mute::new();

        run(
            &mut machine,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        )
        .unwrap();
        assert!(display.frames >= 1);
    }

    #[test]
    fn test_run_hands_key_state_to_the_machine() {
        let mut machine = Machine::new();
        // wait for a key, copy it into the sound timer, then spin
        machine
            .load(&[0xF0, 0x0A, 0xF0, 0x18, 0x12, 0x04])
            .unwrap();
        let mut keys = [false; KEY_COUNT];
        keys[0xF] = true;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(keys, 3);
        let mut sound = Mute::new();

        run(
            &mut machine,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        )
        .unwrap();
        assert!(machine.sound_active());
    }

    #[test]
    fn test_run_halts_on_a_stack_fault() {
        let mut machine = Machine::new();
        machine.load(&[0x00, 0xEE]).unwrap();
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new([false; KEY_COUNT], 10);
        let mut sound = Mute::new();

        let err = run(
            &mut machine,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<MachineError>(),
            Some(&MachineError::StackUnderflow { addr: 0x200 })
        );
    }
}
