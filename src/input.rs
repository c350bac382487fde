use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::io;
use std::time::{Duration, Instant};

use crate::machine::KEY_COUNT;

/// hex keypad laid out on the left-hand side of a qwerty keyboard,
/// where '1' => 0x01 and 'v' => 0x0f
const QWERTY_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report key *presses*, so a pressed key is considered held
/// for this long before it reads as released again
const KEY_SUSTAIN: Duration = Duration::from_millis(150);

/// what the host learns from the keyboard on each loop iteration
#[derive(Debug, Default, Clone, Copy)]
pub struct Keys {
    /// key-down flag per hex key, ready to hand to the machine
    pub down: [bool; KEY_COUNT],
    /// the user asked to leave (Esc or ctrl-c)
    pub quit: bool,
}

/// reads keypresses
pub trait Input {
    /// drain pending keyboard events and report the current key state
    fn read_keys(&mut self) -> Result<Keys, io::Error>;
}

/// level-triggered key state synthesized from terminal key events
struct Keypad {
    /// per key, the instant its current press stops counting as held
    held_until: [Option<Instant>; KEY_COUNT],
}

impl Keypad {
    fn new() -> Self {
        Keypad {
            held_until: [None; KEY_COUNT],
        }
    }

    fn press(&mut self, key: u8, now: Instant) {
        self.held_until[key as usize] = Some(now + KEY_SUSTAIN);
    }

    fn snapshot(&self, now: Instant) -> [bool; KEY_COUNT] {
        let mut down = [false; KEY_COUNT];
        for (flag, deadline) in down.iter_mut().zip(self.held_until.iter()) {
            *flag = matches!(deadline, Some(until) if *until > now);
        }
        down
    }
}

fn map_key(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    QWERTY_KEYMAP
        .iter()
        .find(|(mapped, _)| *mapped == key)
        .map(|&(_, code)| code)
}

/// simple implementation of Input, reading crossterm events from the
/// terminal it puts into raw mode
pub struct TermInput {
    keypad: Keypad,
    quit: bool,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keypad: Keypad::new(),
            quit: false,
        })
    }

    fn drain_events(&mut self, now: Instant) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true;
                    }
                    KeyCode::Char(key) => match map_key(key) {
                        Some(code) => self.keypad.press(code, now),
                        None => {
                            eprintln!("Warning: can't map {:?} to a keypad key", key);
                        }
                    },
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn read_keys(&mut self) -> Result<Keys, io::Error> {
        let now = Instant::now();
        self.drain_events(now)?;
        Ok(Keys {
            down: self.keypad.snapshot(now),
            quit: self.quit,
        })
    }
}

/// scripted Input implementation for testing: reports a fixed key state,
/// then quit after a set number of reads
pub struct DummyInput {
    down: [bool; KEY_COUNT],
    reads_before_quit: usize,
}

impl DummyInput {
    pub fn new(down: [bool; KEY_COUNT], reads_before_quit: usize) -> Self {
        DummyInput {
            down,
            reads_before_quit,
        }
    }
}

impl Input for DummyInput {
    fn read_keys(&mut self) -> Result<Keys, io::Error> {
        if self.reads_before_quit == 0 {
            return Ok(Keys {
                down: self.down,
                quit: true,
            });
        }
        self.reads_before_quit -= 1;
        Ok(Keys {
            down: self.down,
            quit: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_every_key_once() {
        for code in 0..KEY_COUNT as u8 {
            assert_eq!(
                QWERTY_KEYMAP.iter().filter(|&&(_, c)| c == code).count(),
                1
            );
        }
    }

    #[test]
    fn test_map_key_is_case_insensitive() {
        assert_eq!(map_key('q'), Some(0x04));
        assert_eq!(map_key('Q'), Some(0x04));
        assert_eq!(map_key('7'), None);
    }

    #[test]
    fn test_press_reads_as_held_until_sustain_expires() {
        let mut keypad = Keypad::new();
        let now = Instant::now();
        keypad.press(0x04, now);
        assert!(keypad.snapshot(now)[0x04]);
        assert!(keypad.snapshot(now + KEY_SUSTAIN / 2)[0x04]);
        assert!(!keypad.snapshot(now + KEY_SUSTAIN)[0x04]);
    }

    #[test]
    fn test_repeat_press_extends_the_hold() {
        let mut keypad = Keypad::new();
        let now = Instant::now();
        keypad.press(0x0F, now);
        keypad.press(0x0F, now + KEY_SUSTAIN / 2);
        assert!(keypad.snapshot(now + KEY_SUSTAIN)[0x0F]);
    }

    #[test]
    fn test_dummy_input_quits_after_scripted_reads() {
        let mut input = DummyInput::new([false; KEY_COUNT], 2);
        assert!(!input.read_keys().unwrap().quit);
        assert!(!input.read_keys().unwrap().quit);
        assert!(input.read_keys().unwrap().quit);
    }
}
