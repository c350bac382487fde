use beep::beep;
use std::error::Error;

/// the host mirrors the machine's sound timer into here once per loop
/// iteration; implementations only touch the hardware on a state change
pub trait Sound {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// single fixed tone on the PC speaker
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn Error>> {
        if on == self.is_beeping {
            return Ok(());
        }
        beep(if on { SIMPLEBEEP_PITCH } else { 0 })?;
        self.is_beeping = on;
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.is_beeping {
            let _ = beep(0);
        }
    }
}

pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn set_active(&mut self, _on: bool) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
