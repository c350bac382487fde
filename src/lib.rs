///
/// ## Design
///
/// * one `Machine` value holds every piece of emulated state: RAM, the
///   register file, the call stack, the pixel grid, key flags, timers.
///   no globals, so independent machines can run side by side (and the
///   tests do)
/// * the machine exposes exactly three operations to its host: load a ROM
///   (which resets everything), step one instruction, tick the timers.
///   decode is an exhaustive enum, so an unmatched word is a reportable
///   error instead of a silent fallthrough
/// * two clocks, both owned by the host loop: instructions run at a
///   configurable rate (~700/s by default), timers always at 60Hz. the
///   machine never sleeps and never polls the outside world
/// * the key-wait instruction is the one multi-cycle case; it simply holds
///   the program counter until the host hands it a key, so there is no
///   hidden wait state to serialize or test around
/// * display, input and audio sit behind traits so the terminal
///   implementations can be swapped for dummies in tests (or for a proper
///   windowed front-end later)
///
/// Model
///
/// main
///  |-- machine(rom)
///  |-- display, input, sound
///  `-- run loop
///       |-- keys = input.read_keys();        // quit? break
///       |-- machine.set_keys(keys.down);
///       |-- machine.step();                  // log unknown opcodes, halt on stack faults
///       |-- if machine.draw_flag() { display.draw(machine.display()) }
///       |-- sound.set_active(machine.sound_active());
///       |-- while timer interval elapsed { machine.tick_timers() }
///       `-- spin_sleep until the next instruction slot
pub mod display;
pub mod input;
pub mod machine;
pub mod op;
pub mod sound;
