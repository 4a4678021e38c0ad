//! Seed phrase input.
//!
//! Read once at startup from `FUNDER_MNEMONIC` if set, otherwise from a
//! non-echoed terminal prompt. Piped stdin is read as a single line.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, IsTerminal, Write};
use zeroize::Zeroizing;

use crate::keys::derive::KeyError;

/// Environment variable holding the seed phrase for unattended runs.
pub const MNEMONIC_ENV: &str = "FUNDER_MNEMONIC";

/// Obtain the seed phrase. Blocks on terminal input.
pub fn read_seed_phrase() -> Result<Zeroizing<String>, KeyError> {
    if let Ok(phrase) = std::env::var(MNEMONIC_ENV) {
        tracing::info!(source = MNEMONIC_ENV, "Seed phrase read from environment");
        return Ok(Zeroizing::new(phrase));
    }

    if io::stdin().is_terminal() {
        prompt_hidden("Enter mnemonic: ")
    } else {
        let mut line = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Continue,
    Submit,
    Abort,
}

fn apply_key(input: &mut String, key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Esc => KeyAction::Abort,
        KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Abort
        }
        KeyCode::Char(c) => {
            input.push(c);
            KeyAction::Continue
        }
        KeyCode::Backspace => {
            input.pop();
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn prompt_hidden(prompt: &str) -> Result<Zeroizing<String>, KeyError> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let mut input = Zeroizing::new(String::new());
    {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_key(&mut input, key) {
                    KeyAction::Continue => {}
                    KeyAction::Submit => break,
                    KeyAction::Abort => {
                        return Err(io::Error::new(io::ErrorKind::Interrupted, "input aborted").into());
                    }
                }
            }
        }
    }

    writeln!(stderr)?;
    Ok(input)
}
