//! Console commands for the headless client.
//!
//! Lines typed on stdin stand in for a real input device:
//!
//! ```text
//! +w / -w        press / release a key
//! fire / cease   hold / release the primary button
//! aim <x> <y>    move the pointer
//! status         print client status
//! quit           exit
//! ```

use anyhow::{bail, Context};

use crate::input::{InputEvent, PointerButton};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(InputEvent),
    Status,
    Quit,
}

/// Parses one console line. Empty lines yield `None`.
pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match head {
        "fire" => Command::Input(InputEvent::PointerDown(PointerButton::Primary)),
        "cease" => Command::Input(InputEvent::PointerUp(PointerButton::Primary)),
        "aim" => {
            if tokens.len() != 3 {
                bail!("Usage: aim <x> <y>");
            }
            let x = tokens[1].parse::<f32>().context("parse x")?;
            let y = tokens[2].parse::<f32>().context("parse y")?;
            Command::Input(InputEvent::PointerMove { x, y })
        }
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        _ => {
            if let Some(key) = head.strip_prefix('+').filter(|k| !k.is_empty()) {
                Command::Input(InputEvent::KeyDown(key.to_string()))
            } else if let Some(key) = head.strip_prefix('-').filter(|k| !k.is_empty()) {
                Command::Input(InputEvent::KeyUp(key.to_string()))
            } else {
                bail!("Unknown command: {head}");
            }
        }
    };
    Ok(Some(cmd))
}
