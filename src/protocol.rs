//! Serial protocol: single-byte commands in, JSONL frames out
//!
//! Frames are one JSON object per line with a fixed field order; the
//! host bridge splits on newlines and forwards each object verbatim, so
//! the encoding here is the wire contract.

use core::fmt::Write;

use heapless::String;

use crate::events::{Command, GameEvent};

/// Upper bound for a single frame; the longest pop_result line is
/// well under this
pub const MAX_FRAME_LEN: usize = 160;

pub type Frame = String<MAX_FRAME_LEN>;

/// A decoded host command byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerialCommand {
    /// Toggle pause; routed straight to the pause controller
    Pause,
    /// Queued for the game task
    Game(Command),
    /// Handshake request; flushes the offline buffer
    Identify,
    /// Cooperative offline hint from the host
    Disconnect,
}

/// Decode one command byte. Unknown bytes are ignored.
pub fn parse_command_byte(byte: u8) -> Option<SerialCommand> {
    match byte {
        b'P' => Some(SerialCommand::Pause),
        b'R' => Some(SerialCommand::Game(Command::Reset)),
        b'S' => Some(SerialCommand::Game(Command::Start)),
        b'1'..=b'8' => Some(SerialCommand::Game(Command::SetLevel(byte - b'0'))),
        b'I' => Some(SerialCommand::Identify),
        b'D' => Some(SerialCommand::Disconnect),
        _ => None,
    }
}

/// Every received byte except `D` refreshes the connectivity timer,
/// unknown bytes included.
pub fn refreshes_link(byte: u8) -> bool {
    byte != b'D'
}

/// Encode the identify handshake frame
pub fn identify_frame(device_id: &str) -> Frame {
    let mut frame = Frame::new();
    // Writes cannot fail: every frame fits MAX_FRAME_LEN by construction
    let _ = write!(
        frame,
        "{{\"event_type\":\"identify\",\"device_id\":\"{}\"}}\n",
        device_id
    );
    frame
}

/// Encode a game event as a newline-terminated JSON frame
pub fn event_frame(event: &GameEvent) -> Frame {
    let mut frame = Frame::new();
    let _ = match event {
        GameEvent::SessionStart => write!(frame, "{{\"event_type\":\"session_start\"}}"),
        GameEvent::PopResult {
            mole,
            outcome,
            reaction_ms,
            lives,
            level,
            pop,
            pops_total,
        } => write!(
            frame,
            "{{\"event_type\":\"pop_result\",\"mole_id\":{},\"outcome\":\"{}\",\"reaction_ms\":{},\"lives\":{},\"lvl\":{},\"pop\":{},\"pops_total\":{}}}",
            mole,
            outcome.as_wire(),
            reaction_ms,
            lives,
            level,
            pop,
            pops_total
        ),
        GameEvent::LevelComplete { level } => {
            write!(frame, "{{\"event_type\":\"lvl_complete\",\"lvl\":{}}}", level)
        }
        GameEvent::SessionEnd { won } => {
            write!(frame, "{{\"event_type\":\"session_end\",\"win\":{}}}", won)
        }
    };
    let _ = frame.push('\n');
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outcome;

    #[test]
    fn command_byte_table() {
        assert_eq!(parse_command_byte(b'P'), Some(SerialCommand::Pause));
        assert_eq!(
            parse_command_byte(b'R'),
            Some(SerialCommand::Game(Command::Reset))
        );
        assert_eq!(
            parse_command_byte(b'S'),
            Some(SerialCommand::Game(Command::Start))
        );
        for digit in 1..=8u8 {
            assert_eq!(
                parse_command_byte(b'0' + digit),
                Some(SerialCommand::Game(Command::SetLevel(digit)))
            );
        }
        assert_eq!(parse_command_byte(b'I'), Some(SerialCommand::Identify));
        assert_eq!(parse_command_byte(b'D'), Some(SerialCommand::Disconnect));
    }

    #[test]
    fn unknown_bytes_are_ignored() {
        for byte in [b'0', b'9', b'X', b'p', b'\n', 0x00, 0xFF] {
            assert_eq!(parse_command_byte(byte), None);
        }
    }

    #[test]
    fn every_byte_but_disconnect_refreshes_the_link() {
        assert!(!refreshes_link(b'D'));
        for byte in [b'P', b'R', b'S', b'1', b'8', b'I', b'Z', 0x00] {
            assert!(refreshes_link(byte));
        }
    }

    #[test]
    fn identify_frame_layout() {
        assert_eq!(
            identify_frame("a1b2c3d4e5").as_str(),
            "{\"event_type\":\"identify\",\"device_id\":\"a1b2c3d4e5\"}\n"
        );
    }

    #[test]
    fn session_frames_layout() {
        assert_eq!(
            event_frame(&GameEvent::SessionStart).as_str(),
            "{\"event_type\":\"session_start\"}\n"
        );
        assert_eq!(
            event_frame(&GameEvent::LevelComplete { level: 4 }).as_str(),
            "{\"event_type\":\"lvl_complete\",\"lvl\":4}\n"
        );
        // win is a bare boolean literal, not a string
        assert_eq!(
            event_frame(&GameEvent::SessionEnd { won: true }).as_str(),
            "{\"event_type\":\"session_end\",\"win\":true}\n"
        );
        assert_eq!(
            event_frame(&GameEvent::SessionEnd { won: false }).as_str(),
            "{\"event_type\":\"session_end\",\"win\":false}\n"
        );
    }

    #[test]
    fn pop_result_frame_layout() {
        let event = GameEvent::PopResult {
            mole: 3,
            outcome: Outcome::Hit,
            reaction_ms: 245,
            lives: 5,
            level: 1,
            pop: 1,
            pops_total: 10,
        };
        assert_eq!(
            event_frame(&event).as_str(),
            "{\"event_type\":\"pop_result\",\"mole_id\":3,\"outcome\":\"hit\",\"reaction_ms\":245,\"lives\":5,\"lvl\":1,\"pop\":1,\"pops_total\":10}\n"
        );
    }

    #[test]
    fn frames_are_well_formed_json() {
        let events = [
            GameEvent::SessionStart,
            GameEvent::PopResult {
                mole: 7,
                outcome: Outcome::Late,
                reaction_ms: 1500,
                lives: 0,
                level: 8,
                pop: 10,
                pops_total: 10,
            },
            GameEvent::LevelComplete { level: 8 },
            GameEvent::SessionEnd { won: false },
        ];
        for event in &events {
            let frame = event_frame(event);
            let parsed: serde_json::Value = serde_json::from_str(frame.trim_end()).unwrap();
            // Reserialise and parse again; the objects must be equal
            let reparsed: serde_json::Value =
                serde_json::from_str(&serde_json::to_string(&parsed).unwrap()).unwrap();
            assert_eq!(parsed, reparsed);
            assert!(parsed.get("event_type").unwrap().is_string());
        }

        let identify = identify_frame("0123456789");
        let parsed: serde_json::Value = serde_json::from_str(identify.trim_end()).unwrap();
        assert_eq!(parsed["device_id"], "0123456789");
    }

    #[test]
    fn late_frame_carries_window_duration() {
        let event = GameEvent::PopResult {
            mole: 0,
            outcome: Outcome::Late,
            reaction_ms: 275,
            lives: 4,
            level: 8,
            pop: 2,
            pops_total: 10,
        };
        let frame = event_frame(&event);
        assert!(frame.contains("\"outcome\":\"late\""));
        assert!(frame.contains("\"reaction_ms\":275"));
        assert!(frame.ends_with('\n'));
    }
}
