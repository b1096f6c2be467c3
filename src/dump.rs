//! Tracing presentations of frames: a binary bit dump and a labeled
//! summary.
//!
//! Neither presentation is parsing-critical and neither can fail: a payload
//! that is not valid UTF-8 renders as empty rather than propagating an
//! error. The summary is wired up as the [`Frame`]'s `Display`
//! implementation so frames drop straight into `log::debug!("{frame}")`
//! call sites.

use std::fmt;

use crate::frame::{Frame, OpCode};

/// Bytes rendered per bit-dump row.
const GROUPS_PER_ROW: usize = 4;

/// Renders `bytes` as an ASCII-bordered table of 8-bit binary groups,
/// [`GROUPS_PER_ROW`] to a row.
///
/// The left column counts the row's starting byte offset. Its width scales
/// with the dump: four decimal digits while the total stays under 10 000
/// bytes, then four, eight or sixteen hex digits as the offsets outgrow
/// each width. Unfilled groups in the final row are left blank.
pub fn bit_dump(bytes: &[u8]) -> String {
    let (width, hex) = counter_format(bytes.len());

    let mut border = String::from("+");
    border.push_str(&"-".repeat(width + 2));
    border.push('+');
    for _ in 0..GROUPS_PER_ROW {
        border.push_str(&"-".repeat(10));
        border.push('+');
    }

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');

    for (index, group) in bytes.chunks(GROUPS_PER_ROW).enumerate() {
        let offset = index * GROUPS_PER_ROW;
        if hex {
            out.push_str(&format!("| {offset:0width$X} |"));
        } else {
            out.push_str(&format!("| {offset:0width$} |"));
        }
        for slot in 0..GROUPS_PER_ROW {
            match group.get(slot) {
                Some(byte) => out.push_str(&format!(" {byte:08b} |")),
                None => out.push_str("          |"),
            }
        }
        out.push('\n');
    }

    out.push_str(&border);
    out.push('\n');
    out
}

/// Picks the offset-column width for a dump of `total` bytes.
fn counter_format(total: usize) -> (usize, bool) {
    if total < 10_000 {
        (4, false)
    } else if total <= 0xFFFF {
        (4, true)
    } else if total <= 0xFFFF_FFFF {
        (8, true)
    } else {
        (16, true)
    }
}

impl Frame {
    /// The bit dump of this frame's serialized wire image.
    pub fn bit_dump(&self) -> String {
        bit_dump(&self.to_bytes())
    }

    /// How the summary presents the payload.
    ///
    /// Empty payloads render as nothing, anything over 125 bytes as `---`.
    /// The payload of a final, unmasked, uncompressed text frame is decoded
    /// as UTF-8, falling back to an empty rendering if the bytes are not
    /// valid text. Everything else shows the payload's own debug form.
    fn payload_repr(&self) -> String {
        if self.payload.is_empty() {
            return String::new();
        }
        if self.payload.len() > 125 {
            return "---".to_string();
        }
        if self.fin && self.opcode == OpCode::Text && !self.is_masked() && !self.is_compressed() {
            return std::str::from_utf8(&self.payload)
                .map(str::to_owned)
                .unwrap_or_default();
        }
        format!("{:?}", self.payload)
    }
}

/// Writes a `label: value` line, leaving no trailing space when the value
/// is empty.
fn field(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    if value.is_empty() {
        writeln!(f, "{label}:")
    } else {
        writeln!(f, "{label}: {value}")
    }
}

/// The labeled one-field-per-line summary.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FIN: {}", self.fin)?;
        writeln!(f, "RSV1: {}", self.is_compressed())?;
        writeln!(f, "RSV2: {}", self.rsv2())?;
        writeln!(f, "RSV3: {}", self.rsv3())?;
        writeln!(f, "Opcode: {:?}", self.opcode)?;
        writeln!(f, "MASK: {}", self.is_masked())?;
        writeln!(f, "Payload Length: {}", self.length_code())?;

        let extended = if self.length_code() >= 126 {
            self.payload.len().to_string()
        } else {
            String::new()
        };
        field(f, "Extended Payload Length", &extended)?;

        let key = self
            .masking_key()
            .map(|key| {
                key.iter()
                    .map(|byte| format!("{byte:02X}"))
                    .collect::<Vec<_>>()
                    .join(":")
            })
            .unwrap_or_default();
        field(f, "Masking Key", &key)?;

        field(f, "Payload Data", &self.payload_repr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_dump_of_tiny_text_frame() {
        let expected = "\
+------+----------+----------+----------+----------+
| 0000 | 10000001 | 00000101 | 01001000 | 01100101 |
| 0004 | 01101100 | 01101100 | 01101111 |          |
+------+----------+----------+----------+----------+
";
        assert_eq!(Frame::text("Hello").bit_dump(), expected);
    }

    #[test]
    fn bit_dump_fills_complete_rows() {
        // 2 header bytes + 2 payload bytes: one full row, no blanks.
        let dump = Frame::binary(&[0xFF, 0x00][..]).bit_dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "| 0000 | 10000010 | 00000010 | 11111111 | 00000000 |");
    }

    #[test]
    fn bit_dump_counter_switches_to_hex() {
        // 9998 payload bytes + 4 prefix bytes push the dump past the
        // decimal window.
        let dump = Frame::binary(&vec![0u8; 9_998][..]).bit_dump();
        assert!(dump.contains("| 0000 |"));
        // Offset 9996 renders as hex 270C.
        assert!(dump.contains("| 270C |"), "counter did not switch to hex");
        assert!(!dump.contains("| 9996 |"));
    }

    #[test]
    fn bit_dump_counter_widens_past_16_bits() {
        let dump = bit_dump(&vec![0u8; 0x10010]);
        assert!(dump.contains("| 00000004 |"));
        assert!(dump.contains("| 00010000 |"));
    }

    #[test]
    fn summary_of_tiny_text_frame() {
        let expected = "\
FIN: true
RSV1: false
RSV2: false
RSV3: false
Opcode: Text
MASK: false
Payload Length: 5
Extended Payload Length:
Masking Key:
Payload Data: Hello
";
        assert_eq!(Frame::text("Hello").to_string(), expected);
    }

    #[test]
    fn summary_formats_masking_key_as_hex_bytes() {
        let mut frame = Frame::new(true, OpCode::Text, Some([0x37, 0xFA, 0x21, 0x3D]), "Hello");
        frame.mask();
        let summary = frame.to_string();
        assert!(summary.contains("MASK: true"));
        assert!(summary.contains("Masking Key: 37:FA:21:3D"));
        // Masked bytes are not text; the debug form shows up instead.
        assert!(summary.contains("Payload Data: b\""));
    }

    #[test]
    fn summary_shows_extended_length_when_present() {
        let frame = Frame::binary(&vec![0xAA; 256][..]);
        let summary = frame.to_string();
        assert!(summary.contains("Payload Length: 126"));
        assert!(summary.contains("Extended Payload Length: 256"));
        assert!(summary.contains("Payload Data: ---"));
    }

    #[test]
    fn summary_of_empty_payload() {
        let summary = Frame::ping("").to_string();
        assert!(summary.contains("Opcode: Ping"));
        assert!(summary.contains("Payload Data:\n"));
    }

    #[test]
    fn summary_never_fails_on_invalid_utf8() {
        let frame = Frame::text(&[0xFF, 0xFE, 0xFD][..]);
        assert!(frame.to_string().contains("Payload Data:\n"));
    }

    #[test]
    fn summary_uses_debug_form_for_non_final_text() {
        let frame = Frame::new(false, OpCode::Text, None, "part");
        assert!(frame.to_string().contains("Payload Data: b\"part\""));
    }
}
