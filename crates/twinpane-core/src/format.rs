//! Display label formatting.

use chrono::DateTime;

use crate::config::{ModeFormat, SizeFormat};

/// Size label shown for directories until a recursive size is computed.
pub const DIRECTORY_SIZE_LABEL: &str = "<DIR>";

/// Format a byte size according to the configured units.
pub fn format_size(size: u64, format: SizeFormat) -> String {
    match format {
        SizeFormat::Binary => humansize::format_size(size, humansize::BINARY),
        SizeFormat::Decimal => humansize::format_size(size, humansize::DECIMAL),
        SizeFormat::Bytes => size.to_string(),
    }
}

/// Format permission bits.
pub fn format_mode(mode: u32, format: ModeFormat) -> String {
    match format {
        ModeFormat::Octal => format!("{:o}", mode & 0o7777),
        ModeFormat::Textual => {
            let mut out = String::with_capacity(9);
            for shift in [6u32, 3, 0] {
                let bits = (mode >> shift) & 0o7;
                out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
                out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
                out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
            }
            out
        }
    }
}

/// Format a modification time with a strftime-style format string.
///
/// Out-of-range timestamps render as an empty string.
pub fn format_time(mtime: i64, format: &str) -> String {
    DateTime::from_timestamp(mtime, 0)
        .map(|time| time.format(format).to_string())
        .unwrap_or_default()
}
