use std::fmt;

/// First port of the IANA dynamic/private range.
pub const DYNAMIC_PORT_FLOOR: u16 = 49152;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    Malformed,
    OutOfRange,
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::Malformed => write!(f, "not a numeric port literal"),
            PortError::OutOfRange => write!(f, "UDP port numbers cannot exceed 65535"),
        }
    }
}

impl std::error::Error for PortError {}

/// Parse a port given as a C-style numeric literal: decimal, `0x`/`0X` hex,
/// or leading-zero octal. Unlike `strtoul(_, _, 0)`, trailing garbage and
/// empty input are rejected instead of being read as a prefix or as 0.
pub fn parse_port(arg: &str) -> Result<u16, PortError> {
    let (digits, radix) = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        (hex, 16)
    } else if arg.len() > 1 && arg.starts_with('0') {
        (&arg[1..], 8)
    } else {
        (arg, 10)
    };
    if digits.is_empty() {
        return Err(PortError::Malformed);
    }
    let value = u32::from_str_radix(digits, radix).map_err(|_| PortError::Malformed)?;
    if value > u16::MAX as u32 {
        return Err(PortError::OutOfRange);
    }
    Ok(value as u16)
}

/// Ports below the dynamic range are well-known or registered; using them
/// draws a non-fatal advisory.
pub fn in_dynamic_range(port: u16) -> bool {
    port >= DYNAMIC_PORT_FLOOR
}
