use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CheckError, Result};

/// Parse a dotted-quad IPv4 address into its big-endian integer form.
///
/// Exactly four decimal octets in `0..=255` are required.
pub fn ip_to_number(ip: &str) -> Result<u32> {
    let mut value: u32 = 0;
    let mut count = 0;

    for octet in ip.split('.') {
        count += 1;
        if count > 4 {
            return Err(CheckError::Format(format!(
                "Invalid IPv4 address '{}': expected 4 octets",
                ip
            )));
        }
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CheckError::Format(format!(
                "Invalid IPv4 address '{}': octet '{}' is not a decimal number",
                ip, octet
            )));
        }
        let parsed: u32 = octet.parse().map_err(|_| {
            CheckError::Format(format!(
                "Invalid IPv4 address '{}': octet '{}' out of range",
                ip, octet
            ))
        })?;
        if parsed > 255 {
            return Err(CheckError::Format(format!(
                "Invalid IPv4 address '{}': octet '{}' out of range",
                ip, octet
            )));
        }
        value = (value << 8) + parsed;
    }

    if count != 4 {
        return Err(CheckError::Format(format!(
            "Invalid IPv4 address '{}': expected 4 octets",
            ip
        )));
    }

    Ok(value)
}

pub fn number_to_ip(value: u32) -> String {
    std::net::Ipv4Addr::from(value).to_string()
}

/// Network mask with the top `bits` bits set
pub fn prefix_mask(bits: u8) -> u32 {
    match bits {
        0 => 0,
        n if n >= 32 => u32::MAX,
        n => !((1u32 << (32 - n)) - 1),
    }
}

/// Check whether `ip` falls inside `cidr` (e.g. `"3.5.140.0/22"`).
pub fn is_ip_in_cidr(ip: &str, cidr: &str) -> Result<bool> {
    let range: Cidr = cidr.parse()?;
    Ok(range.contains(ip_to_number(ip)?))
}

/// A validated IPv4 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    base: u32,
    prefix_len: u8,
}

impl Cidr {
    pub fn new(base: u32, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(CheckError::Format(format!(
                "Invalid prefix length {}: must be between 0 and 32",
                prefix_len
            )));
        }
        Ok(Cidr { base, prefix_len })
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn mask(&self) -> u32 {
        prefix_mask(self.prefix_len)
    }

    pub fn contains(&self, ip: u32) -> bool {
        let mask = self.mask();
        (ip & mask) == (self.base & mask)
    }
}

impl FromStr for Cidr {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        let (range, bits) = s.trim().split_once('/').ok_or_else(|| {
            CheckError::Format(format!("Invalid CIDR '{}': missing prefix length", s))
        })?;

        if bits.is_empty() || !bits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CheckError::Format(format!(
                "Invalid CIDR '{}': prefix length '{}' is not a number",
                s, bits
            )));
        }
        let prefix_len: u8 = bits.parse().map_err(|_| {
            CheckError::Format(format!("Invalid CIDR '{}': prefix length out of range", s))
        })?;

        Cidr::new(ip_to_number(range)?, prefix_len)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", number_to_ip(self.base), self.prefix_len)
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
