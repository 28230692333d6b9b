// Sat Jan 17 2026 - Alex

use crate::memory::MemoryError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A 32-bit absolute address inside one build's memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address {
    value: u32,
}

impl Address {
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn as_u32(&self) -> u32 {
        self.value
    }

    pub fn is_aligned(&self, alignment: u32) -> bool {
        alignment == 0 || self.value % alignment == 0
    }

    /// Shifts the address by a signed delta. Wraps on overflow, like the hardware does.
    pub fn offset(&self, delta: i64) -> Self {
        Self { value: (self.value as i64).wrapping_add(delta) as u32 }
    }

    pub fn distance(&self, other: Self) -> i64 {
        self.value as i64 - other.value as i64
    }

    /// Lowercase hex without prefix or padding, the form used in rendered assembly.
    pub fn to_hex(&self) -> String {
        format!("{:x}", self.value)
    }

    /// Parses hex text with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, MemoryError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(MemoryError::InvalidHex(text.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::new)
            .map_err(|_| MemoryError::InvalidHex(text.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.value)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.value, f)
    }
}

impl FromStr for Address {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Add<u32> for Address {
    type Output = Self;
    fn add(self, rhs: u32) -> Self::Output {
        Self { value: self.value.wrapping_add(rhs) }
    }
}

impl Sub<u32> for Address {
    type Output = Self;
    fn sub(self, rhs: u32) -> Self::Output {
        Self { value: self.value.wrapping_sub(rhs) }
    }
}

impl Sub<Address> for Address {
    type Output = i64;
    fn sub(self, rhs: Address) -> Self::Output {
        self.distance(rhs)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.value
    }
}

// Serialized as "0x..." strings so reports and configs stay readable.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{:x}", self.value))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => u32::try_from(v)
                .map(Address::new)
                .map_err(|_| serde::de::Error::custom(format!("address 0x{:x} does not fit in 32 bits", v))),
            Raw::Text(s) => Address::from_hex(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_accepts_prefix_and_padding() {
        assert_eq!(Address::from_hex("0x22E0000").unwrap(), Address::new(0x22E0000));
        assert_eq!(Address::from_hex("022e0000").unwrap(), Address::new(0x22E0000));
        assert!(Address::from_hex("0x").is_err());
        assert!(Address::from_hex("zz").is_err());
    }

    #[test]
    fn test_offset_and_distance() {
        let a = Address::new(0x22E7B88);
        assert_eq!(a.offset(-0x940), Address::new(0x22E7248));
        assert_eq!(Address::new(0x12E0010) - Address::new(0x12DFFF0), 0x20);
        assert_eq!(a.to_hex(), "22e7b88");
    }
}
