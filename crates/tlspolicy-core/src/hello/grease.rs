/// Check if a u16 value is a GREASE value (RFC 8701).
///
/// GREASE values follow the pattern 0x?A?A where both nibble pairs are identical:
/// 0x0A0A, 0x1A1A, 0x2A2A, ..., 0xFAFA
pub fn is_grease_u16(val: u16) -> bool {
    let hi = (val >> 8) as u8;
    let lo = val as u8;
    hi == lo && (hi & 0x0F) == 0x0A
}

/// Map wire values to `T`, dropping GREASE values.
pub fn strip_grease<T>(values: impl IntoIterator<Item = u16>, wrap: impl Fn(u16) -> T) -> Vec<T> {
    values.into_iter().filter(|v| !is_grease_u16(*v)).map(wrap).collect()
}
