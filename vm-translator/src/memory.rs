//! Mapping from VM segments to Hack RAM locations.

use crate::parser::Segment;

/// `temp i` lives at RAM[5 + i] (R5..R12).
#[inline]
pub fn temp_address(index: u16) -> u16 {
    5 + index
}

/// `pointer 0` aliases THIS (RAM[3]), `pointer 1` aliases THAT (RAM[4]).
#[inline]
pub fn pointer_symbol(index: u16) -> &'static str {
    if index == 0 { "THIS" } else { "THAT" }
}

/// Base-pointer symbol for the four indirect segments.
#[inline]
pub fn base_symbol(segment: Segment) -> Option<&'static str> {
    match segment {
        Segment::Local => Some("LCL"),
        Segment::Argument => Some("ARG"),
        Segment::This => Some("THIS"),
        Segment::That => Some("THAT"),
        _ => None,
    }
}
