// Purpose: external interfaces and format conversions.

pub mod midi;
