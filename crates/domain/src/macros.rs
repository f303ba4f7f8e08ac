//! Macro for implementing Display and FromStr for wire-level enums
//!
//! The practice-management backend spells enumerated values in PascalCase
//! and has drifted between schema generations ("CheckedIn" vs "Check-in").
//! This macro maps each variant to its canonical wire string plus any number
//! of accepted aliases, with case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use practicebridge_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visit {
//!     Booked,
//!     Cancelled,
//! }
//!
//! impl_wire_enum_conversions!(Visit {
//!     Booked => "Booked",
//!     Cancelled => "Cancelled" | "Canceled",
//! });
//!
//! assert_eq!(Visit::Cancelled.to_string(), "Cancelled");
//! assert_eq!("canceled".parse::<Visit>().unwrap(), Visit::Cancelled);
//! ```

/// Implements Display and FromStr traits for wire enums
///
/// - Display: writes the canonical wire string (first literal)
/// - FromStr: accepts the canonical string or any alias, ignoring ASCII case
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let candidate = s.trim();
                $(
                    if candidate.eq_ignore_ascii_case($str)
                        $(|| candidate.eq_ignore_ascii_case($alias))*
                    {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
