//! Macro for implementing Display and FromStr for wire-level enums
//!
//! The remote API exchanges statuses and priorities as upper snake case
//! strings (`"IN_PROGRESS"`, `"URGENT"`). This macro generates both
//! conversions from a single variant table.
//!
//! # Example
//!
//! ```rust
//! use oslink_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shift {
//!     Morning,
//!     Night,
//! }
//!
//! impl_wire_enum_conversions!(Shift {
//!     Morning => "MORNING",
//!     Night => "NIGHT",
//! });
//!
//! assert_eq!(Shift::Night.to_string(), "NIGHT");
//! assert_eq!("morning".parse::<Shift>(), Ok(Shift::Morning));
//! ```

/// Implements Display and FromStr traits for wire enums
///
/// - Display writes the canonical string exactly as listed
/// - FromStr trims the input and matches it case-insensitively
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
