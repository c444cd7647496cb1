//! Macro for string-labelled enums
//!
//! Sale statuses and audit actions are persisted and exchanged as lowercase
//! labels. This macro generates `as_str`, `Display`, and a case-insensitive
//! `FromStr` from a single variant → label table.
//!
//! # Example
//!
//! ```rust
//! use quotesync_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Outcome {
//!     Kept,
//!     Dropped,
//! }
//!
//! impl_label_conversions!(Outcome {
//!     Kept => "kept",
//!     Dropped => "dropped",
//! });
//!
//! assert_eq!(Outcome::Kept.as_str(), "kept");
//! assert_eq!("DROPPED".parse::<Outcome>().unwrap(), Outcome::Dropped);
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a label enum.
///
/// Labels must be written in lowercase; parsing lowercases its input first.
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Persisted label for this variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::QuoteSyncError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err($crate::QuoteSyncError::InvalidInput(format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}
