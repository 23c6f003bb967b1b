/// Defines a closed enumeration stored as a Postgres enum and exchanged as its
/// SCREAMING_SNAKE_CASE code, and generates:
/// - derives (Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)
/// - `ALL` (every variant, declaration order) and `as_str()`
/// - `Display` and a `FromStr` that fails with `CorpusError::Validation`
///
/// The listed codes must equal the SCREAMING_SNAKE_CASE spelling of each variant,
/// since serde and sqlx derive the same spelling independently.
///
/// Usage:
///   corpus_enum!(CuratedStatus, pg = "curated_status", label = "curated status" {
///       Recommendation => "RECOMMENDATION",
///       Corpus => "CORPUS",
///   });
#[macro_export]
macro_rules! corpus_enum {
    (
        $(#[$meta:meta])*
        $name:ident, pg = $pg:literal, label = $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::sqlx::Type,
        )]
        #[sqlx(type_name = $pg, rename_all = "SCREAMING_SNAKE_CASE")]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::common::CorpusError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let code = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == code)
                    .ok_or_else(|| {
                        $crate::common::CorpusError::validation(format!(
                            "Invalid {}: \"{}\"",
                            $label, code
                        ))
                    })
            }
        }
    };
}
