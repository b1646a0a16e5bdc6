//! Fan-out/fan-in strategies for the two mapping stages.
//!
//! Both stages share the same two strategies:
//!
//! | Name | Alias | Behaviour |
//! |------|-------|-----------|
//! | `EACH_TO_EACH` | `SPLIT` | every source runs the downstream stage on its own |
//! | `ALL_TO_EACH` | `JOIN` | sources are gathered into one list, downstream runs once |
//!
//! Names parse case-insensitively and accept `-` or `_` as separator.

use std::fmt;
use std::str::FromStr;

use vigil_core::VigilError;

/// Shared shape of the two stage enums.
macro_rules! mapping_strategy {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
        pub enum $name {
            /// Run the downstream stage once per source value.
            #[default]
            #[cfg_attr(feature = "serde", serde(alias = "SPLIT"))]
            EachToEach,
            /// Gather every source value and run the downstream stage once.
            #[cfg_attr(feature = "serde", serde(alias = "JOIN"))]
            AllToEach,
        }

        impl $name {
            pub const ALL: [Self; 2] = [Self::EachToEach, Self::AllToEach];

            /// Canonical name, as accepted by [`FromStr`].
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    Self::EachToEach => "EACH_TO_EACH",
                    Self::AllToEach => "ALL_TO_EACH",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = VigilError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match normalize(name).as_str() {
                    "EACH_TO_EACH" | "SPLIT" => Ok(Self::EachToEach),
                    "ALL_TO_EACH" | "JOIN" => Ok(Self::AllToEach),
                    _ => Err(VigilError::UnknownMapping {
                        name: name.to_owned(),
                    }),
                }
            }
        }
    };
}

mapping_strategy!(
    /// How data provider values reach the rules.
    DataProviderToRuleMapping
);

mapping_strategy!(
    /// How rule results reach the result handlers.
    RuleToResultHandlerMapping
);

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for mapping in DataProviderToRuleMapping::ALL {
            assert_eq!(mapping.to_string().parse::<DataProviderToRuleMapping>().ok(), Some(mapping));
        }
        for mapping in RuleToResultHandlerMapping::ALL {
            assert_eq!(mapping.as_str().parse::<RuleToResultHandlerMapping>().ok(), Some(mapping));
        }
    }

    #[test]
    fn aliases_and_spelling_variants() {
        assert_eq!(
            "split".parse::<DataProviderToRuleMapping>().ok(),
            Some(DataProviderToRuleMapping::EachToEach)
        );
        assert_eq!(
            " Join ".parse::<RuleToResultHandlerMapping>().ok(),
            Some(RuleToResultHandlerMapping::AllToEach)
        );
        assert_eq!(
            "all-to-each".parse::<DataProviderToRuleMapping>().ok(),
            Some(DataProviderToRuleMapping::AllToEach)
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "EACH_TO_ALL".parse::<RuleToResultHandlerMapping>().unwrap_err();
        assert_eq!(err.kind(), "unknown_mapping");
        assert_eq!(err.to_string(), "unknown mapping strategy: EACH_TO_ALL");
    }

    #[test]
    fn default_is_each_to_each() {
        assert_eq!(DataProviderToRuleMapping::default(), DataProviderToRuleMapping::EachToEach);
        assert_eq!(RuleToResultHandlerMapping::default(), RuleToResultHandlerMapping::EachToEach);
    }
}
