use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_string {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(Fingerprint, "Stable identity hash over an alert's label set.");
newtype_string!(ReceiverName, "Name of a configured receiver (resolves to an adapter).");
newtype_string!(SilenceId, "Unique identifier of a silence document.");
newtype_string!(JobId, "Unique identifier of a publish job.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_from_str() {
        let fp = Fingerprint::from("abc123");
        assert_eq!(fp.as_str(), "abc123");
        assert_eq!(&*fp, "abc123");
    }

    #[test]
    fn newtype_serde_roundtrip() {
        let id = SilenceId::new("sil-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sil-1\"");
        let back: SilenceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn newtype_display() {
        let r = ReceiverName::new("pagerduty-oncall");
        assert_eq!(format!("{r}"), "pagerduty-oncall");
    }
}
