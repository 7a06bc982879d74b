use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(TriageLevel {
    Critical => "critical",
    High => "high",
    Moderate => "moderate",
    Medium => "medium",
    Low => "low",
});

str_enum!(EmergencyStatus {
    Initiated => "initiated",
    DoctorAssigned => "doctor_assigned",
    Assigned => "assigned",
    InProgress => "in_progress",
    Completed => "completed",
});

str_enum!(UserRole {
    Doctor => "doctor",
    Nurse => "nurse",
    Admin => "admin",
});

str_enum!(UserStatus {
    Active => "active",
    Inactive => "inactive",
});

impl TriageLevel {
    /// Parse a triage tag as produced by the summarizer. Case and
    /// surrounding whitespace are ignored.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.trim().to_ascii_lowercase().parse().ok()
    }
}
