use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The memory taxonomy. Behavior that varies by type (structuring field
/// subset, decay parameters) is table-driven off this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Fact,
    Decision,
    Bug,
    Pattern,
    Context,
    Preference,
    Skill,
    Session,
    Learned,
    Permanent,
}

/// One body element of the structured XML schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureField {
    What,
    When,
    Do,
    Warn,
}

/// Time-decay parameters for one memory type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayParams {
    pub half_life_days: f64,
    pub min_weight: f64,
}

impl MemoryType {
    pub const ALL: [MemoryType; 10] = [
        MemoryType::Fact,
        MemoryType::Decision,
        MemoryType::Bug,
        MemoryType::Pattern,
        MemoryType::Context,
        MemoryType::Preference,
        MemoryType::Skill,
        MemoryType::Session,
        MemoryType::Learned,
        MemoryType::Permanent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemoryType::Fact => "fact",
            MemoryType::Decision => "decision",
            MemoryType::Bug => "bug",
            MemoryType::Pattern => "pattern",
            MemoryType::Context => "context",
            MemoryType::Preference => "preference",
            MemoryType::Skill => "skill",
            MemoryType::Session => "session",
            MemoryType::Learned => "learned",
            MemoryType::Permanent => "permanent",
        }
    }

    /// The XML body elements the structurer fills in for this type.
    pub fn structure_fields(self) -> &'static [StructureField] {
        use StructureField::*;
        match self {
            MemoryType::Fact => &[What],
            MemoryType::Pattern => &[What, When, Do, Warn],
            MemoryType::Decision => &[What, Warn],
            MemoryType::Preference => &[What, Warn],
            MemoryType::Bug => &[What, Do],
            MemoryType::Context => &[What, When],
            MemoryType::Skill => &[What],
            MemoryType::Session | MemoryType::Learned | MemoryType::Permanent => &[What],
        }
    }

    /// Time-decay parameters. `None` means no decay at all (weight 1.0
    /// forever), used for skills and permanent records.
    pub fn decay_params(self) -> Option<DecayParams> {
        let (half_life_days, min_weight) = match self {
            MemoryType::Fact => (90.0, 0.3),
            MemoryType::Decision => (90.0, 0.3),
            MemoryType::Bug => (60.0, 0.3),
            MemoryType::Pattern => (90.0, 0.4),
            MemoryType::Preference => (60.0, 0.2),
            MemoryType::Context => (30.0, 0.2),
            MemoryType::Session => (14.0, 0.1),
            MemoryType::Learned => (90.0, 0.4),
            MemoryType::Skill | MemoryType::Permanent => return None,
        };
        Some(DecayParams {
            half_life_days,
            min_weight,
        })
    }
}

impl Default for MemoryType {
    fn default() -> Self {
        MemoryType::Context
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fact" => Ok(MemoryType::Fact),
            "decision" => Ok(MemoryType::Decision),
            "bug" => Ok(MemoryType::Bug),
            "pattern" => Ok(MemoryType::Pattern),
            "context" => Ok(MemoryType::Context),
            "preference" => Ok(MemoryType::Preference),
            "skill" => Ok(MemoryType::Skill),
            "session" => Ok(MemoryType::Session),
            "learned" => Ok(MemoryType::Learned),
            "permanent" => Ok(MemoryType::Permanent),
            other => Err(format!("unknown memory type: {other}")),
        }
    }
}
