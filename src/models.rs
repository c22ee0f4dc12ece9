use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSide {
    Local,
    Visitor,
}
impl TeamSide {
    pub fn get_all() -> Vec<TeamSide> {
        vec![TeamSide::Local, TeamSide::Visitor]
    }

    pub fn other(&self) -> TeamSide {
        match self {
            TeamSide::Local => TeamSide::Visitor,
            TeamSide::Visitor => TeamSide::Local,
        }
    }
}

impl FromStr for TeamSide {
    type Err = ParseStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(TeamSide::Local),
            "visitor" => Ok(TeamSide::Visitor),
            _ => Err(ParseStringError),
        }
    }
}

impl Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Yellow,
    Red,
    Blue,
}

impl CardKind {
    pub fn get_all() -> Vec<CardKind> {
        vec![CardKind::Yellow, CardKind::Red, CardKind::Blue]
    }

    pub fn stat_kind(&self) -> StatKind {
        match self {
            CardKind::Yellow => StatKind::YellowCards,
            CardKind::Red => StatKind::RedCards,
            CardKind::Blue => StatKind::BlueCards,
        }
    }
}

impl FromStr for CardKind {
    type Err = ParseStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yellow" => Ok(CardKind::Yellow),
            "red" => Ok(CardKind::Red),
            // the backend stores blue cards under its league-extension name
            "blue" | "azul" => Ok(CardKind::Blue),
            _ => Err(ParseStringError),
        }
    }
}

impl Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Per-player stat buckets as stored in the remote performance map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Goals,
    Assists,
    YellowCards,
    RedCards,
    BlueCards,
}

impl StatKind {
    /// The JSON field name inside a performance entry.
    pub fn field_name(&self) -> &'static str {
        match self {
            StatKind::Goals => "goals",
            StatKind::Assists => "assists",
            StatKind::YellowCards => "yellowcards",
            StatKind::RedCards => "redcards",
            StatKind::BlueCards => "azul",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseStringError;

impl Display for ParseStringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not parse string")
    }
}

/// The remote store is inconsistent about numerics: counts arrive as
/// strings most of the time, but previously-patched fields may come
/// back as plain numbers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum StringOrNum {
    String(String),
    Number(u32),
}

impl StringOrNum {
    pub fn to_num(&self) -> u32 {
        match self {
            StringOrNum::String(str) => str.trim().parse::<u32>().unwrap_or(0),
            StringOrNum::Number(n) => *n,
        }
    }

    pub fn to_str(&self) -> String {
        match self {
            StringOrNum::String(str) => str.to_owned(),
            StringOrNum::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for StringOrNum {
    fn from(value: &str) -> Self {
        StringOrNum::String(value.to_string())
    }
}

impl From<u32> for StringOrNum {
    fn from(value: u32) -> Self {
        StringOrNum::Number(value)
    }
}
