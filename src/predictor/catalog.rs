//! Closed sets of franchises and host cities known to the trained model.
//!
//! The model was fitted on these exact strings, so anything outside them is
//! rejected when parsed instead of reaching the encoder.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

// ── Teams ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Team {
    ChennaiSuperKings,
    DelhiCapitals,
    KingsXiPunjab,
    KolkataKnightRiders,
    MumbaiIndians,
    RajasthanRoyals,
    RoyalChallengersBangalore,
    SunrisersHyderabad,
}

impl Team {
    /// All teams, sorted by display name.
    pub const ALL: [Team; 8] = [
        Team::ChennaiSuperKings,
        Team::DelhiCapitals,
        Team::KingsXiPunjab,
        Team::KolkataKnightRiders,
        Team::MumbaiIndians,
        Team::RajasthanRoyals,
        Team::RoyalChallengersBangalore,
        Team::SunrisersHyderabad,
    ];

    /// The name exactly as it appears in the training data.
    pub fn as_str(self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::DelhiCapitals => "Delhi Capitals",
            Team::KingsXiPunjab => "Kings XI Punjab",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
        }
    }
}

impl FromStr for Team {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "team",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Team {
    type Error = UnknownName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Cities ───────────────────────────────────────────────────────────────────
//
// "Bangalore" and "Bengaluru" are both kept: the training data has matches
// recorded under each spelling and the encoder treats them as distinct.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum City {
    AbuDhabi,
    Ahmedabad,
    Bangalore,
    Bengaluru,
    Bloemfontein,
    CapeTown,
    Centurion,
    Chandigarh,
    Chennai,
    Cuttack,
    Delhi,
    Dharamsala,
    Durban,
    EastLondon,
    Hyderabad,
    Indore,
    Jaipur,
    Johannesburg,
    Kimberley,
    Kolkata,
    Mohali,
    Mumbai,
    Nagpur,
    PortElizabeth,
    Pune,
    Raipur,
    Ranchi,
    Sharjah,
    Visakhapatnam,
}

impl City {
    /// All host cities, sorted by display name.
    pub const ALL: [City; 29] = [
        City::AbuDhabi,
        City::Ahmedabad,
        City::Bangalore,
        City::Bengaluru,
        City::Bloemfontein,
        City::CapeTown,
        City::Centurion,
        City::Chandigarh,
        City::Chennai,
        City::Cuttack,
        City::Delhi,
        City::Dharamsala,
        City::Durban,
        City::EastLondon,
        City::Hyderabad,
        City::Indore,
        City::Jaipur,
        City::Johannesburg,
        City::Kimberley,
        City::Kolkata,
        City::Mohali,
        City::Mumbai,
        City::Nagpur,
        City::PortElizabeth,
        City::Pune,
        City::Raipur,
        City::Ranchi,
        City::Sharjah,
        City::Visakhapatnam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            City::AbuDhabi => "Abu Dhabi",
            City::Ahmedabad => "Ahmedabad",
            City::Bangalore => "Bangalore",
            City::Bengaluru => "Bengaluru",
            City::Bloemfontein => "Bloemfontein",
            City::CapeTown => "Cape Town",
            City::Centurion => "Centurion",
            City::Chandigarh => "Chandigarh",
            City::Chennai => "Chennai",
            City::Cuttack => "Cuttack",
            City::Delhi => "Delhi",
            City::Dharamsala => "Dharamsala",
            City::Durban => "Durban",
            City::EastLondon => "East London",
            City::Hyderabad => "Hyderabad",
            City::Indore => "Indore",
            City::Jaipur => "Jaipur",
            City::Johannesburg => "Johannesburg",
            City::Kimberley => "Kimberley",
            City::Kolkata => "Kolkata",
            City::Mohali => "Mohali",
            City::Mumbai => "Mumbai",
            City::Nagpur => "Nagpur",
            City::PortElizabeth => "Port Elizabeth",
            City::Pune => "Pune",
            City::Raipur => "Raipur",
            City::Ranchi => "Ranchi",
            City::Sharjah => "Sharjah",
            City::Visakhapatnam => "Visakhapatnam",
        }
    }
}

impl FromStr for City {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "city",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for City {
    type Error = UnknownName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for City {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
