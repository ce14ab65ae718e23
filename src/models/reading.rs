//! Reading model
//!
//! A reading is fully determined by (input, seed, sequence number); see
//! `oracle::generate_reading`. The optional enhancement is attached afterwards
//! and never changes the core fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label selected by digest bytes 4..8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    Void,
    Spiral,
    Mirror,
    Bridge,
    Flame,
    Tide,
    Seed,
    Lattice,
    Threshold,
    Echo,
    Storm,
    Root,
    Crown,
    Veil,
    Compass,
    Ember,
}

impl Pattern {
    /// All patterns in index order
    pub const ALL: [Pattern; 16] = [
        Pattern::Void,
        Pattern::Spiral,
        Pattern::Mirror,
        Pattern::Bridge,
        Pattern::Flame,
        Pattern::Tide,
        Pattern::Seed,
        Pattern::Lattice,
        Pattern::Threshold,
        Pattern::Echo,
        Pattern::Storm,
        Pattern::Root,
        Pattern::Crown,
        Pattern::Veil,
        Pattern::Compass,
        Pattern::Ember,
    ];

    /// Pattern at `index mod 16`
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index % 16) as usize]
    }

    /// Position in the fixed table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Spiral => "Spiral",
            Self::Mirror => "Mirror",
            Self::Bridge => "Bridge",
            Self::Flame => "Flame",
            Self::Tide => "Tide",
            Self::Seed => "Seed",
            Self::Lattice => "Lattice",
            Self::Threshold => "Threshold",
            Self::Echo => "Echo",
            Self::Storm => "Storm",
            Self::Root => "Root",
            Self::Crown => "Crown",
            Self::Veil => "Veil",
            Self::Compass => "Compass",
            Self::Ember => "Ember",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Message selected by digest bytes 8..12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Message {
    PathReveals,
    StillWater,
    DoorOpens,
    OldRoots,
    SmallFlame,
    TurningTide,
    QuietSeed,
    WovenThreads,
    EdgeOfChange,
    ReturningEcho,
    PassingStorm,
    DeepRoots,
    EarnedCrown,
    ThinVeil,
    TrueNorth,
    LastEmber,
}

impl Message {
    /// All messages in index order
    pub const ALL: [Message; 16] = [
        Message::PathReveals,
        Message::StillWater,
        Message::DoorOpens,
        Message::OldRoots,
        Message::SmallFlame,
        Message::TurningTide,
        Message::QuietSeed,
        Message::WovenThreads,
        Message::EdgeOfChange,
        Message::ReturningEcho,
        Message::PassingStorm,
        Message::DeepRoots,
        Message::EarnedCrown,
        Message::ThinVeil,
        Message::TrueNorth,
        Message::LastEmber,
    ];

    /// Message at `index mod 16`
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index % 16) as usize]
    }

    /// Position in the fixed table
    pub fn index(self) -> usize {
        self as usize
    }

    /// The message sentence
    pub fn text(self) -> &'static str {
        match self {
            Self::PathReveals => "The path reveals itself to those who walk it.",
            Self::StillWater => "Still water shows the clearest reflection.",
            Self::DoorOpens => "A door opens where a wall once stood.",
            Self::OldRoots => "What you seek was planted long ago.",
            Self::SmallFlame => "A small flame is enough to find the way.",
            Self::TurningTide => "The tide is turning; let it carry you.",
            Self::QuietSeed => "Growth is happening where you cannot see it.",
            Self::WovenThreads => "Every thread you pull moves the whole weave.",
            Self::EdgeOfChange => "You stand at the edge of a change.",
            Self::ReturningEcho => "What you sent out is on its way back.",
            Self::PassingStorm => "This storm is passing, not staying.",
            Self::DeepRoots => "Hold fast to what has always held you.",
            Self::EarnedCrown => "You have already earned what you are waiting for.",
            Self::ThinVeil => "The answer is closer than it appears.",
            Self::TrueNorth => "Trust the direction that feels like home.",
            Self::LastEmber => "Tend what remains and it will burn again.",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Direction reported by the external enhancer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Stable,
    Falling,
    Volatile,
}

/// Supplementary, non-authoritative fields from the enhancer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    /// 0.0 to 1.0
    pub harmony_index: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub trend: Trend,
    pub insight_text: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Enhancement {
    /// Both scores inside [0, 1]
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.harmony_index) && (0.0..=1.0).contains(&self.confidence)
    }
}

/// The outcome of one consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// 1 to 100
    pub resonance: u8,
    /// 1 to 100
    pub clarity: u8,
    /// 1 to 100
    pub flux: u8,
    /// 1 to 100
    pub emergence: u8,
    pub pattern: Pattern,
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement: Option<Enhancement>,
}

impl Reading {
    /// The four bounded fields in fixed order
    pub fn bounded_fields(&self) -> [u8; 4] {
        [self.resonance, self.clarity, self.flux, self.emergence]
    }

    /// Same reading with the enhancement stripped
    pub fn core(&self) -> Reading {
        Reading {
            enhancement: None,
            ..self.clone()
        }
    }
}
