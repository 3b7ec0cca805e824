use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Prebuilt voices offered by the synthesis service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceId {
    #[default]
    Zephyr,
    Puck,
    Charon,
    Kore,
    Fenrir,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceProfile {
    pub id: VoiceId,
    pub name: &'static str,
    pub description: &'static str,
    pub gender: &'static str,
}

impl VoiceId {
    pub const ALL: [VoiceId; 5] = [
        VoiceId::Zephyr,
        VoiceId::Kore,
        VoiceId::Puck,
        VoiceId::Charon,
        VoiceId::Fenrir,
    ];

    /// Name as understood by the synthesis service.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceId::Zephyr => "Zephyr",
            VoiceId::Puck => "Puck",
            VoiceId::Charon => "Charon",
            VoiceId::Kore => "Kore",
            VoiceId::Fenrir => "Fenrir",
        }
    }

    pub fn profile(&self) -> VoiceProfile {
        let (description, gender) = match self {
            VoiceId::Zephyr => ("Warm, helpful, and natural tone.", "neutral"),
            VoiceId::Kore => ("Professional, articulate, and clear.", "female"),
            VoiceId::Puck => ("Energetic, youthful, and friendly.", "male"),
            VoiceId::Charon => ("Deep, resonant, and authoritative.", "male"),
            VoiceId::Fenrir => ("Sophisticated, calm, and rhythmic.", "neutral"),
        };
        VoiceProfile {
            id: *self,
            name: self.as_str(),
            description,
            gender,
        }
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceId::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown voice '{s}'. Available voices: {}",
                    VoiceId::ALL.map(|v| v.as_str()).join(", ")
                )
            })
    }
}
