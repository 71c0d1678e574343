//! Static grammar and tag tables shared by both codecs.
//!
//! Nothing here carries state; every table is a compile-time `phf` map or a `match`, so the
//! data can be shared freely between threads decoding different documents.

use bitflags::bitflags;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Category of an `*eventTag` declaration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    #[default]
    Unknown = 0,
    ItemCreate = 1,
    ItemInsert = 2,
    ItemRemove = 3,
    ItemDestroy = 4,
    ItemPlace = 5,
    ItemExchange = 6,
    SetFightMode = 7,
    MunitionPlace = 8,
    MunitionRemove = 9,
    SoundDraw = 10,
    SoundUndraw = 11,
    MeshSwap = 12,
    TorchDraw = 13,
    TorchInventory = 14,
    TorchDrop = 15,
    HitLimb = 16,
    HitDirection = 17,
    DamageMultiplier = 18,
    ParryFrame = 19,
    OptimalFrame = 20,
    HitEnd = 21,
    ComboWindow = 22,
}

/// Keyword spellings accepted for each [`EventKind`], including historical aliases.
static EVENT_KEYWORDS: phf::Map<&'static str, EventKind> = phf_map! {
    "DEF_CREATE_ITEM" => EventKind::ItemCreate,
    "DEF_INSERT_ITEM" => EventKind::ItemInsert,
    "DEF_REMOVE_ITEM" => EventKind::ItemRemove,
    "DEF_DESTROY_ITEM" => EventKind::ItemDestroy,
    "DEF_PLACE_ITEM" => EventKind::ItemPlace,
    "DEF_EXCHANGE_ITEM" => EventKind::ItemExchange,
    "DEF_FIGHTMODE" => EventKind::SetFightMode,
    "DEF_PLACE_MUNITION" => EventKind::MunitionPlace,
    "DEF_REMOVE_MUNITION" => EventKind::MunitionRemove,
    "DEF_DRAWSOUND" => EventKind::SoundDraw,
    "DEF_UNDRAWSOUND" => EventKind::SoundUndraw,
    "DEF_SWAPMESH" => EventKind::MeshSwap,
    "DEF_DRAWTORCH" => EventKind::TorchDraw,
    "DEF_INV_TORCH" => EventKind::TorchInventory,
    "DEF_DROP_TORCH" => EventKind::TorchDrop,
    "DEF_HIT_LIMB" => EventKind::HitLimb,
    "HIT_LIMB" => EventKind::HitLimb,
    "DEF_HIT_DIR" => EventKind::HitDirection,
    // Unverified alias: seen in shipped scripts, meaning never confirmed against the engine.
    "DEF_DIR" => EventKind::HitDirection,
    "DEF_DAM_MULTIPLIER" => EventKind::DamageMultiplier,
    "DEF_DAM_MULTIPLY" => EventKind::DamageMultiplier,
    "DEF_PAR_FRAME" => EventKind::ParryFrame,
    "DEF_OPT_FRAME" => EventKind::OptimalFrame,
    "DEF_HIT_END" => EventKind::HitEnd,
    "DEF_WINDOW" => EventKind::ComboWindow,
};

impl EventKind {
    /// Resolve an event keyword. Unknown keywords map to [`EventKind::Unknown`].
    pub fn from_keyword(keyword: &str) -> Self {
        EVENT_KEYWORDS.get(keyword).copied().unwrap_or(EventKind::Unknown)
    }

    /// Canonical keyword written by the textual generator.
    pub fn keyword(self) -> &'static str {
        match self {
            EventKind::Unknown => "UNKNOWN",
            EventKind::ItemCreate => "DEF_CREATE_ITEM",
            EventKind::ItemInsert => "DEF_INSERT_ITEM",
            EventKind::ItemRemove => "DEF_REMOVE_ITEM",
            EventKind::ItemDestroy => "DEF_DESTROY_ITEM",
            EventKind::ItemPlace => "DEF_PLACE_ITEM",
            EventKind::ItemExchange => "DEF_EXCHANGE_ITEM",
            EventKind::SetFightMode => "DEF_FIGHTMODE",
            EventKind::MunitionPlace => "DEF_PLACE_MUNITION",
            EventKind::MunitionRemove => "DEF_REMOVE_MUNITION",
            EventKind::SoundDraw => "DEF_DRAWSOUND",
            EventKind::SoundUndraw => "DEF_UNDRAWSOUND",
            EventKind::MeshSwap => "DEF_SWAPMESH",
            EventKind::TorchDraw => "DEF_DRAWTORCH",
            EventKind::TorchInventory => "DEF_INV_TORCH",
            EventKind::TorchDrop => "DEF_DROP_TORCH",
            EventKind::HitLimb => "DEF_HIT_LIMB",
            EventKind::HitDirection => "DEF_HIT_DIR",
            EventKind::DamageMultiplier => "DEF_DAM_MULTIPLIER",
            EventKind::ParryFrame => "DEF_PAR_FRAME",
            EventKind::OptimalFrame => "DEF_OPT_FRAME",
            EventKind::HitEnd => "DEF_HIT_END",
            EventKind::ComboWindow => "DEF_WINDOW",
        }
    }

    /// Decode the binary discriminant. Values from newer revisions decode as `Unknown`.
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => EventKind::ItemCreate,
            2 => EventKind::ItemInsert,
            3 => EventKind::ItemRemove,
            4 => EventKind::ItemDestroy,
            5 => EventKind::ItemPlace,
            6 => EventKind::ItemExchange,
            7 => EventKind::SetFightMode,
            8 => EventKind::MunitionPlace,
            9 => EventKind::MunitionRemove,
            10 => EventKind::SoundDraw,
            11 => EventKind::SoundUndraw,
            12 => EventKind::MeshSwap,
            13 => EventKind::TorchDraw,
            14 => EventKind::TorchInventory,
            15 => EventKind::TorchDrop,
            16 => EventKind::HitLimb,
            17 => EventKind::HitDirection,
            18 => EventKind::DamageMultiplier,
            19 => EventKind::ParryFrame,
            20 => EventKind::OptimalFrame,
            21 => EventKind::HitEnd,
            22 => EventKind::ComboWindow,
            _ => EventKind::Unknown,
        }
    }

    /// Order in which the string arguments of an `*eventTag` fill the event's fields.
    pub fn tag_fields(self) -> &'static [TagField] {
        match self {
            EventKind::ItemCreate | EventKind::ItemExchange => &[TagField::Slot, TagField::Item],
            EventKind::ItemInsert | EventKind::MunitionPlace => &[TagField::Slot],
            EventKind::SetFightMode => &[TagField::FightMode],
            EventKind::DamageMultiplier
            | EventKind::ParryFrame
            | EventKind::OptimalFrame
            | EventKind::HitEnd
            | EventKind::ComboWindow => &[TagField::Frames],
            _ => &[TagField::Slot, TagField::Slot2],
        }
    }
}

/// A positional string argument of `*eventTag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Slot,
    Slot2,
    Item,
    FightMode,
    Frames,
}

/// Fight stance an event is scoped to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FightMode {
    Fist = 0,
    SingleHanded = 1,
    DualHanded = 2,
    Bow = 3,
    Crossbow = 4,
    Magic = 5,
    #[default]
    None = 6,
    /// Explicit `unset` marker
    Invalid = 0xFF,
}

static FIGHT_MODES: phf::Map<&'static str, FightMode> = phf_map! {
    "FIST" => FightMode::Fist,
    "1H" => FightMode::SingleHanded,
    "1HS" => FightMode::SingleHanded,
    "2H" => FightMode::DualHanded,
    "2HS" => FightMode::DualHanded,
    "BOW" => FightMode::Bow,
    "CBOW" => FightMode::Crossbow,
    "MAG" => FightMode::Magic,
    "NONE" => FightMode::None,
    "INVALID" => FightMode::Invalid,
};

impl FightMode {
    /// Resolve a fight mode name; an empty name means [`FightMode::None`].
    pub fn from_name(name: &str) -> Option<Self> {
        if name.is_empty() {
            return Some(FightMode::None);
        }
        FIGHT_MODES.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            FightMode::Fist => "FIST",
            FightMode::SingleHanded => "1H",
            FightMode::DualHanded => "2H",
            FightMode::Bow => "BOW",
            FightMode::Crossbow => "CBOW",
            FightMode::Magic => "MAG",
            FightMode::None => "NONE",
            FightMode::Invalid => "INVALID",
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FightMode::Fist),
            1 => Some(FightMode::SingleHanded),
            2 => Some(FightMode::DualHanded),
            3 => Some(FightMode::Bow),
            4 => Some(FightMode::Crossbow),
            5 => Some(FightMode::Magic),
            6 => Some(FightMode::None),
            0xFF => Some(FightMode::Invalid),
            _ => None,
        }
    }
}

bitflags! {
    /// Playback behavior of an animation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AnimationFlags: u8 {
        const MOVE = 1;
        const ROTATE = 2;
        const QUEUE = 4;
        const FLY = 8;
        const IDLE = 16;
        const INPLACE = 32;
    }
}

/// Single-letter spelling of each flag used by compiled scripts and old sources.
const FLAG_LETTERS: [(char, AnimationFlags); 6] = [
    ('M', AnimationFlags::MOVE),
    ('R', AnimationFlags::ROTATE),
    ('E', AnimationFlags::QUEUE),
    ('F', AnimationFlags::FLY),
    ('I', AnimationFlags::IDLE),
    ('P', AnimationFlags::INPLACE),
];

impl Default for AnimationFlags {
    fn default() -> Self {
        Self::NONE
    }
}

impl AnimationFlags {
    pub const NONE: Self = Self::empty();

    /// Parse either a `|`-joined list of names (`MOVE|ROTATE`) or a letter code (`M.`, `MR`).
    ///
    /// Returns `None` if any name or letter is not part of the table.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.is_empty() {
            return Some(Self::NONE);
        }

        if token.chars().all(|c| c == '.' || FLAG_LETTERS.iter().any(|(l, _)| *l == c)) {
            return Self::from_letter_code(token);
        }

        let mut flags = Self::NONE;
        for name in token.split('|') {
            let name = name.trim();
            if name == "NONE" {
                continue;
            }
            flags |= Self::from_name(name)?;
        }
        Some(flags)
    }

    /// Parse a letter code such as `M.` or `MRE`.
    pub fn from_letter_code(code: &str) -> Option<Self> {
        let mut flags = Self::NONE;
        for c in code.chars() {
            if c == '.' {
                continue;
            }
            let (_, flag) = FLAG_LETTERS.iter().find(|(l, _)| *l == c)?;
            flags |= *flag;
        }
        Some(flags)
    }

    /// `|`-joined names in declaration order, `NONE` for the empty set.
    pub fn to_names(self) -> String {
        if self.is_empty() {
            return "NONE".to_string();
        }
        self.iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Letter code, `.` for the empty set.
    pub fn to_letter_code(self) -> String {
        if self.is_empty() {
            return ".".to_string();
        }
        FLAG_LETTERS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(letter, _)| *letter)
            .collect()
    }
}

/// The way the animation samples are played.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AnimationDirection {
    #[default]
    Forward = 0,
    Backward = 1,
}

impl AnimationDirection {
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("F") {
            Some(AnimationDirection::Forward)
        } else if token.eq_ignore_ascii_case("R") {
            Some(AnimationDirection::Backward)
        } else {
            None
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            AnimationDirection::Forward => "F",
            AnimationDirection::Backward => "R",
        }
    }
}

/// Chunk tags of the compiled binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Root,
    End,
    Source,
    MeshAndTree,
    RegisterMesh,
    AnimationEnum,
    AnimationEnumEnd,
    Animation,
    AnimationAlias,
    AnimationBlend,
    AnimationCombine,
    AnimationDisable,
    ModelTag,
    AnimationEvents,
    EventSfx,
    EventSfxGround,
    EventTag,
    EventPfx,
    EventPfxStop,
    EventMmAni,
    EventCameraTremor,
    /// Any tag outside the active set; skipped by length
    Unknown(u16),
}

impl ChunkType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0xF000 => ChunkType::Root,
            0xFFFF => ChunkType::End,
            0xF100 => ChunkType::Source,
            0xF300 => ChunkType::MeshAndTree,
            0xF400 => ChunkType::RegisterMesh,
            0xF500 => ChunkType::AnimationEnum,
            0xF5FF => ChunkType::AnimationEnumEnd,
            0xF520 => ChunkType::Animation,
            0xF530 => ChunkType::AnimationAlias,
            0xF540 => ChunkType::AnimationBlend,
            0xF570 => ChunkType::AnimationCombine,
            0xF580 => ChunkType::AnimationDisable,
            0xF590 => ChunkType::ModelTag,
            0xF5A0 => ChunkType::AnimationEvents,
            0xF5A1 => ChunkType::EventSfx,
            0xF5A2 => ChunkType::EventSfxGround,
            0xF5A3 => ChunkType::EventTag,
            0xF5A4 => ChunkType::EventPfx,
            0xF5A5 => ChunkType::EventPfxStop,
            0xF5A9 => ChunkType::EventMmAni,
            0xF5AA => ChunkType::EventCameraTremor,
            other => ChunkType::Unknown(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            ChunkType::Root => 0xF000,
            ChunkType::End => 0xFFFF,
            ChunkType::Source => 0xF100,
            ChunkType::MeshAndTree => 0xF300,
            ChunkType::RegisterMesh => 0xF400,
            ChunkType::AnimationEnum => 0xF500,
            ChunkType::AnimationEnumEnd => 0xF5FF,
            ChunkType::Animation => 0xF520,
            ChunkType::AnimationAlias => 0xF530,
            ChunkType::AnimationBlend => 0xF540,
            ChunkType::AnimationCombine => 0xF570,
            ChunkType::AnimationDisable => 0xF580,
            ChunkType::ModelTag => 0xF590,
            ChunkType::AnimationEvents => 0xF5A0,
            ChunkType::EventSfx => 0xF5A1,
            ChunkType::EventSfxGround => 0xF5A2,
            ChunkType::EventTag => 0xF5A3,
            ChunkType::EventPfx => 0xF5A4,
            ChunkType::EventPfxStop => 0xF5A5,
            ChunkType::EventMmAni => 0xF5A9,
            ChunkType::EventCameraTremor => 0xF5AA,
            ChunkType::Unknown(value) => value,
        }
    }

    /// Chunks that belong to the most recently opened animation.
    pub fn is_event(self) -> bool {
        matches!(
            self,
            ChunkType::AnimationEvents
                | ChunkType::EventSfx
                | ChunkType::EventSfxGround
                | ChunkType::EventTag
                | ChunkType::EventPfx
                | ChunkType::EventPfxStop
                | ChunkType::EventMmAni
                | ChunkType::EventCameraTremor
        )
    }
}

/// Structural keywords of the textual grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Model,
    MeshAndTree,
    RegisterMesh,
    AniEnum,
    ModelTag,
    Ani,
    AniAlias,
    AniBlend,
    AniComb,
    AniDisable,
    EventTag,
    EventSfx,
    EventSfxGround,
    EventPfx,
    EventPfxStop,
    EventMorphAni,
    EventCamTremor,
}

/// Lowercased spellings; lookups lowercase the token first.
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "model" => Keyword::Model,
    "meshandtree" => Keyword::MeshAndTree,
    "registermesh" => Keyword::RegisterMesh,
    "anienum" => Keyword::AniEnum,
    "modeltag" => Keyword::ModelTag,
    "ani" => Keyword::Ani,
    "anialias" => Keyword::AniAlias,
    "aniblend" => Keyword::AniBlend,
    "anicomb" => Keyword::AniComb,
    "anidisable" => Keyword::AniDisable,
    "*eventtag" => Keyword::EventTag,
    "*eventsfx" => Keyword::EventSfx,
    "*eventsfxgrnd" => Keyword::EventSfxGround,
    "*eventpfx" => Keyword::EventPfx,
    "*eventpfxstop" => Keyword::EventPfxStop,
    "*eventmmstartani" => Keyword::EventMorphAni,
    "*eventcamtremor" => Keyword::EventCamTremor,
};

impl Keyword {
    pub fn lookup(word: &str) -> Option<Self> {
        KEYWORDS.get(word.to_ascii_lowercase().as_str()).copied()
    }

    pub fn is_event(self) -> bool {
        matches!(
            self,
            Keyword::EventTag
                | Keyword::EventSfx
                | Keyword::EventSfxGround
                | Keyword::EventPfx
                | Keyword::EventPfxStop
                | Keyword::EventMorphAni
                | Keyword::EventCamTremor
        )
    }

    /// Spelling used by the textual generator and in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Model => "Model",
            Keyword::MeshAndTree => "meshAndTree",
            Keyword::RegisterMesh => "registerMesh",
            Keyword::AniEnum => "aniEnum",
            Keyword::ModelTag => "modelTag",
            Keyword::Ani => "ani",
            Keyword::AniAlias => "aniAlias",
            Keyword::AniBlend => "aniBlend",
            Keyword::AniComb => "aniComb",
            Keyword::AniDisable => "aniDisable",
            Keyword::EventTag => "*eventTag",
            Keyword::EventSfx => "*eventSFX",
            Keyword::EventSfxGround => "*eventSFXGrnd",
            Keyword::EventPfx => "*eventPFX",
            Keyword::EventPfxStop => "*eventPFXStop",
            Keyword::EventMorphAni => "*eventMMStartAni",
            Keyword::EventCamTremor => "*eventCamTremor",
        }
    }
}
