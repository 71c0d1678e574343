use serde::{Deserialize, Serialize};

use crate::tables::{AnimationDirection, AnimationFlags, EventKind, FightMode};

/// Frame rate assumed when an `ani` declaration carries no `FPS:` token
pub const DEFAULT_FPS: f32 = 25.0;

/// Collision volume scale assumed when an `ani` declaration carries no `CVS:` token
pub const DEFAULT_COLLISION_VOLUME_SCALE: f32 = 1.0;

/// Audible range assumed when a sound event carries no `R:` token
pub const DEFAULT_SOUND_RANGE: f32 = 1000.0;

/// The `meshAndTree` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsSkeleton {
    pub name: String,
    pub disable_mesh: bool,
}

/// The `modelTag` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsModelTag {
    pub bone: String,
}

/// The `*eventTag` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsEventTag {
    pub frame: i32,
    pub kind: EventKind,
    pub slot: String,
    pub slot2: String,
    pub item: String,
    /// Only meaningful for the hit-timing kinds (`DEF_OPT_FRAME`, `DEF_WINDOW`, ...)
    pub frames: Vec<i32>,
    pub fight_mode: FightMode,
    pub attached: bool,
}

/// The `*eventPFX` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsParticleEffect {
    pub frame: i32,
    pub index: i32,
    pub name: String,
    pub position: String,
    pub attached: bool,
}

/// The `*eventPFXStop` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsParticleEffectStop {
    pub frame: i32,
    pub index: i32,
}

/// The `*eventSFX` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsSoundEffect {
    pub frame: i32,
    pub name: String,
    pub range: f32,
    pub empty_slot: bool,
}

impl Default for MdsSoundEffect {
    fn default() -> Self {
        Self {
            frame: 0,
            name: String::new(),
            range: DEFAULT_SOUND_RANGE,
            empty_slot: false,
        }
    }
}

/// The `*eventSFXGrnd` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsSoundEffectGround {
    pub frame: i32,
    pub name: String,
    pub range: f32,
    pub empty_slot: bool,
}

impl Default for MdsSoundEffectGround {
    fn default() -> Self {
        Self {
            frame: 0,
            name: String::new(),
            range: DEFAULT_SOUND_RANGE,
            empty_slot: false,
        }
    }
}

/// The `*eventMMStartAni` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsMorphAnimation {
    pub frame: i32,
    pub animation: String,
    pub node: String,
}

/// The `*eventCamTremor` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsCameraTremor {
    pub frame: i32,
    pub field1: i32,
    pub field2: i32,
    pub field3: i32,
    pub field4: i32,
}

/// Which event sequence of an [`MdsAnimation`] an [`MdsEventLine`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MdsEventType {
    EventTag,
    ParticleEffect,
    ParticleEffectStop,
    SoundEffect,
    SoundEffectGround,
    MorphAnimation,
    CameraTremor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdsEventLine {
    pub kind: MdsEventType,
    pub index: usize,
}

/// The `ani` declaration together with its event body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsAnimation {
    pub name: String,
    pub layer: u32,
    pub next: String,
    pub blend_in: f32,
    pub blend_out: f32,
    pub flags: AnimationFlags,
    pub model: String,
    pub direction: AnimationDirection,
    pub first_frame: i32,
    pub last_frame: i32,
    pub fps: f32,
    pub speed: f32,
    pub collision_volume_scale: f32,

    pub events: Vec<MdsEventTag>,
    pub pfx: Vec<MdsParticleEffect>,
    pub pfx_stop: Vec<MdsParticleEffectStop>,
    pub sfx: Vec<MdsSoundEffect>,
    pub sfx_ground: Vec<MdsSoundEffectGround>,
    pub morph: Vec<MdsMorphAnimation>,
    pub tremors: Vec<MdsCameraTremor>,

    /// Declaration order across all event sequences
    pub event_lines: Vec<MdsEventLine>,
}

impl Default for MdsAnimation {
    fn default() -> Self {
        Self {
            name: String::new(),
            layer: 0,
            next: String::new(),
            blend_in: 0.0,
            blend_out: 0.0,
            flags: AnimationFlags::NONE,
            model: String::new(),
            direction: AnimationDirection::Forward,
            first_frame: 0,
            last_frame: 0,
            fps: DEFAULT_FPS,
            speed: 0.0,
            collision_volume_scale: DEFAULT_COLLISION_VOLUME_SCALE,
            events: vec![],
            pfx: vec![],
            pfx_stop: vec![],
            sfx: vec![],
            sfx_ground: vec![],
            morph: vec![],
            tremors: vec![],
            event_lines: vec![],
        }
    }
}

impl MdsAnimation {
    pub fn push_event_tag(&mut self, event: MdsEventTag) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::EventTag,
            index: self.events.len(),
        });
        self.events.push(event);
    }

    pub fn push_pfx(&mut self, pfx: MdsParticleEffect) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::ParticleEffect,
            index: self.pfx.len(),
        });
        self.pfx.push(pfx);
    }

    pub fn push_pfx_stop(&mut self, stop: MdsParticleEffectStop) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::ParticleEffectStop,
            index: self.pfx_stop.len(),
        });
        self.pfx_stop.push(stop);
    }

    pub fn push_sfx(&mut self, sfx: MdsSoundEffect) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::SoundEffect,
            index: self.sfx.len(),
        });
        self.sfx.push(sfx);
    }

    pub fn push_sfx_ground(&mut self, sfx: MdsSoundEffectGround) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::SoundEffectGround,
            index: self.sfx_ground.len(),
        });
        self.sfx_ground.push(sfx);
    }

    pub fn push_morph(&mut self, morph: MdsMorphAnimation) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::MorphAnimation,
            index: self.morph.len(),
        });
        self.morph.push(morph);
    }

    pub fn push_tremor(&mut self, tremor: MdsCameraTremor) {
        self.event_lines.push(MdsEventLine {
            kind: MdsEventType::CameraTremor,
            index: self.tremors.len(),
        });
        self.tremors.push(tremor);
    }

    /// Total number of events across all sequences
    pub fn event_count(&self) -> usize {
        self.events.len()
            + self.pfx.len()
            + self.pfx_stop.len()
            + self.sfx.len()
            + self.sfx_ground.len()
            + self.morph.len()
            + self.tremors.len()
    }

    /// Events in declaration order.
    ///
    /// Falls back to grouping by sequence when no order was recorded, which only happens for
    /// animations assembled without the `push_*` helpers.
    pub fn events_in_order(&self) -> Box<dyn Iterator<Item = MdsEventLine> + '_> {
        if !self.event_lines.is_empty() || self.event_count() == 0 {
            return Box::new(self.event_lines.iter().copied());
        }

        let group = |kind: MdsEventType, len: usize| {
            (0..len).map(move |index| MdsEventLine { kind, index })
        };
        Box::new(
            group(MdsEventType::EventTag, self.events.len())
                .chain(group(MdsEventType::ParticleEffect, self.pfx.len()))
                .chain(group(MdsEventType::ParticleEffectStop, self.pfx_stop.len()))
                .chain(group(MdsEventType::SoundEffect, self.sfx.len()))
                .chain(group(MdsEventType::SoundEffectGround, self.sfx_ground.len()))
                .chain(group(MdsEventType::MorphAnimation, self.morph.len()))
                .chain(group(MdsEventType::CameraTremor, self.tremors.len())),
        )
    }
}

/// The `aniAlias` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsAnimationAlias {
    pub name: String,
    pub layer: u32,
    pub next: String,
    pub blend_in: f32,
    pub blend_out: f32,
    pub flags: AnimationFlags,
    pub alias: String,
    pub direction: AnimationDirection,
}

/// The `aniBlend` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsAnimationBlend {
    pub name: String,
    pub layer: u32,
    pub next: String,
    pub blend_in: f32,
    pub blend_out: f32,
}

/// The `aniComb` declaration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdsAnimationCombine {
    pub name: String,
    pub layer: u32,
    pub next: String,
    pub blend_in: f32,
    pub blend_out: f32,
    pub flags: AnimationFlags,
    pub model: String,
    pub last_frame: i32,
}

/// Kind of a top-level element of a model script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MdsElementType {
    Skeleton,
    Animation,
    AnimationAlias,
    AnimationBlend,
    AnimationCombine,
    AnimationDisabled,
    ModelTag,
    Mesh,
    AniEnum,
    AniEnumEnd,
}

/// One top-level element in source order; `index` points into the matching sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdsLine {
    pub kind: MdsElementType,
    pub index: usize,
}
