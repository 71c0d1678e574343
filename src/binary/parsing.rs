//! Chunk Payload Parsing Module
//!
//! Decodes the payload of each recognized chunk into its model entity. Every decoder reads
//! its fields in the fixed order of the compiled format and leaves any trailing bytes for
//! the stream parser to reject.

use bytes::{Buf, Bytes};

use crate::errors::{MdsError, MdsResult, SourceLocation};
use crate::model::{
    MdsAnimation, MdsAnimationAlias, MdsAnimationBlend, MdsAnimationCombine, MdsCameraTremor,
    MdsEventTag, MdsModelTag, MdsMorphAnimation, MdsParticleEffect, MdsParticleEffectStop,
    MdsSkeleton, MdsSoundEffect, MdsSoundEffectGround,
};
use crate::tables::{AnimationDirection, AnimationFlags, EventKind, FightMode};
use crate::traits::MdsParser;
use crate::utils::{read_bool, read_f32, read_i32, read_line, read_u32, read_u8};

fn invalid_value(field: &str, value: String) -> MdsError {
    // the stream parser replaces the location with the chunk offset
    MdsError::InvalidEnumValue {
        field: field.to_string(),
        value,
        location: SourceLocation::Offset(0),
    }
}

fn read_flags(data: &mut Bytes) -> MdsResult<AnimationFlags> {
    let code = read_line(data)?;
    AnimationFlags::from_letter_code(&code).ok_or_else(|| invalid_value("flags", code))
}

fn read_direction(data: &mut Bytes) -> MdsResult<AnimationDirection> {
    let token = read_line(data)?;
    AnimationDirection::from_token(&token).ok_or_else(|| invalid_value("direction", token))
}

impl MdsParser for MdsSkeleton {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        let disable_mesh = read_bool(data)?;
        let name = read_line(data)?;
        Ok(MdsSkeleton { name, disable_mesh })
    }
}

impl MdsParser for MdsModelTag {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        let _frame = read_i32(data)?;
        let kind = EventKind::from_u32(read_u32(data)?);
        if kind != EventKind::HitLimb {
            log::debug!("model tag with event kind {:?}, expected HitLimb", kind);
        }
        Ok(MdsModelTag {
            bone: read_line(data)?,
        })
    }
}

impl MdsParser for MdsAnimation {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsAnimation {
            name: read_line(data)?,
            layer: read_u32(data)?,
            next: read_line(data)?,
            blend_in: read_f32(data)?,
            blend_out: read_f32(data)?,
            flags: read_flags(data)?,
            model: read_line(data)?,
            direction: read_direction(data)?,
            first_frame: read_i32(data)?,
            last_frame: read_i32(data)?,
            fps: read_f32(data)?,
            speed: read_f32(data)?,
            collision_volume_scale: read_f32(data)?,
            ..Default::default()
        })
    }
}

impl MdsParser for MdsAnimationAlias {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsAnimationAlias {
            name: read_line(data)?,
            layer: read_u32(data)?,
            next: read_line(data)?,
            blend_in: read_f32(data)?,
            blend_out: read_f32(data)?,
            flags: read_flags(data)?,
            alias: read_line(data)?,
            direction: read_direction(data)?,
        })
    }
}

impl MdsParser for MdsAnimationBlend {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsAnimationBlend {
            name: read_line(data)?,
            layer: read_u32(data)?,
            next: read_line(data)?,
            blend_in: read_f32(data)?,
            blend_out: read_f32(data)?,
        })
    }
}

impl MdsParser for MdsAnimationCombine {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsAnimationCombine {
            name: read_line(data)?,
            layer: read_u32(data)?,
            next: read_line(data)?,
            blend_in: read_f32(data)?,
            blend_out: read_f32(data)?,
            flags: read_flags(data)?,
            model: read_line(data)?,
            last_frame: read_i32(data)?,
        })
    }
}

impl MdsParser for MdsEventTag {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        let frame = read_i32(data)?;
        let kind = EventKind::from_u32(read_u32(data)?);
        let slot = read_line(data)?;
        let slot2 = read_line(data)?;
        let item = read_line(data)?;

        let frame_count = read_u32(data)? as usize;
        if frame_count > data.remaining() / 4 {
            return Err(MdsError::MalformedChunk {
                tag: 0,
                offset: 0,
                reason: format!(
                    "frame list of {} entries does not fit in {} remaining bytes",
                    frame_count,
                    data.remaining()
                ),
            });
        }
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            frames.push(read_i32(data)?);
        }

        let mode = read_u8(data)?;
        let fight_mode =
            FightMode::from_u8(mode).ok_or_else(|| invalid_value("fight_mode", mode.to_string()))?;

        Ok(MdsEventTag {
            frame,
            kind,
            slot,
            slot2,
            item,
            frames,
            fight_mode,
            attached: read_bool(data)?,
        })
    }
}

impl MdsParser for MdsSoundEffect {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsSoundEffect {
            frame: read_i32(data)?,
            name: read_line(data)?,
            range: read_f32(data)?,
            empty_slot: read_bool(data)?,
        })
    }
}

impl MdsParser for MdsSoundEffectGround {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsSoundEffectGround {
            frame: read_i32(data)?,
            name: read_line(data)?,
            range: read_f32(data)?,
            empty_slot: read_bool(data)?,
        })
    }
}

impl MdsParser for MdsParticleEffect {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsParticleEffect {
            frame: read_i32(data)?,
            index: read_i32(data)?,
            name: read_line(data)?,
            position: read_line(data)?,
            attached: read_bool(data)?,
        })
    }
}

impl MdsParser for MdsParticleEffectStop {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsParticleEffectStop {
            frame: read_i32(data)?,
            index: read_i32(data)?,
        })
    }
}

impl MdsParser for MdsMorphAnimation {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsMorphAnimation {
            frame: read_i32(data)?,
            animation: read_line(data)?,
            node: read_line(data)?,
        })
    }
}

impl MdsParser for MdsCameraTremor {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        Ok(MdsCameraTremor {
            frame: read_i32(data)?,
            field1: read_i32(data)?,
            field2: read_i32(data)?,
            field3: read_i32(data)?,
            field4: read_i32(data)?,
        })
    }
}
