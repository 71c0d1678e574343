//! Chunk Payload Serialization Module
//!
//! Writes each model entity as the payload of its chunk. Layouts mirror `parsing.rs`
//! field for field; nothing is omitted, so a decoded payload compares equal to its source.

use bytes::{BufMut, BytesMut};

use crate::errors::MdsResult;
use crate::model::{
    MdsAnimation, MdsAnimationAlias, MdsAnimationBlend, MdsAnimationCombine, MdsCameraTremor,
    MdsEventTag, MdsModelTag, MdsMorphAnimation, MdsParticleEffect, MdsParticleEffectStop,
    MdsSkeleton, MdsSoundEffect, MdsSoundEffectGround,
};
use crate::tables::EventKind;
use crate::traits::MdsWriter;
use crate::utils::{write_bool, write_line};

impl MdsWriter for MdsSkeleton {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        write_bool(buffer, self.disable_mesh);
        write_line(buffer, &self.name);
        Ok(())
    }
}

impl MdsWriter for MdsModelTag {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(0); // frame
        buffer.put_u32_le(EventKind::HitLimb as u32);
        write_line(buffer, &self.bone);
        Ok(())
    }
}

impl MdsWriter for MdsAnimation {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        write_line(buffer, &self.name);
        buffer.put_u32_le(self.layer);
        write_line(buffer, &self.next);
        buffer.put_f32_le(self.blend_in);
        buffer.put_f32_le(self.blend_out);
        write_line(buffer, &self.flags.to_letter_code());
        write_line(buffer, &self.model);
        write_line(buffer, self.direction.as_token());
        buffer.put_i32_le(self.first_frame);
        buffer.put_i32_le(self.last_frame);
        buffer.put_f32_le(self.fps);
        buffer.put_f32_le(self.speed);
        buffer.put_f32_le(self.collision_volume_scale);
        Ok(())
    }
}

impl MdsWriter for MdsAnimationAlias {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        write_line(buffer, &self.name);
        buffer.put_u32_le(self.layer);
        write_line(buffer, &self.next);
        buffer.put_f32_le(self.blend_in);
        buffer.put_f32_le(self.blend_out);
        write_line(buffer, &self.flags.to_letter_code());
        write_line(buffer, &self.alias);
        write_line(buffer, self.direction.as_token());
        Ok(())
    }
}

impl MdsWriter for MdsAnimationBlend {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        write_line(buffer, &self.name);
        buffer.put_u32_le(self.layer);
        write_line(buffer, &self.next);
        buffer.put_f32_le(self.blend_in);
        buffer.put_f32_le(self.blend_out);
        Ok(())
    }
}

impl MdsWriter for MdsAnimationCombine {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        write_line(buffer, &self.name);
        buffer.put_u32_le(self.layer);
        write_line(buffer, &self.next);
        buffer.put_f32_le(self.blend_in);
        buffer.put_f32_le(self.blend_out);
        write_line(buffer, &self.flags.to_letter_code());
        write_line(buffer, &self.model);
        buffer.put_i32_le(self.last_frame);
        Ok(())
    }
}

impl MdsWriter for MdsEventTag {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        buffer.put_u32_le(self.kind as u32);
        write_line(buffer, &self.slot);
        write_line(buffer, &self.slot2);
        write_line(buffer, &self.item);
        buffer.put_u32_le(self.frames.len() as u32);
        for frame in &self.frames {
            buffer.put_i32_le(*frame);
        }
        buffer.put_u8(self.fight_mode as u8);
        write_bool(buffer, self.attached);
        Ok(())
    }
}

impl MdsWriter for MdsSoundEffect {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        write_line(buffer, &self.name);
        buffer.put_f32_le(self.range);
        write_bool(buffer, self.empty_slot);
        Ok(())
    }
}

impl MdsWriter for MdsSoundEffectGround {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        write_line(buffer, &self.name);
        buffer.put_f32_le(self.range);
        write_bool(buffer, self.empty_slot);
        Ok(())
    }
}

impl MdsWriter for MdsParticleEffect {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        buffer.put_i32_le(self.index);
        write_line(buffer, &self.name);
        write_line(buffer, &self.position);
        write_bool(buffer, self.attached);
        Ok(())
    }
}

impl MdsWriter for MdsParticleEffectStop {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        buffer.put_i32_le(self.index);
        Ok(())
    }
}

impl MdsWriter for MdsMorphAnimation {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        write_line(buffer, &self.animation);
        write_line(buffer, &self.node);
        Ok(())
    }
}

impl MdsWriter for MdsCameraTremor {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        buffer.put_i32_le(self.frame);
        buffer.put_i32_le(self.field1);
        buffer.put_i32_le(self.field2);
        buffer.put_i32_le(self.field3);
        buffer.put_i32_le(self.field4);
        Ok(())
    }
}
