//! Chunk Stream Generator Module

use bytes::{BufMut, BytesMut};

use super::MSB_VERSION;
use crate::errors::{MdsError, MdsResult};
use crate::model::{MdsAnimation, MdsElementType, MdsEventType, MdsLine};
use crate::tables::ChunkType;
use crate::traits::MdsWriter;
use crate::utils::{write_chunk, write_line};
use crate::ModelScript;

/// Compiles a [`ModelScript`] into the flat chunk stream.
pub struct MdsBinaryGenerator<'a> {
    script: &'a ModelScript,
    model_name: &'a str,
}

impl<'a> MdsBinaryGenerator<'a> {
    pub fn new(script: &'a ModelScript, model_name: &'a str) -> Self {
        Self { script, model_name }
    }

    pub fn generate(&self) -> MdsResult<Vec<u8>> {
        let mut buffer = BytesMut::new();
        self.to_bytes(&mut buffer)?;
        Ok(buffer.to_vec())
    }

    fn write_element(&self, buffer: &mut BytesMut, line: MdsLine) -> MdsResult<()> {
        let script = self.script;
        match line.kind {
            MdsElementType::Skeleton => {
                write_chunk(buffer, ChunkType::MeshAndTree, |b| script.skeleton.to_bytes(b))
            },
            MdsElementType::Mesh => {
                let mesh = lookup(&script.meshes, line)?;
                write_chunk(buffer, ChunkType::RegisterMesh, |b| {
                    write_line(b, mesh);
                    Ok(())
                })
            },
            MdsElementType::AnimationDisabled => {
                let name = lookup(&script.disabled_animations, line)?;
                write_chunk(buffer, ChunkType::AnimationDisable, |b| {
                    write_line(b, name);
                    Ok(())
                })
            },
            MdsElementType::ModelTag => {
                let tag = lookup(&script.model_tags, line)?;
                write_chunk(buffer, ChunkType::ModelTag, |b| tag.to_bytes(b))
            },
            MdsElementType::AniEnum => write_chunk(buffer, ChunkType::AnimationEnum, |_| Ok(())),
            MdsElementType::AniEnumEnd => {
                write_chunk(buffer, ChunkType::AnimationEnumEnd, |_| Ok(()))
            },
            MdsElementType::Animation => {
                let animation = lookup(&script.animations, line)?;
                write_chunk(buffer, ChunkType::Animation, |b| animation.to_bytes(b))?;
                write_events(buffer, animation)
            },
            MdsElementType::AnimationAlias => {
                let alias = lookup(&script.aliases, line)?;
                write_chunk(buffer, ChunkType::AnimationAlias, |b| alias.to_bytes(b))
            },
            MdsElementType::AnimationBlend => {
                let blend = lookup(&script.blends, line)?;
                write_chunk(buffer, ChunkType::AnimationBlend, |b| blend.to_bytes(b))
            },
            MdsElementType::AnimationCombine => {
                let combination = lookup(&script.combinations, line)?;
                write_chunk(buffer, ChunkType::AnimationCombine, |b| combination.to_bytes(b))
            },
        }
    }
}

impl MdsWriter for MdsBinaryGenerator<'_> {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()> {
        write_chunk(buffer, ChunkType::Root, |b| {
            b.put_u32_le(MSB_VERSION);
            Ok(())
        })?;
        write_chunk(buffer, ChunkType::Source, |b| {
            write_line(b, self.model_name);
            Ok(())
        })?;

        for line in self.script.elements() {
            self.write_element(buffer, line)?;
        }

        write_chunk(buffer, ChunkType::End, |_| Ok(()))
    }
}

fn write_events(buffer: &mut BytesMut, animation: &MdsAnimation) -> MdsResult<()> {
    if animation.event_count() == 0 {
        return Ok(());
    }

    write_chunk(buffer, ChunkType::AnimationEvents, |b| {
        b.put_u32_le(animation.event_count() as u32);
        Ok(())
    })?;

    for event in animation.events_in_order() {
        let index = event.index;
        let missing = || MdsError::dangling_event(&animation.name, event.kind, index);
        match event.kind {
            MdsEventType::EventTag => {
                let tag = animation.events.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventTag, |b| tag.to_bytes(b))?;
            },
            MdsEventType::SoundEffect => {
                let sfx = animation.sfx.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventSfx, |b| sfx.to_bytes(b))?;
            },
            MdsEventType::SoundEffectGround => {
                let sfx = animation.sfx_ground.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventSfxGround, |b| sfx.to_bytes(b))?;
            },
            MdsEventType::ParticleEffect => {
                let pfx = animation.pfx.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventPfx, |b| pfx.to_bytes(b))?;
            },
            MdsEventType::ParticleEffectStop => {
                let stop = animation.pfx_stop.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventPfxStop, |b| stop.to_bytes(b))?;
            },
            MdsEventType::MorphAnimation => {
                let morph = animation.morph.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventMmAni, |b| morph.to_bytes(b))?;
            },
            MdsEventType::CameraTremor => {
                let tremor = animation.tremors.get(index).ok_or_else(missing)?;
                write_chunk(buffer, ChunkType::EventCameraTremor, |b| tremor.to_bytes(b))?;
            },
        }
    }
    Ok(())
}

fn lookup<T>(items: &[T], line: MdsLine) -> MdsResult<&T> {
    items
        .get(line.index)
        .ok_or_else(|| MdsError::dangling_element(line.kind, line.index))
}
