//! Chunk Stream Parser Module
//!
//! Walks the chunk stream of a compiled script and assembles the model. Event chunks
//! attach to the animation opened by the most recent `Animation` chunk. The chunks after
//! the root may follow it as siblings or sit inside its payload.

use byteorder::{ByteOrder, LittleEndian};
use bytes::{Buf, Bytes};

use crate::errors::{MdsError, MdsResult};
use crate::model::{
    MdsAnimation, MdsAnimationAlias, MdsAnimationBlend, MdsAnimationCombine, MdsCameraTremor,
    MdsEventTag, MdsModelTag, MdsMorphAnimation, MdsParticleEffect, MdsParticleEffectStop,
    MdsSkeleton, MdsSoundEffect, MdsSoundEffectGround,
};
use crate::tables::ChunkType;
use crate::traits::MdsParser;
use crate::utils::{read_line, read_u16, read_u32, ChunkErrorContext, CHUNK_HEADER_SIZE};
use crate::{ModelScript, ParserConfig, ResourceTracker};

/// Parse a compiled script with default configuration
pub fn parse_chunks(data: &mut Bytes) -> MdsResult<ModelScript> {
    let config = ParserConfig::default();
    let mut tracker = ResourceTracker::new();
    parse_chunks_with_config(data, &config, &mut tracker)
}

/// Parse a compiled script with resource tracking and limits
pub fn parse_chunks_with_config(
    data: &mut Bytes,
    config: &ParserConfig,
    tracker: &mut ResourceTracker,
) -> MdsResult<ModelScript> {
    if data.is_empty() {
        return Err(MdsError::TruncatedStream {
            offset: 0,
            needed: CHUNK_HEADER_SIZE,
            available: 0,
        });
    }

    let mut decoder = ChunkDecoder::new(config);
    decoder.walk(data, 0, tracker)?;
    decoder.finish()
}

/// Decoding state carried between chunks.
struct ChunkDecoder<'a> {
    config: &'a ParserConfig,
    script: ModelScript,
    seen_root: bool,
    open_animation: Option<usize>,
    announced_events: Option<usize>,
}

impl<'a> ChunkDecoder<'a> {
    fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            script: ModelScript::default(),
            seen_root: false,
            open_animation: None,
            announced_events: None,
        }
    }

    /// Decode the chunks in `data`, whose first byte sits at `base` in the whole stream.
    /// Returns `true` once an `End` chunk was read.
    fn walk(&mut self, data: &mut Bytes, base: usize, tracker: &mut ResourceTracker) -> MdsResult<bool> {
        let total = data.len();

        while !data.is_empty() {
            let offset = base + total - data.remaining();
            if data.remaining() < CHUNK_HEADER_SIZE {
                return Err(MdsError::TruncatedStream {
                    offset,
                    needed: CHUNK_HEADER_SIZE,
                    available: data.remaining(),
                });
            }

            let tag = read_u16(data)?;
            let length = read_u32(data)? as usize;
            if length > data.remaining() {
                return Err(MdsError::TruncatedStream {
                    offset,
                    needed: CHUNK_HEADER_SIZE + length,
                    available: CHUNK_HEADER_SIZE + data.remaining(),
                });
            }

            tracker.track_chunk(self.config)?;
            let mut payload = data.split_to(length);
            let chunk = ChunkType::from_u16(tag);

            if chunk == ChunkType::End && self.seen_root {
                log::trace!("end chunk at offset {}", offset);
                return Ok(true);
            }

            if chunk == ChunkType::Root && !self.seen_root {
                self.seen_root = true;
                read_root_version(&mut payload);
                let nested = offset + CHUNK_HEADER_SIZE + length - payload.len();
                if self.walk(&mut payload, nested, tracker)? {
                    return Ok(true);
                }
                continue;
            }

            self.decode(chunk, &mut payload, tracker).at_chunk(tag, offset)?;

            if !payload.is_empty() && !matches!(chunk, ChunkType::Unknown(_)) {
                return Err(MdsError::MalformedChunk {
                    tag,
                    offset,
                    reason: format!("{} unread payload bytes", payload.len()),
                });
            }
        }

        Ok(false)
    }

    fn decode(
        &mut self,
        chunk: ChunkType,
        payload: &mut Bytes,
        tracker: &mut ResourceTracker,
    ) -> MdsResult<()> {
        if !self.seen_root {
            return Err(malformed("stream does not start with a root chunk"));
        }

        if chunk.is_event() {
            return self.decode_event(chunk, payload);
        }

        if let ChunkType::Unknown(tag) = chunk {
            log::debug!("skipping unknown chunk 0x{:04X} ({} bytes)", tag, payload.len());
            payload.advance(payload.len());
            return Ok(());
        }

        self.close_animation();

        match chunk {
            ChunkType::Root => return Err(malformed("nested root chunk")),
            ChunkType::Source => {
                let name = read_line(payload)?;
                check_strings(self.config, &[&name])?;
                log::debug!("compiled from model '{}'", name);
                return Ok(());
            },
            _ => {},
        }

        tracker.track_declaration(self.config)?;
        let config = self.config;
        let script = &mut self.script;
        match chunk {
            ChunkType::MeshAndTree => {
                let skeleton = MdsSkeleton::from_bytes(payload)?;
                check_strings(config, &[&skeleton.name])?;
                script.push_skeleton(skeleton);
            },
            ChunkType::RegisterMesh => {
                let mesh = read_line(payload)?;
                check_strings(config, &[&mesh])?;
                script.push_mesh(mesh);
            },
            ChunkType::AnimationEnum => script.push_ani_enum(),
            ChunkType::AnimationEnumEnd => script.push_ani_enum_end(),
            ChunkType::AnimationDisable => {
                let name = read_line(payload)?;
                check_strings(config, &[&name])?;
                script.push_disabled_animation(name);
            },
            ChunkType::ModelTag => {
                let tag = MdsModelTag::from_bytes(payload)?;
                check_strings(config, &[&tag.bone])?;
                script.push_model_tag(tag);
            },
            ChunkType::Animation => {
                let ani = MdsAnimation::from_bytes(payload)?;
                check_strings(config, &[&ani.name, &ani.next, &ani.model])?;
                self.open_animation = Some(script.push_animation(ani));
            },
            ChunkType::AnimationAlias => {
                let alias = MdsAnimationAlias::from_bytes(payload)?;
                check_strings(config, &[&alias.name, &alias.next, &alias.alias])?;
                script.push_alias(alias);
            },
            ChunkType::AnimationBlend => {
                let blend = MdsAnimationBlend::from_bytes(payload)?;
                check_strings(config, &[&blend.name, &blend.next])?;
                script.push_blend(blend);
            },
            ChunkType::AnimationCombine => {
                let comb = MdsAnimationCombine::from_bytes(payload)?;
                check_strings(config, &[&comb.name, &comb.next, &comb.model])?;
                script.push_combination(comb);
            },
            // handled before dispatch
            _ => {},
        }
        Ok(())
    }

    fn decode_event(&mut self, chunk: ChunkType, payload: &mut Bytes) -> MdsResult<()> {
        let index = self
            .open_animation
            .ok_or_else(|| malformed("event chunk outside of an animation"))?;
        let animation = &mut self.script.animations[index];

        match chunk {
            ChunkType::AnimationEvents => {
                self.announced_events = Some(read_u32(payload)? as usize);
                return Ok(());
            },
            ChunkType::EventTag => {
                let tag = MdsEventTag::from_bytes(payload)?;
                check_strings(self.config, &[&tag.slot, &tag.slot2, &tag.item])?;
                animation.push_event_tag(tag);
            },
            ChunkType::EventSfx => {
                let sfx = MdsSoundEffect::from_bytes(payload)?;
                check_strings(self.config, &[&sfx.name])?;
                animation.push_sfx(sfx);
            },
            ChunkType::EventSfxGround => {
                let sfx = MdsSoundEffectGround::from_bytes(payload)?;
                check_strings(self.config, &[&sfx.name])?;
                animation.push_sfx_ground(sfx);
            },
            ChunkType::EventPfx => {
                let pfx = MdsParticleEffect::from_bytes(payload)?;
                check_strings(self.config, &[&pfx.name, &pfx.position])?;
                animation.push_pfx(pfx);
            },
            ChunkType::EventPfxStop => {
                animation.push_pfx_stop(MdsParticleEffectStop::from_bytes(payload)?)
            },
            ChunkType::EventMmAni => {
                let morph = MdsMorphAnimation::from_bytes(payload)?;
                check_strings(self.config, &[&morph.animation, &morph.node])?;
                animation.push_morph(morph);
            },
            ChunkType::EventCameraTremor => {
                animation.push_tremor(MdsCameraTremor::from_bytes(payload)?)
            },
            _ => {},
        }

        self.config.check_event_count(animation.event_count())
    }

    fn close_animation(&mut self) {
        if let Some(index) = self.open_animation.take() {
            let animation = &self.script.animations[index];
            if let Some(announced) = self.announced_events.take() {
                if announced != animation.event_count() {
                    log::warn!(
                        "animation '{}' announced {} events but {} were read",
                        animation.name,
                        announced,
                        animation.event_count()
                    );
                }
            }
        }
        self.announced_events = None;
    }

    fn finish(mut self) -> MdsResult<ModelScript> {
        self.close_animation();
        Ok(self.script)
    }
}

/// Skip the format version at the head of a root payload.
///
/// A root either holds just the version, the version followed by the script's chunks, or
/// the chunks alone. The last form is recognized by a known chunk tag at its start.
fn read_root_version(payload: &mut Bytes) {
    if payload.len() < 4 {
        payload.advance(payload.len());
        return;
    }
    let starts_with_chunk = payload.len() >= CHUNK_HEADER_SIZE
        && !matches!(
            ChunkType::from_u16(LittleEndian::read_u16(&payload[..2])),
            ChunkType::Unknown(_)
        );
    if starts_with_chunk {
        return;
    }
    let version = payload.get_u32_le();
    log::debug!("compiled script version {}", version);
}

fn check_strings(config: &ParserConfig, values: &[&str]) -> MdsResult<()> {
    for value in values {
        config.check_string_length(value.len())?;
    }
    Ok(())
}

fn malformed(reason: &str) -> MdsError {
    MdsError::MalformedChunk {
        tag: 0,
        offset: 0,
        reason: reason.to_string(),
    }
}
