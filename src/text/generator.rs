//! Script Source Generator Module
//!
//! Renders a [`ModelScript`] as script source. Optional arguments are left out when they
//! hold their default value, so a generated script reads like a hand-written one.

use std::fmt::Write;

use crate::errors::{MdsError, MdsResult};
use crate::model::{
    MdsAnimation, MdsElementType, MdsEventTag, MdsEventType, MdsLine, DEFAULT_COLLISION_VOLUME_SCALE,
    DEFAULT_FPS, DEFAULT_SOUND_RANGE,
};
use crate::tables::{FightMode, Keyword, TagField};
use crate::ModelScript;

pub struct MdsSourceGenerator<'a> {
    script: &'a ModelScript,
    model_name: &'a str,
}

impl<'a> MdsSourceGenerator<'a> {
    pub fn new(script: &'a ModelScript, model_name: &'a str) -> Self {
        Self { script, model_name }
    }

    pub fn generate(&self) -> MdsResult<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the script into any [`std::fmt::Write`] sink.
    pub fn write_to<W: Write>(&self, out: &mut W) -> MdsResult<()> {
        writeln!(out, "{} ({})", Keyword::Model.as_str(), quoted("model name", self.model_name)?)?;
        writeln!(out, "{{")?;

        let mut depth = 1;
        for line in self.script.elements() {
            match line.kind {
                MdsElementType::AniEnum => {
                    indent(out, depth)?;
                    writeln!(out, "{}", Keyword::AniEnum.as_str())?;
                    indent(out, depth)?;
                    writeln!(out, "{{")?;
                    depth += 1;
                },
                MdsElementType::AniEnumEnd => {
                    if depth > 1 {
                        depth -= 1;
                        indent(out, depth)?;
                        writeln!(out, "}}")?;
                    }
                },
                _ => self.write_element(out, line, depth)?,
            }
        }

        // close an aniEnum that was never ended
        while depth > 1 {
            depth -= 1;
            indent(out, depth)?;
            writeln!(out, "}}")?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }

    fn write_element<W: Write>(&self, out: &mut W, line: MdsLine, depth: usize) -> MdsResult<()> {
        let script = self.script;
        let missing = || MdsError::dangling_element(line.kind, line.index);
        indent(out, depth)?;

        match line.kind {
            MdsElementType::Skeleton => {
                write!(out, "meshAndTree ({}", quoted("skeleton", &script.skeleton.name)?)?;
                if script.skeleton.disable_mesh {
                    write!(out, " DONT_USE_MESH")?;
                }
                writeln!(out, ")")?;
            },
            MdsElementType::Mesh => {
                let mesh = script.meshes.get(line.index).ok_or_else(missing)?;
                writeln!(out, "registerMesh ({})", quoted("mesh", mesh)?)?;
            },
            MdsElementType::AnimationDisabled => {
                let name = script.disabled_animations.get(line.index).ok_or_else(missing)?;
                writeln!(out, "aniDisable ({})", quoted("disabled animation", name)?)?;
            },
            MdsElementType::ModelTag => {
                let tag = script.model_tags.get(line.index).ok_or_else(missing)?;
                writeln!(out, "modelTag (\"DEF_HIT_LIMB\" {})", quoted("model tag bone", &tag.bone)?)?;
            },
            MdsElementType::Animation => {
                let animation = script.animations.get(line.index).ok_or_else(missing)?;
                write_animation(out, animation, depth)?;
            },
            MdsElementType::AnimationAlias => {
                let alias = script.aliases.get(line.index).ok_or_else(missing)?;
                writeln!(
                    out,
                    "aniAlias ({} {} {} {} {} {} {} {})",
                    quoted("alias name", &alias.name)?,
                    alias.layer,
                    quoted("alias next", &alias.next)?,
                    alias.blend_in,
                    alias.blend_out,
                    alias.flags.to_names(),
                    quoted("alias target", &alias.alias)?,
                    alias.direction.as_token()
                )?;
            },
            MdsElementType::AnimationBlend => {
                let blend = script.blends.get(line.index).ok_or_else(missing)?;
                write!(out, "aniBlend ({}", quoted("blend name", &blend.name)?)?;
                if blend.layer != 0 {
                    write!(out, " {}", blend.layer)?;
                }
                write!(out, " {}", quoted("blend next", &blend.next)?)?;
                if blend.blend_in != 0.0 || blend.blend_out != 0.0 {
                    write!(out, " {} {}", blend.blend_in, blend.blend_out)?;
                }
                writeln!(out, ")")?;
            },
            MdsElementType::AnimationCombine => {
                let comb = script.combinations.get(line.index).ok_or_else(missing)?;
                writeln!(
                    out,
                    "aniComb ({} {} {} {} {} {} {} {})",
                    quoted("combination name", &comb.name)?,
                    comb.layer,
                    quoted("combination next", &comb.next)?,
                    comb.blend_in,
                    comb.blend_out,
                    comb.flags.to_names(),
                    quoted("combination prefix", &comb.model)?,
                    comb.last_frame
                )?;
            },
            // block markers are handled by the caller
            MdsElementType::AniEnum | MdsElementType::AniEnumEnd => {},
        }
        Ok(())
    }
}

/// Quote a string argument, refusing values the lexer could not read back.
fn quoted(field: &str, value: &str) -> MdsResult<String> {
    if value.contains('"') || value.contains('\n') {
        return Err(MdsError::WriteFailure {
            reason: format!("{} {:?} cannot be written as a quoted string", field, value),
        });
    }
    Ok(format!("\"{}\"", value))
}

fn indent<W: Write>(out: &mut W, depth: usize) -> MdsResult<()> {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}

fn write_animation<W: Write>(out: &mut W, ani: &MdsAnimation, depth: usize) -> MdsResult<()> {
    write!(
        out,
        "ani ({} {} {} {} {} {} {} {} {} {}",
        quoted("animation name", &ani.name)?,
        ani.layer,
        quoted("animation next", &ani.next)?,
        ani.blend_in,
        ani.blend_out,
        ani.flags.to_names(),
        quoted("animation model", &ani.model)?,
        ani.direction.as_token(),
        ani.first_frame,
        ani.last_frame
    )?;
    if ani.fps != DEFAULT_FPS {
        write!(out, " FPS:{}", ani.fps)?;
    }
    if ani.collision_volume_scale != DEFAULT_COLLISION_VOLUME_SCALE {
        write!(out, " CVS:{}", ani.collision_volume_scale)?;
    }
    if ani.speed != 0.0 {
        write!(out, " SPD:{}", ani.speed)?;
    }
    writeln!(out, ")")?;

    if ani.event_count() == 0 {
        return Ok(());
    }

    indent(out, depth)?;
    writeln!(out, "{{")?;
    for event in ani.events_in_order() {
        indent(out, depth + 1)?;
        write_event(out, ani, event.kind, event.index)?;
    }
    indent(out, depth)?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_event<W: Write>(out: &mut W, ani: &MdsAnimation, kind: MdsEventType, index: usize) -> MdsResult<()> {
    let missing = || MdsError::dangling_event(&ani.name, kind, index);

    match kind {
        MdsEventType::EventTag => {
            let tag = ani.events.get(index).ok_or_else(missing)?;
            write_event_tag(out, tag)?;
        },
        MdsEventType::SoundEffect => {
            let sfx = ani.sfx.get(index).ok_or_else(missing)?;
            write!(out, "{} ({} {}", Keyword::EventSfx.as_str(), sfx.frame, quoted("sound", &sfx.name)?)?;
            write_sound_options(out, sfx.range, sfx.empty_slot)?;
        },
        MdsEventType::SoundEffectGround => {
            let sfx = ani.sfx_ground.get(index).ok_or_else(missing)?;
            write!(
                out,
                "{} ({} {}",
                Keyword::EventSfxGround.as_str(),
                sfx.frame,
                quoted("sound", &sfx.name)?
            )?;
            write_sound_options(out, sfx.range, sfx.empty_slot)?;
        },
        MdsEventType::ParticleEffect => {
            let pfx = ani.pfx.get(index).ok_or_else(missing)?;
            write!(
                out,
                "{} ({} {} {} {}",
                Keyword::EventPfx.as_str(),
                pfx.frame,
                pfx.index,
                quoted("particle effect", &pfx.name)?,
                quoted("particle position", &pfx.position)?
            )?;
            if pfx.attached {
                write!(out, " ATTACH")?;
            }
            writeln!(out, ")")?;
        },
        MdsEventType::ParticleEffectStop => {
            let stop = ani.pfx_stop.get(index).ok_or_else(missing)?;
            writeln!(out, "{} ({} {})", Keyword::EventPfxStop.as_str(), stop.frame, stop.index)?;
        },
        MdsEventType::MorphAnimation => {
            let morph = ani.morph.get(index).ok_or_else(missing)?;
            write!(
                out,
                "{} ({} {}",
                Keyword::EventMorphAni.as_str(),
                morph.frame,
                quoted("morph animation", &morph.animation)?
            )?;
            if !morph.node.is_empty() {
                write!(out, " {}", quoted("morph node", &morph.node)?)?;
            }
            writeln!(out, ")")?;
        },
        MdsEventType::CameraTremor => {
            let t = ani.tremors.get(index).ok_or_else(missing)?;
            writeln!(
                out,
                "{} ({} {} {} {} {})",
                Keyword::EventCamTremor.as_str(),
                t.frame,
                t.field1,
                t.field2,
                t.field3,
                t.field4
            )?;
        },
    }
    Ok(())
}

fn write_sound_options<W: Write>(out: &mut W, range: f32, empty_slot: bool) -> MdsResult<()> {
    if range != DEFAULT_SOUND_RANGE {
        write!(out, " R:{}", range)?;
    }
    if empty_slot {
        write!(out, " EMPTY_SLOT")?;
    }
    writeln!(out, ")")?;
    Ok(())
}

fn write_event_tag<W: Write>(out: &mut W, tag: &MdsEventTag) -> MdsResult<()> {
    let mut values: Vec<String> = tag
        .kind
        .tag_fields()
        .iter()
        .map(|field| match field {
            TagField::Slot => tag.slot.clone(),
            TagField::Slot2 => tag.slot2.clone(),
            TagField::Item => tag.item.clone(),
            TagField::FightMode if tag.fight_mode == FightMode::None => String::new(),
            TagField::FightMode => tag.fight_mode.name().to_string(),
            TagField::Frames => tag
                .frames
                .iter()
                .map(|frame| frame.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect();

    // positions before the last non-empty value are kept as ""
    while values.last().is_some_and(|value| value.is_empty()) {
        values.pop();
    }

    write!(out, "{} ({} \"{}\"", Keyword::EventTag.as_str(), tag.frame, tag.kind.keyword())?;
    for value in &values {
        write!(out, " {}", quoted("event tag argument", value)?)?;
    }
    if tag.attached {
        write!(out, " ATTACH")?;
    }
    writeln!(out, ")")?;
    Ok(())
}
