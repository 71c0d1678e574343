//! Model Script Test Data Builders
//!
//! Fluent builders for assembling model scripts in tests, plus generators for
//! representative and broken inputs.

#![allow(dead_code)]

use mds_parser::{
    AnimationDirection, AnimationFlags, EventKind, FightMode, MdsAnimation, MdsAnimationAlias,
    MdsAnimationBlend, MdsAnimationCombine, MdsCameraTremor, MdsEventTag, MdsModelTag,
    MdsMorphAnimation, MdsParticleEffect, MdsParticleEffectStop, MdsResult, MdsSkeleton,
    MdsSoundEffect, MdsSoundEffectGround, ModelScript,
};

/// Main builder for model scripts; every call records declaration order
#[derive(Debug, Default)]
pub struct ModelScriptBuilder {
    script: ModelScript,
}

impl ModelScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skeleton<S: Into<String>>(mut self, name: S, disable_mesh: bool) -> Self {
        self.script.push_skeleton(MdsSkeleton {
            name: name.into(),
            disable_mesh,
        });
        self
    }

    pub fn mesh<S: Into<String>>(mut self, name: S) -> Self {
        self.script.push_mesh(name.into());
        self
    }

    pub fn model_tag<S: Into<String>>(mut self, bone: S) -> Self {
        self.script.push_model_tag(MdsModelTag { bone: bone.into() });
        self
    }

    /// Wrap the declarations added by `f` in an `aniEnum` block
    pub fn ani_enum<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.script.push_ani_enum();
        let mut builder = f(self);
        builder.script.push_ani_enum_end();
        builder
    }

    /// Add an animation configured by `f`
    pub fn animation<S, F>(mut self, name: S, f: F) -> Self
    where
        S: Into<String>,
        F: FnOnce(AnimationBuilder) -> AnimationBuilder,
    {
        let animation = f(AnimationBuilder::new(name)).build();
        self.script.push_animation(animation);
        self
    }

    pub fn alias<S: Into<String>>(mut self, name: S, alias: S, direction: AnimationDirection) -> Self {
        self.script.push_alias(MdsAnimationAlias {
            name: name.into(),
            layer: 1,
            alias: alias.into(),
            direction,
            flags: AnimationFlags::MOVE,
            blend_in: 0.1,
            blend_out: 0.1,
            ..Default::default()
        });
        self
    }

    pub fn blend<S: Into<String>>(mut self, name: S, next: S, blend_in: f32, blend_out: f32) -> Self {
        self.script.push_blend(MdsAnimationBlend {
            name: name.into(),
            next: next.into(),
            blend_in,
            blend_out,
            ..Default::default()
        });
        self
    }

    pub fn combination<S: Into<String>>(mut self, name: S, prefix: S, count: i32) -> Self {
        self.script.push_combination(MdsAnimationCombine {
            name: name.into(),
            layer: 9,
            next: String::new(),
            blend_in: 0.3,
            blend_out: 0.3,
            flags: AnimationFlags::MOVE,
            model: prefix.into(),
            last_frame: count,
        });
        self
    }

    pub fn disable<S: Into<String>>(mut self, name: S) -> Self {
        self.script.push_disabled_animation(name.into());
        self
    }

    /// Edit the script directly (for edge cases the builder does not cover)
    pub fn raw<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut ModelScript),
    {
        f(&mut self.script);
        self
    }

    pub fn build(self) -> ModelScript {
        self.script
    }

    pub fn build_binary(self, model_name: &str) -> MdsResult<Vec<u8>> {
        self.script.to_binary(model_name)
    }

    pub fn build_source(self, model_name: &str) -> MdsResult<String> {
        self.script.to_source(model_name)
    }
}

/// Builder for an animation and its events
#[derive(Debug)]
pub struct AnimationBuilder {
    animation: MdsAnimation,
}

impl AnimationBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            animation: MdsAnimation {
                name: name.into(),
                layer: 1,
                ..Default::default()
            },
        }
    }

    pub fn layer(mut self, layer: u32) -> Self {
        self.animation.layer = layer;
        self
    }

    pub fn next<S: Into<String>>(mut self, next: S) -> Self {
        self.animation.next = next.into();
        self
    }

    pub fn blend(mut self, blend_in: f32, blend_out: f32) -> Self {
        self.animation.blend_in = blend_in;
        self.animation.blend_out = blend_out;
        self
    }

    pub fn flags(mut self, flags: AnimationFlags) -> Self {
        self.animation.flags = flags;
        self
    }

    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.animation.model = model.into();
        self
    }

    pub fn backward(mut self) -> Self {
        self.animation.direction = AnimationDirection::Backward;
        self
    }

    pub fn frames(mut self, first: i32, last: i32) -> Self {
        self.animation.first_frame = first;
        self.animation.last_frame = last;
        self
    }

    pub fn fps(mut self, fps: f32) -> Self {
        self.animation.fps = fps;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.animation.speed = speed;
        self
    }

    pub fn collision_volume_scale(mut self, scale: f32) -> Self {
        self.animation.collision_volume_scale = scale;
        self
    }

    pub fn sfx<S: Into<String>>(mut self, frame: i32, name: S) -> Self {
        self.animation.push_sfx(MdsSoundEffect {
            frame,
            name: name.into(),
            ..Default::default()
        });
        self
    }

    pub fn sfx_ground<S: Into<String>>(mut self, frame: i32, name: S, range: f32) -> Self {
        self.animation.push_sfx_ground(MdsSoundEffectGround {
            frame,
            name: name.into(),
            range,
            empty_slot: false,
        });
        self
    }

    pub fn tag(mut self, event: MdsEventTag) -> Self {
        self.animation.push_event_tag(event);
        self
    }

    /// `DEF_CREATE_ITEM` into `slot`
    pub fn create_item<S: Into<String>>(self, frame: i32, slot: S, item: S) -> Self {
        self.tag(MdsEventTag {
            frame,
            kind: EventKind::ItemCreate,
            slot: slot.into(),
            item: item.into(),
            ..Default::default()
        })
    }

    pub fn fight_mode(self, frame: i32, mode: FightMode) -> Self {
        self.tag(MdsEventTag {
            frame,
            kind: EventKind::SetFightMode,
            fight_mode: mode,
            ..Default::default()
        })
    }

    pub fn hit_frames(self, frame: i32, kind: EventKind, frames: Vec<i32>) -> Self {
        self.tag(MdsEventTag {
            frame,
            kind,
            frames,
            ..Default::default()
        })
    }

    pub fn pfx<S: Into<String>>(mut self, frame: i32, index: i32, name: S, position: S) -> Self {
        self.animation.push_pfx(MdsParticleEffect {
            frame,
            index,
            name: name.into(),
            position: position.into(),
            attached: true,
        });
        self
    }

    pub fn pfx_stop(mut self, frame: i32, index: i32) -> Self {
        self.animation.push_pfx_stop(MdsParticleEffectStop { frame, index });
        self
    }

    pub fn morph<S: Into<String>>(mut self, frame: i32, animation: S, node: S) -> Self {
        self.animation.push_morph(MdsMorphAnimation {
            frame,
            animation: animation.into(),
            node: node.into(),
        });
        self
    }

    pub fn tremor(mut self, frame: i32, fields: [i32; 4]) -> Self {
        self.animation.push_tremor(MdsCameraTremor {
            frame,
            field1: fields[0],
            field2: fields[1],
            field3: fields[2],
            field4: fields[3],
        });
        self
    }

    pub fn build(self) -> MdsAnimation {
        self.animation
    }
}

/// Representative scripts
pub struct ScriptGenerators;

impl ScriptGenerators {
    /// The `ROOT { SOURCE END }` stream: no declarations at all
    pub fn empty_binary() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&[0x00, 0xF0, 0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]);
        out.extend_from_slice(&[0x00, 0xF1, 0x07, 0x00, 0x00, 0x00]);
        out.extend_from_slice(b"Humans\n");
        out.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]);
        out
    }

    /// A humanoid script touching every declaration and event type
    pub fn humans() -> ModelScriptBuilder {
        ModelScriptBuilder::new()
            .skeleton("HUM_BODY_NAKED0.ASC", true)
            .mesh("HUM_BODY_NAKED0.ASC")
            .mesh("HUM_BODY_COOKSMOCK.ASC")
            .ani_enum(|b| {
                b.model_tag("ZS_RIGHTHAND")
                    .animation("S_RUN", |a| {
                        a.next("S_RUNL")
                            .blend(0.1, 0.1)
                            .flags(AnimationFlags::MOVE)
                            .model("HUM_RUNLOOP_M01.ASC")
                            .frames(0, 30)
                    })
                    .animation("S_RUNL", |a| {
                        a.next("S_RUNL")
                            .flags(AnimationFlags::MOVE | AnimationFlags::IDLE)
                            .model("HUM_RUNLOOP_M01.ASC")
                            .frames(1, 20)
                            .sfx_ground(2, "RUN", 1500.0)
                            .sfx(5, "STEP")
                            .sfx_ground(12, "RUN", 1500.0)
                    })
                    .animation("T_1HATTACKL", |a| {
                        a.layer(2)
                            .flags(AnimationFlags::MOVE | AnimationFlags::QUEUE)
                            .model("HUM_1HATTACK_M01.ASC")
                            .frames(0, 45)
                            .fps(30.0)
                            .speed(1.5)
                            .sfx(3, "WHOOSH")
                            .hit_frames(5, EventKind::OptimalFrame, vec![12, 18])
                            .hit_frames(5, EventKind::ComboWindow, vec![20, 30])
                            .pfx(7, 1, "BLOOD_SPLAT", "BIP01 R HAND")
                            .fight_mode(8, FightMode::SingleHanded)
                            .pfx_stop(40, 1)
                            .sfx(41, "WHOOSH")
                    })
                    .animation("T_DRAW", |a| {
                        a.model("HUM_DRAW.ASC")
                            .backward()
                            .frames(10, 0)
                            .collision_volume_scale(0.5)
                            .create_item(3, "ZS_RIGHTHAND", "ITMW_1H_SWORD")
                            .morph(4, "R_EYESBLINK", "BIP01 HEAD")
                            .tremor(6, [1, 200, 300, 4])
                    })
                    .alias("S_RUNBACK", "S_RUN", AnimationDirection::Backward)
                    .blend("T_RUN_2_WALK", "S_WALK", 0.2, 0.2)
                    .combination("T_LOOK", "C_LOOK_", 9)
                    .disable("S_SNEAK")
            })
    }
}

/// Broken inputs
pub struct InvalidScriptGenerators;

impl InvalidScriptGenerators {
    /// A mesh chunk whose declared length runs past the end of the stream
    pub fn truncated_binary() -> Vec<u8> {
        let mut out = ScriptGenerators::empty_binary();
        // drop END and append a cut-off mesh chunk
        out.truncate(out.len() - 6);
        out.extend_from_slice(&[0x00, 0xF4, 0x20, 0x00, 0x00, 0x00]);
        out.extend_from_slice(b"HUM_");
        out
    }

    pub fn unknown_keyword() -> &'static str {
        "Model (\"HuS\")\n{\n\taniEnum\n\t{\n\t\taniTeleport (\"S_RUN\")\n\t}\n}\n"
    }

    pub fn bad_direction() -> &'static str {
        "Model (\"HuS\")\n{\n\taniAlias (\"S_A\" 1 \"\" 0 0 M. \"S_B\" SIDEWAYS)\n}\n"
    }
}
