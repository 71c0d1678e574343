//! Script Source Parser Module
//!
//! Recursive descent over the token stream. Every declaration reads its parenthesized
//! argument list up front and then consumes it positionally; optional trailing tokens such
//! as `FPS:25` or `ATTACH` are recognized by shape, in any order.

use super::lexer::{tokenize, Token, TokenKind};
use crate::errors::{MdsError, MdsResult, SourceLocation};
use crate::model::{
    MdsAnimation, MdsAnimationAlias, MdsAnimationBlend, MdsAnimationCombine, MdsCameraTremor,
    MdsEventTag, MdsModelTag, MdsMorphAnimation, MdsParticleEffect, MdsParticleEffectStop,
    MdsSkeleton, MdsSoundEffect, MdsSoundEffectGround,
};
use crate::tables::{AnimationDirection, AnimationFlags, EventKind, FightMode, Keyword, TagField};
use crate::{ModelScript, ParserConfig, ResourceTracker};

/// Parse script source with default configuration
pub fn parse_source(source: &str) -> MdsResult<ModelScript> {
    let config = ParserConfig::default();
    let mut tracker = ResourceTracker::new();
    parse_source_with_config(source, &config, &mut tracker)
}

/// Parse script source with resource tracking and limits
pub fn parse_source_with_config(
    source: &str,
    config: &ParserConfig,
    tracker: &mut ResourceTracker,
) -> MdsResult<ModelScript> {
    let tokens = tokenize(source)?;
    log::trace!("tokenized {} tokens", tokens.len());

    let mut parser = SourceParser {
        tokens,
        pos: 0,
        config,
        tracker,
        script: ModelScript::default(),
    };
    parser.parse_script()?;
    Ok(parser.script)
}

fn unexpected(token: &Token, expected: &str) -> MdsError {
    MdsError::UnexpectedToken {
        line: token.line,
        expected: expected.to_string(),
        found: token.describe(),
    }
}

fn invalid_value(field: &str, arg: &Arg) -> MdsError {
    MdsError::InvalidEnumValue {
        field: field.to_string(),
        value: arg.value.clone(),
        location: SourceLocation::Line(arg.line),
    }
}

struct SourceParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    config: &'a ParserConfig,
    tracker: &'a mut ResourceTracker,
    script: ModelScript,
}

impl SourceParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn end_of_input(&self, expected: &str) -> MdsError {
        MdsError::UnexpectedToken {
            line: self.tokens.last().map_or(1, |t| t.line),
            expected: expected.to_string(),
            found: "end of input".to_string(),
        }
    }

    fn next(&mut self, expected: &str) -> MdsResult<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.end_of_input(expected))?;
        self.pos += 1;
        Ok(token)
    }

    fn open_block(&mut self) -> MdsResult<()> {
        let token = self.next("'{'")?;
        if token.kind != TokenKind::LBrace {
            return Err(unexpected(&token, "'{'"));
        }
        self.tracker.enter_block(self.config, token.line)
    }

    fn parse_script(&mut self) -> MdsResult<()> {
        let is_model = matches!(
            self.peek(),
            Some(Token { kind: TokenKind::Word(word), .. }) if Keyword::lookup(word) == Some(Keyword::Model)
        );
        if !is_model {
            return self.parse_declarations(false);
        }

        let keyword = self.next("Model")?;
        let mut args = self.arguments(Keyword::Model, keyword.line)?;
        let name = args.string("model name")?;
        args.finish()?;
        log::debug!("parsing model script '{}'", name);

        self.open_block()?;
        self.parse_declarations(true)?;

        if let Some(token) = self.peek() {
            return Err(unexpected(token, "end of input"));
        }
        Ok(())
    }

    /// Parse declarations up to the closing brace of the current block, or to the end of
    /// input at the top level.
    fn parse_declarations(&mut self, in_block: bool) -> MdsResult<()> {
        loop {
            let token = match self.peek() {
                Some(token) => token.clone(),
                None if in_block => return Err(self.end_of_input("'}'")),
                None => return Ok(()),
            };
            self.pos += 1;

            match &token.kind {
                TokenKind::RBrace if in_block => {
                    self.tracker.exit_block();
                    return Ok(());
                },
                TokenKind::Word(word) => self.parse_declaration(word, &token)?,
                _ => return Err(unexpected(&token, "declaration")),
            }
        }
    }

    fn parse_declaration(&mut self, word: &str, token: &Token) -> MdsResult<()> {
        let line = token.line;
        let keyword = Keyword::lookup(word).ok_or_else(|| MdsError::UnknownKeyword {
            line,
            keyword: word.to_string(),
        })?;
        self.tracker.track_declaration(self.config)?;

        match keyword {
            Keyword::MeshAndTree => {
                let mut args = self.arguments(keyword, line)?;
                let name = args.string("skeleton name")?;
                let mut disable_mesh = false;
                while let Some(arg) = args.next_arg() {
                    if arg.is_word("DONT_USE_MESH") {
                        disable_mesh = true;
                    } else {
                        return Err(args.extra(&arg));
                    }
                }
                self.script.push_skeleton(MdsSkeleton { name, disable_mesh });
            },
            Keyword::RegisterMesh => {
                let mut args = self.arguments(keyword, line)?;
                let mesh = args.string("mesh name")?;
                args.finish()?;
                self.script.push_mesh(mesh);
            },
            Keyword::AniEnum => {
                self.open_block()?;
                self.script.push_ani_enum();
                self.parse_declarations(true)?;
                self.script.push_ani_enum_end();
            },
            Keyword::ModelTag => {
                let mut args = self.arguments(keyword, line)?;
                let kind = args.take("tag kind")?;
                if EventKind::from_keyword(&kind.value) != EventKind::HitLimb {
                    return Err(invalid_value("model tag kind", &kind));
                }
                let bone = args.string("bone name")?;
                args.finish()?;
                self.script.push_model_tag(MdsModelTag { bone });
            },
            Keyword::Ani => {
                let mut animation = self.arguments(keyword, line)?.animation()?;
                if matches!(self.peek(), Some(Token { kind: TokenKind::LBrace, .. })) {
                    self.parse_events(&mut animation)?;
                }
                self.script.push_animation(animation);
            },
            Keyword::AniAlias => {
                let mut args = self.arguments(keyword, line)?;
                let mut alias = MdsAnimationAlias {
                    name: args.string("name")?,
                    layer: args.uint("layer")?,
                    next: args.string("next animation")?,
                    blend_in: args.float("blend in")?,
                    blend_out: args.float("blend out")?,
                    flags: args.flags()?,
                    alias: args.string("aliased animation")?,
                    ..Default::default()
                };
                if !args.is_empty() {
                    alias.direction = args.direction()?;
                }
                args.finish()?;
                self.script.push_alias(alias);
            },
            Keyword::AniBlend => {
                let mut args = self.arguments(keyword, line)?;
                let mut blend = MdsAnimationBlend {
                    name: args.string("name")?,
                    ..Default::default()
                };
                if args.peek_int() {
                    blend.layer = args.uint("layer")?;
                }
                blend.next = args.string("next animation")?;
                if !args.is_empty() {
                    blend.blend_in = args.float("blend in")?;
                    blend.blend_out = args.float("blend out")?;
                }
                args.finish()?;
                self.script.push_blend(blend);
            },
            Keyword::AniComb => {
                let mut args = self.arguments(keyword, line)?;
                let combination = MdsAnimationCombine {
                    name: args.string("name")?,
                    layer: args.uint("layer")?,
                    next: args.string("next animation")?,
                    blend_in: args.float("blend in")?,
                    blend_out: args.float("blend out")?,
                    flags: args.flags()?,
                    model: args.string("combination prefix")?,
                    last_frame: args.int("combination count")?,
                };
                args.finish()?;
                self.script.push_combination(combination);
            },
            Keyword::AniDisable => {
                let mut args = self.arguments(keyword, line)?;
                let name = args.string("animation name")?;
                args.finish()?;
                self.script.push_disabled_animation(name);
            },
            Keyword::Model
            | Keyword::EventTag
            | Keyword::EventSfx
            | Keyword::EventSfxGround
            | Keyword::EventPfx
            | Keyword::EventPfxStop
            | Keyword::EventMorphAni
            | Keyword::EventCamTremor => return Err(unexpected(token, "declaration")),
        }
        Ok(())
    }

    fn parse_events(&mut self, animation: &mut MdsAnimation) -> MdsResult<()> {
        self.open_block()?;
        loop {
            let token = self.next("event or '}'")?;
            let word = match &token.kind {
                TokenKind::RBrace => {
                    self.tracker.exit_block();
                    return Ok(());
                },
                TokenKind::Word(word) => word,
                _ => return Err(unexpected(&token, "event or '}'")),
            };

            let keyword = Keyword::lookup(word).ok_or_else(|| MdsError::UnknownKeyword {
                line: token.line,
                keyword: word.clone(),
            })?;
            if !keyword.is_event() {
                return Err(unexpected(&token, "event or '}'"));
            }

            let args = self.arguments(keyword, token.line)?;
            parse_event(keyword, args, animation)?;
            self.config.check_event_count(animation.event_count())?;
        }
    }

    /// Read `( arg* )` following a declaration keyword.
    fn arguments(&mut self, keyword: Keyword, line: usize) -> MdsResult<Arguments> {
        let open = self.next("'('")?;
        if open.kind != TokenKind::LParen {
            return Err(unexpected(&open, "'('"));
        }

        let mut args = Vec::new();
        loop {
            let token = self.next("argument or ')'")?;
            let (value, quoted) = match token.kind {
                TokenKind::RParen => break,
                TokenKind::Quoted(value) => (value, true),
                TokenKind::Word(value) => (value, false),
                _ => return Err(unexpected(&token, "argument or ')'")),
            };
            self.config.check_string_length(value.len())?;
            args.push(Arg {
                value,
                quoted,
                line: token.line,
            });
        }

        Ok(Arguments {
            declaration: keyword.as_str(),
            line,
            args,
            pos: 0,
        })
    }
}

fn parse_event(keyword: Keyword, mut args: Arguments, animation: &mut MdsAnimation) -> MdsResult<()> {
    match keyword {
        Keyword::EventTag => animation.push_event_tag(args.event_tag()?),
        Keyword::EventSfx => {
            let (frame, name, range, empty_slot) = args.sound()?;
            animation.push_sfx(MdsSoundEffect {
                frame,
                name,
                range,
                empty_slot,
            });
        },
        Keyword::EventSfxGround => {
            let (frame, name, range, empty_slot) = args.sound()?;
            animation.push_sfx_ground(MdsSoundEffectGround {
                frame,
                name,
                range,
                empty_slot,
            });
        },
        Keyword::EventPfx => {
            let frame = args.int("frame")?;
            let index = if args.peek_int() { args.int("index")? } else { 0 };
            let mut pfx = MdsParticleEffect {
                frame,
                index,
                name: args.string("effect name")?,
                position: args.string("position")?,
                attached: false,
            };
            while let Some(arg) = args.next_arg() {
                if arg.is_word("ATTACH") {
                    pfx.attached = true;
                } else {
                    return Err(args.extra(&arg));
                }
            }
            animation.push_pfx(pfx);
        },
        Keyword::EventPfxStop => {
            let stop = MdsParticleEffectStop {
                frame: args.int("frame")?,
                index: args.int("index")?,
            };
            args.finish()?;
            animation.push_pfx_stop(stop);
        },
        Keyword::EventMorphAni => {
            let mut morph = MdsMorphAnimation {
                frame: args.int("frame")?,
                animation: args.string("morph animation")?,
                ..Default::default()
            };
            if !args.is_empty() {
                morph.node = args.string("node")?;
            }
            args.finish()?;
            animation.push_morph(morph);
        },
        Keyword::EventCamTremor => {
            let tremor = MdsCameraTremor {
                frame: args.int("frame")?,
                field1: args.int("field 1")?,
                field2: args.int("field 2")?,
                field3: args.int("field 3")?,
                field4: args.int("field 4")?,
            };
            args.finish()?;
            animation.push_tremor(tremor);
        },
        // filtered by the caller
        _ => {},
    }
    Ok(())
}

/// One argument inside a declaration's parentheses.
#[derive(Debug, Clone)]
struct Arg {
    value: String,
    quoted: bool,
    line: usize,
}

impl Arg {
    fn is_word(&self, word: &str) -> bool {
        !self.quoted && self.value.eq_ignore_ascii_case(word)
    }

    /// Value of a `KEY:value` option such as `FPS:25`
    fn option(&self, key: &str) -> Option<&str> {
        if self.quoted || self.value.len() <= key.len() {
            return None;
        }
        let (head, tail) = self.value.split_at(key.len());
        if head.eq_ignore_ascii_case(key) {
            Some(tail)
        } else {
            None
        }
    }

    fn describe(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.value)
        } else {
            format!("'{}'", self.value)
        }
    }
}

/// Positional cursor over a declaration's arguments.
struct Arguments {
    declaration: &'static str,
    line: usize,
    args: Vec<Arg>,
    pos: usize,
}

impl Arguments {
    fn is_empty(&self) -> bool {
        self.pos >= self.args.len()
    }

    fn next_arg(&mut self) -> Option<Arg> {
        let arg = self.args.get(self.pos).cloned()?;
        self.pos += 1;
        Some(arg)
    }

    fn peek_int(&self) -> bool {
        self.args
            .get(self.pos)
            .is_some_and(|arg| !arg.quoted && arg.value.parse::<i32>().is_ok())
    }

    fn take(&mut self, what: &str) -> MdsResult<Arg> {
        let line = self.line;
        let declaration = self.declaration;
        self.next_arg().ok_or_else(|| MdsError::ArityMismatch {
            line,
            declaration: declaration.to_string(),
            reason: format!("missing {}", what),
        })
    }

    fn extra(&self, arg: &Arg) -> MdsError {
        MdsError::ArityMismatch {
            line: self.line,
            declaration: self.declaration.to_string(),
            reason: format!("unexpected argument {}", arg.describe()),
        }
    }

    fn finish(&mut self) -> MdsResult<()> {
        match self.next_arg() {
            Some(arg) => Err(self.extra(&arg)),
            None => Ok(()),
        }
    }

    fn string(&mut self, what: &str) -> MdsResult<String> {
        Ok(self.take(what)?.value)
    }

    fn number<T: std::str::FromStr>(&mut self, what: &str, shape: &str) -> MdsResult<T> {
        let arg = self.take(what)?;
        parse_number(&arg.value, arg.line, what, shape)
    }

    fn int(&mut self, what: &str) -> MdsResult<i32> {
        self.number(what, "integer")
    }

    fn uint(&mut self, what: &str) -> MdsResult<u32> {
        self.number(what, "unsigned integer")
    }

    fn float(&mut self, what: &str) -> MdsResult<f32> {
        self.number(what, "number")
    }

    fn flags(&mut self) -> MdsResult<AnimationFlags> {
        let arg = self.take("flags")?;
        AnimationFlags::from_token(&arg.value).ok_or_else(|| invalid_value("flags", &arg))
    }

    fn direction(&mut self) -> MdsResult<AnimationDirection> {
        let arg = self.take("direction")?;
        AnimationDirection::from_token(&arg.value).ok_or_else(|| invalid_value("direction", &arg))
    }

    /// `ani` arguments including the trailing `FPS:`, `CVS:` and `SPD:` options
    fn animation(mut self) -> MdsResult<MdsAnimation> {
        let mut animation = MdsAnimation {
            name: self.string("name")?,
            layer: self.uint("layer")?,
            next: self.string("next animation")?,
            blend_in: self.float("blend in")?,
            blend_out: self.float("blend out")?,
            flags: self.flags()?,
            model: self.string("model")?,
            direction: self.direction()?,
            first_frame: self.int("first frame")?,
            last_frame: self.int("last frame")?,
            ..Default::default()
        };

        while let Some(arg) = self.next_arg() {
            if let Some(value) = arg.option("FPS:") {
                animation.fps = parse_number(value, arg.line, "FPS", "number")?;
            } else if let Some(value) = arg.option("CVS:") {
                animation.collision_volume_scale = parse_number(value, arg.line, "CVS", "number")?;
            } else if let Some(value) = arg.option("SPD:") {
                animation.speed = parse_number(value, arg.line, "SPD", "number")?;
            } else {
                return Err(self.extra(&arg));
            }
        }
        Ok(animation)
    }

    /// Shared layout of `*eventSFX` and `*eventSFXGrnd`
    fn sound(&mut self) -> MdsResult<(i32, String, f32, bool)> {
        let frame = self.int("frame")?;
        let name = self.string("sound name")?;
        let mut range = crate::model::DEFAULT_SOUND_RANGE;
        let mut empty_slot = false;

        while let Some(arg) = self.next_arg() {
            if let Some(value) = arg.option("R:") {
                range = parse_number(value, arg.line, "range", "number")?;
            } else if arg.is_word("EMPTY_SLOT") {
                empty_slot = true;
            } else {
                return Err(self.extra(&arg));
            }
        }
        Ok((frame, name, range, empty_slot))
    }

    /// `*eventTag`: string arguments after the kind fill the kind's field layout
    fn event_tag(&mut self) -> MdsResult<MdsEventTag> {
        let frame = self.int("frame")?;
        let kind_arg = self.take("event kind")?;
        let kind = EventKind::from_keyword(&kind_arg.value);
        if kind == EventKind::Unknown {
            log::debug!("unknown event kind '{}' on line {}", kind_arg.value, kind_arg.line);
        }

        let mut event = MdsEventTag {
            frame,
            kind,
            ..Default::default()
        };
        let layout = kind.tag_fields();
        let mut field = 0;

        while let Some(arg) = self.next_arg() {
            if arg.is_word("ATTACH") {
                event.attached = true;
                continue;
            }

            let target = layout.get(field).ok_or_else(|| self.extra(&arg))?;
            field += 1;
            match target {
                TagField::Slot => event.slot = arg.value,
                TagField::Slot2 => event.slot2 = arg.value,
                TagField::Item => event.item = arg.value,
                TagField::FightMode => {
                    event.fight_mode = FightMode::from_name(&arg.value)
                        .ok_or_else(|| invalid_value("fight mode", &arg))?
                },
                TagField::Frames => {
                    event.frames = arg
                        .value
                        .split_whitespace()
                        .map(|frame| parse_number(frame, arg.line, "frame list", "integer"))
                        .collect::<MdsResult<Vec<i32>>>()?
                },
            }
        }
        Ok(event)
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, line: usize, what: &str, shape: &str) -> MdsResult<T> {
    value.parse().map_err(|_| MdsError::UnexpectedToken {
        line,
        expected: format!("{} for {}", shape, what),
        found: format!("'{}'", value),
    })
}
