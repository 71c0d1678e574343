pub mod binary;
pub mod errors;
pub mod model;
pub mod parser_config;
pub mod tables;
pub mod text;
pub mod traits;
pub mod utils;

pub use binary::{parse_chunks, parse_chunks_with_config, MdsBinaryGenerator, MSB_VERSION};
pub use errors::*;
pub use model::*;
pub use parser_config::*;
pub use tables::*;
pub use text::{parse_source, parse_source_with_config, MdsSourceGenerator};
pub use traits::*;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Representation a model script is read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptFormat {
    /// Compiled chunk stream (`.msb`)
    Binary,
    /// Human-authored source (`.mds`)
    Source,
}

/// A model script: the animations of a model and the actions the animation controller
/// takes while they play.
///
/// Both the source and the compiled representation decode into this one model. `lines`
/// and each animation's `event_lines` record declaration order across the typed sequences
/// so that re-emission reproduces the original interleaving.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScript {
    /// The model skeleton this script was made for
    pub skeleton: MdsSkeleton,

    /// Meshes which can be used with this script
    pub meshes: Vec<String>,

    /// Names of disabled animations
    pub disabled_animations: Vec<String>,

    pub combinations: Vec<MdsAnimationCombine>,
    pub blends: Vec<MdsAnimationBlend>,
    pub aliases: Vec<MdsAnimationAlias>,
    pub model_tags: Vec<MdsModelTag>,
    pub animations: Vec<MdsAnimation>,

    /// All elements in source order
    pub lines: Vec<MdsLine>,
}

impl ModelScript {
    /// Parse a model script from a path, sniffing the format
    pub fn from_path(path: &str) -> MdsResult<Self> {
        Self::from_path_with_config(path, ParserConfig::default())
    }

    /// Parse a model script from a path with custom resource limits
    pub fn from_path_with_config(path: &str, config: ParserConfig) -> MdsResult<Self> {
        let file_data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MdsError::FileNotFound {
                path: path.to_string(),
                io_kind: Some(e.kind()),
            },
            std::io::ErrorKind::PermissionDenied => MdsError::PermissionDenied {
                path: path.to_string(),
            },
            _ => MdsError::FileReadError {
                path: path.to_string(),
                reason: e.to_string(),
            },
        })?;

        Self::load_with_config(&file_data, config)
    }

    /// Parse either representation, choosing the decoder by the leading bytes
    pub fn load(data: &[u8]) -> MdsResult<Self> {
        Self::load_with_config(data, ParserConfig::default())
    }

    pub fn load_with_config(data: &[u8], config: ParserConfig) -> MdsResult<Self> {
        if utils::is_binary(data) {
            log::debug!("detected compiled model script ({} bytes)", data.len());
            Self::from_binary_with_config(data, config)
        } else {
            log::debug!("detected model script source ({} bytes)", data.len());
            let source = std::str::from_utf8(data).map_err(|e| MdsError::InvalidTextEncoding {
                offset: e.valid_up_to(),
            })?;
            Self::from_source_with_config(source, config)
        }
    }

    /// Parse a compiled script
    pub fn from_binary(data: &[u8]) -> MdsResult<Self> {
        Self::from_binary_with_config(data, ParserConfig::default())
    }

    pub fn from_binary_with_config(data: &[u8], config: ParserConfig) -> MdsResult<Self> {
        config.check_input_size(data.len())?;
        let mut data = Bytes::copy_from_slice(data);
        let mut tracker = ResourceTracker::new();
        parse_chunks_with_config(&mut data, &config, &mut tracker)
    }

    /// Parse script source
    pub fn from_source(source: &str) -> MdsResult<Self> {
        Self::from_source_with_config(source, ParserConfig::default())
    }

    pub fn from_source_with_config(source: &str, config: ParserConfig) -> MdsResult<Self> {
        config.check_input_size(source.len())?;
        let mut tracker = ResourceTracker::new();
        parse_source_with_config(source, &config, &mut tracker)
    }

    /// Compile into the binary chunk stream. `model_name` is written to the source chunk.
    pub fn to_binary(&self, model_name: &str) -> MdsResult<Vec<u8>> {
        MdsBinaryGenerator::new(self, model_name).generate()
    }

    /// Render as script source wrapped in `Model ("<model_name>") { ... }`
    pub fn to_source(&self, model_name: &str) -> MdsResult<String> {
        MdsSourceGenerator::new(self, model_name).generate()
    }

    pub fn generate(&self, model_name: &str, format: ScriptFormat) -> MdsResult<Vec<u8>> {
        match format {
            ScriptFormat::Binary => self.to_binary(model_name),
            ScriptFormat::Source => Ok(self.to_source(model_name)?.into_bytes()),
        }
    }

    fn push_line(&mut self, kind: MdsElementType, index: usize) {
        self.lines.push(MdsLine { kind, index });
    }

    pub fn push_skeleton(&mut self, skeleton: MdsSkeleton) {
        self.skeleton = skeleton;
        self.push_line(MdsElementType::Skeleton, 0);
    }

    pub fn push_mesh(&mut self, mesh: String) {
        self.push_line(MdsElementType::Mesh, self.meshes.len());
        self.meshes.push(mesh);
    }

    pub fn push_disabled_animation(&mut self, name: String) {
        self.push_line(MdsElementType::AnimationDisabled, self.disabled_animations.len());
        self.disabled_animations.push(name);
    }

    pub fn push_model_tag(&mut self, tag: MdsModelTag) {
        self.push_line(MdsElementType::ModelTag, self.model_tags.len());
        self.model_tags.push(tag);
    }

    /// Append an animation and return its index for attaching events
    pub fn push_animation(&mut self, animation: MdsAnimation) -> usize {
        let index = self.animations.len();
        self.push_line(MdsElementType::Animation, index);
        self.animations.push(animation);
        index
    }

    pub fn push_alias(&mut self, alias: MdsAnimationAlias) {
        self.push_line(MdsElementType::AnimationAlias, self.aliases.len());
        self.aliases.push(alias);
    }

    pub fn push_blend(&mut self, blend: MdsAnimationBlend) {
        self.push_line(MdsElementType::AnimationBlend, self.blends.len());
        self.blends.push(blend);
    }

    pub fn push_combination(&mut self, combination: MdsAnimationCombine) {
        self.push_line(MdsElementType::AnimationCombine, self.combinations.len());
        self.combinations.push(combination);
    }

    pub fn push_ani_enum(&mut self) {
        self.push_line(MdsElementType::AniEnum, 0);
    }

    pub fn push_ani_enum_end(&mut self) {
        self.push_line(MdsElementType::AniEnumEnd, 0);
    }

    fn is_empty(&self) -> bool {
        self.skeleton == MdsSkeleton::default()
            && self.meshes.is_empty()
            && self.disabled_animations.is_empty()
            && self.model_tags.is_empty()
            && self.animations.is_empty()
            && self.aliases.is_empty()
            && self.blends.is_empty()
            && self.combinations.is_empty()
    }

    /// Entries per element kind that no order line points at.
    pub fn unplaced_elements(&self) -> Vec<(MdsElementType, usize)> {
        let skeleton = if self.skeleton != MdsSkeleton::default() { 1 } else { 0 };
        [
            (MdsElementType::Skeleton, skeleton),
            (MdsElementType::Mesh, self.meshes.len()),
            (MdsElementType::AnimationDisabled, self.disabled_animations.len()),
            (MdsElementType::ModelTag, self.model_tags.len()),
            (MdsElementType::Animation, self.animations.len()),
            (MdsElementType::AnimationAlias, self.aliases.len()),
            (MdsElementType::AnimationBlend, self.blends.len()),
            (MdsElementType::AnimationCombine, self.combinations.len()),
        ]
        .into_iter()
        .filter_map(|(kind, len)| {
            let placed = self
                .lines
                .iter()
                .filter(|line| line.kind == kind && line.index < len)
                .map(|line| line.index)
                .collect::<std::collections::HashSet<_>>()
                .len();
            (placed < len).then_some((kind, len - placed))
        })
        .collect()
    }

    /// Top-level elements in declaration order.
    ///
    /// Scripts assembled without the `push_*` helpers have no recorded order; they are
    /// walked in the canonical compiled order instead.
    pub fn elements(&self) -> Box<dyn Iterator<Item = MdsLine> + '_> {
        if !self.lines.is_empty() {
            for (kind, missing) in self.unplaced_elements() {
                log::warn!("{} {:?} entries have no recorded position and are not emitted", missing, kind);
            }
            return Box::new(self.lines.iter().copied());
        }
        if self.is_empty() {
            return Box::new(std::iter::empty());
        }

        let group = |kind: MdsElementType, len: usize| {
            (0..len).map(move |index| MdsLine { kind, index })
        };
        let skeleton = if self.skeleton != MdsSkeleton::default() { 1 } else { 0 };
        Box::new(
            group(MdsElementType::Skeleton, skeleton)
                .chain(group(MdsElementType::Mesh, self.meshes.len()))
                .chain(group(MdsElementType::AnimationDisabled, self.disabled_animations.len()))
                .chain(group(MdsElementType::ModelTag, self.model_tags.len()))
                .chain(group(MdsElementType::AniEnum, 1))
                .chain(group(MdsElementType::Animation, self.animations.len()))
                .chain(group(MdsElementType::AnimationAlias, self.aliases.len()))
                .chain(group(MdsElementType::AnimationBlend, self.blends.len()))
                .chain(group(MdsElementType::AnimationCombine, self.combinations.len()))
                .chain(group(MdsElementType::AniEnumEnd, 1)),
        )
    }
}

impl MdsParser for ModelScript {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self> {
        let config = ParserConfig::default();
        let mut tracker = ResourceTracker::new();
        parse_chunks_with_config(data, &config, &mut tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        Model ("HuS")
        {
            meshAndTree ("Hum_Body_Naked0.ASC" DONT_USE_MESH)
            registerMesh ("Hum_Body_Naked0.ASC")
            aniEnum
            {
                modelTag ("DEF_HIT_LIMB" "ZS_RIGHTHAND")
                ani ("s_Run" 1 "s_Run" 0.0 0.1 M. "Hum_RunLoop_M01.asc" F 1 20)
                {
                    *eventSFXGrnd (2 "Run")
                    *eventTag (0 "DEF_CREATE_ITEM" "ZS_RIGHTHAND" "ItMw_1H_Sword")
                }
                aniAlias ("s_RunBack" 1 "s_RunBack" 0.0 0.1 M. "s_Run" R)
                aniBlend ("t_Run_2_Walk" "s_Walk" 0.2 0.2)
                aniComb ("t_Look" 9 "t_Look" 0.3 0.3 M. "c_Look_" 9)
                aniDisable ("s_Walk")
            }
        }
    "#;

    #[test]
    fn test_load_sniffs_source_and_binary() {
        let from_source = ModelScript::load(SCRIPT.as_bytes()).unwrap();
        assert_eq!(from_source.skeleton.name, "Hum_Body_Naked0.ASC");
        assert!(from_source.skeleton.disable_mesh);

        let compiled = from_source.to_binary("HuS").unwrap();
        assert!(utils::is_binary(&compiled));

        let from_binary = ModelScript::load(&compiled).unwrap();
        assert_eq!(from_source, from_binary);
    }

    #[test]
    fn test_generate_dispatches_on_format() {
        let script = ModelScript::from_source(SCRIPT).unwrap();
        let source = script.generate("HuS", ScriptFormat::Source).unwrap();
        assert!(source.starts_with(b"Model (\"HuS\")"));

        let binary = script.generate("HuS", ScriptFormat::Binary).unwrap();
        assert_eq!(binary, script.to_binary("HuS").unwrap());
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let result = ModelScript::load(&[b'a', b'n', b'i', 0xFF, 0xFE]);
        assert!(matches!(result, Err(MdsError::InvalidTextEncoding { offset: 3 })));
    }

    #[test]
    fn test_input_size_limit() {
        let config = ParserConfig {
            max_input_size: 8,
            ..Default::default()
        };
        let result = ModelScript::from_source_with_config(SCRIPT, config);
        assert!(matches!(result, Err(MdsError::DataSizeExceedsLimit { .. })));
    }

    #[test]
    fn test_elements_follow_recorded_order() {
        let script = ModelScript::from_source(SCRIPT).unwrap();
        let kinds: Vec<_> = script.elements().map(|line| line.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MdsElementType::Skeleton,
                MdsElementType::Mesh,
                MdsElementType::AniEnum,
                MdsElementType::ModelTag,
                MdsElementType::Animation,
                MdsElementType::AnimationAlias,
                MdsElementType::AnimationBlend,
                MdsElementType::AnimationCombine,
                MdsElementType::AnimationDisabled,
                MdsElementType::AniEnumEnd,
            ]
        );
    }

    #[test]
    fn test_elements_canonical_order_without_lines() {
        let script = ModelScript {
            meshes: vec!["A.ASC".to_string()],
            animations: vec![MdsAnimation::default()],
            disabled_animations: vec!["S_OLD".to_string()],
            ..Default::default()
        };
        let kinds: Vec<_> = script.elements().map(|line| line.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MdsElementType::Mesh,
                MdsElementType::AnimationDisabled,
                MdsElementType::AniEnum,
                MdsElementType::Animation,
                MdsElementType::AniEnumEnd,
            ]
        );

        assert_eq!(ModelScript::default().elements().count(), 0);
    }

    #[test]
    fn test_unplaced_elements_are_reported() {
        let mut script = ModelScript::from_source(SCRIPT).unwrap();
        assert!(script.unplaced_elements().is_empty());

        script.meshes.push("EXTRA.ASC".to_string());
        script.blends.push(MdsAnimationBlend::default());
        script.blends.push(MdsAnimationBlend::default());
        assert_eq!(
            script.unplaced_elements(),
            vec![(MdsElementType::Mesh, 1), (MdsElementType::AnimationBlend, 2)]
        );

        // entries without a position are left out of the output
        let lines = script.lines.len();
        assert_eq!(script.elements().count(), lines);
    }

    #[test]
    fn test_json_export() {
        let script = ModelScript::from_source(SCRIPT).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        let back: ModelScript = serde_json::from_str(&json).unwrap();
        assert_eq!(script, back);
    }
}
