//! Integration tests for both script representations
//!
//! Scripts are assembled with the fixture builders and pushed through the public API in
//! every direction.

use bytes::Bytes;
use mds_parser::{
    ErrorCategory, EventKind, MdsElementType, MdsError, MdsEventType, MdsParser, MdsSkeleton,
    ModelScript, ParserConfig, ScriptFormat,
};

mod fixtures;
use fixtures::builders::*;

#[test]
fn test_empty_binary_scenario() {
    let script = ModelScript::load(&ScriptGenerators::empty_binary()).unwrap();
    assert_eq!(script, ModelScript::default());
    assert_eq!(script.skeleton, MdsSkeleton::default());
    assert!(script.animations.is_empty());
}

#[test]
fn test_binary_round_trip_is_exact() {
    let script = ScriptGenerators::humans().build();
    let compiled = script.to_binary("HUMANS").unwrap();
    let decoded = ModelScript::from_binary(&compiled).unwrap();
    assert_eq!(decoded, script);

    // stable output
    assert_eq!(decoded.to_binary("HUMANS").unwrap(), compiled);
}

#[test]
fn test_source_round_trip() {
    let script = ScriptGenerators::humans().build();
    let source = script.to_source("HUMANS").unwrap();
    let reparsed = ModelScript::from_source(&source).unwrap();
    assert_eq!(reparsed, script);
    assert_eq!(reparsed.to_source("HUMANS").unwrap(), source);
}

#[test]
fn test_cross_format_equivalence() {
    let source = ScriptGenerators::humans().build_source("HUMANS").unwrap();
    let from_source = ModelScript::from_source(&source).unwrap();

    let compiled = from_source.to_binary("HUMANS").unwrap();
    let from_binary = ModelScript::from_binary(&compiled).unwrap();
    assert_eq!(from_source, from_binary);

    // and back to text without loss
    assert_eq!(from_binary.to_source("HUMANS").unwrap(), source);
}

#[test]
fn test_event_order_survives_both_formats() {
    let script = ScriptGenerators::humans().build();
    let attack = script
        .animations
        .iter()
        .find(|a| a.name == "T_1HATTACKL")
        .unwrap();
    let expected: Vec<_> = attack.events_in_order().map(|l| l.kind).collect();
    assert_eq!(
        expected,
        vec![
            MdsEventType::SoundEffect,
            MdsEventType::EventTag,
            MdsEventType::EventTag,
            MdsEventType::ParticleEffect,
            MdsEventType::EventTag,
            MdsEventType::ParticleEffectStop,
            MdsEventType::SoundEffect,
        ]
    );

    for format in [ScriptFormat::Binary, ScriptFormat::Source] {
        let data = script.generate("HUMANS", format).unwrap();
        let decoded = ModelScript::load(&data).unwrap();
        let attack = decoded
            .animations
            .iter()
            .find(|a| a.name == "T_1HATTACKL")
            .unwrap();
        let order: Vec<_> = attack.events_in_order().map(|l| l.kind).collect();
        assert_eq!(order, expected, "order lost through {:?}", format);
        assert_eq!(attack.events[0].kind, EventKind::OptimalFrame);
        assert_eq!(attack.events[1].frames, vec![20, 30]);
    }
}

#[test]
fn test_unknown_chunk_between_known_chunks() {
    let compiled = ModelScriptBuilder::new()
        .mesh("A.ASC")
        .mesh("B.ASC")
        .build_binary("HuS")
        .unwrap();

    // splice an unknown chunk in front of the second mesh
    let first_mesh_end = 10 + 10 + (6 + 6);
    let mut patched = compiled[..first_mesh_end].to_vec();
    patched.extend_from_slice(&[0x10, 0xF5, 0x03, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC]);
    patched.extend_from_slice(&compiled[first_mesh_end..]);

    let script = ModelScript::from_binary(&patched).unwrap();
    assert_eq!(script.meshes, vec!["A.ASC".to_string(), "B.ASC".to_string()]);
}

#[test]
fn test_truncated_binary() {
    let result = ModelScript::load(&InvalidScriptGenerators::truncated_binary());
    match result {
        Err(e @ MdsError::TruncatedStream { .. }) => {
            assert_eq!(e.category(), ErrorCategory::BinaryFormat);
            assert_eq!(e.code(), 2002);
        },
        other => panic!("Expected TruncatedStream, got {:?}", other),
    }
}

#[test]
fn test_text_errors_carry_lines() {
    let err = ModelScript::load(InvalidScriptGenerators::unknown_keyword().as_bytes()).unwrap_err();
    assert!(matches!(err, MdsError::UnknownKeyword { .. }));
    assert_eq!(err.line(), Some(5));
    assert_eq!(err.category(), ErrorCategory::TextGrammar);

    let err = ModelScript::from_source(InvalidScriptGenerators::bad_direction()).unwrap_err();
    assert!(matches!(err, MdsError::InvalidEnumValue { .. }));
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_security_config_rejects_deep_scripts() {
    let source = ScriptGenerators::humans().build_source("HUMANS").unwrap();

    // Model, aniEnum and animation bodies nest three deep
    let config = ParserConfig {
        max_block_depth: 2,
        ..ParserConfig::security_focused()
    };
    let result = ModelScript::from_source_with_config(&source, config);
    assert!(matches!(result, Err(MdsError::ParseStackOverflow { .. })));

    assert!(ModelScript::from_source_with_config(&source, ParserConfig::security_focused()).is_ok());
}

#[test]
fn test_parser_trait_on_model_script() {
    let compiled = ScriptGenerators::humans().build_binary("HUMANS").unwrap();
    let mut data = Bytes::from(compiled);
    let script = ModelScript::from_bytes(&mut data).unwrap();
    assert_eq!(script.animations.len(), 4);
    assert_eq!(script.lines.first().map(|l| l.kind), Some(MdsElementType::Skeleton));
    assert_eq!(script.lines.last().map(|l| l.kind), Some(MdsElementType::AniEnumEnd));
}

#[test]
fn test_hand_assembled_script_gets_canonical_order() {
    let script = ModelScriptBuilder::new()
        .animation("S_IDLE", |a| a.model("HUM_IDLE.ASC").frames(0, 50).sfx(10, "BREATH"))
        .mesh("HUM_BODY.ASC")
        .raw(|s| s.lines.clear())
        .build();

    let decoded = ModelScript::from_source(&script.to_source("HuS").unwrap()).unwrap();
    let kinds: Vec<_> = decoded.lines.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MdsElementType::Mesh,
            MdsElementType::AniEnum,
            MdsElementType::Animation,
            MdsElementType::AniEnumEnd,
        ]
    );
    assert_eq!(decoded.animations[0].sfx[0].name, "BREATH");
}
