use super::*;

#[test]
fn defaults_search_identity_sequentially() {
    let opts = EncoderOptions::default();
    assert!(opts.validate().is_ok());
    assert_eq!(
        opts.symmetries.iter().collect::<Vec<_>>(),
        vec![Symmetry::Identity]
    );
    assert!(!opts.threading.parallel);
}

#[test]
fn flip_diagonal_and_empty_sets_are_rejected() {
    let mut opts = EncoderOptions {
        symmetries: SymmetrySet::empty(),
        ..EncoderOptions::default()
    };
    assert!(opts.validate().is_err());
    opts.symmetries = SymmetrySet::searchable().with(Symmetry::FlipDiagonal);
    assert!(opts.validate().is_err());
    opts.symmetries = SymmetrySet::searchable();
    assert!(opts.validate().is_ok());
}

#[test]
fn zero_threads_is_rejected() {
    let opts = EncoderOptions {
        threading: EncodeThreading {
            parallel: true,
            threads: Some(0),
        },
        ..EncoderOptions::default()
    };
    assert!(opts.validate().is_err());
}

#[test]
fn partial_json_fills_defaults() {
    let opts = EncoderOptions::from_reader(r#"{ "quality_threshold": 12 }"#.as_bytes()).unwrap();
    assert_eq!(opts.quality_threshold, 12);
    assert_eq!(opts.symmetries, SymmetrySet::identity_only());

    let opts =
        EncoderOptions::from_reader(r#"{ "symmetries": [0, 1, 2], "threading": { "parallel": true } }"#.as_bytes())
            .unwrap();
    assert_eq!(opts.symmetries.len(), 3);
    assert!(opts.threading.parallel);
    assert_eq!(opts.threading.threads, None);
}

#[test]
fn unknown_fields_and_invalid_sets_fail_to_load() {
    assert!(EncoderOptions::from_reader(r#"{ "quality": 1 }"#.as_bytes()).is_err());
    assert!(EncoderOptions::from_reader(r#"{ "symmetries": [7] }"#.as_bytes()).is_err());
}
