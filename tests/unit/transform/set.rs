use super::*;
use crate::transform::symmetry::Symmetry;

fn t(rx: u32, ry: u32, size: u32, scale: f64) -> Transform {
    Transform::new(0, 0, rx, ry, size, Symmetry::Identity, scale, 3)
}

#[test]
fn channel_counts_other_than_one_or_three_are_rejected() {
    assert!(TransformSet::new(1).is_ok());
    assert!(TransformSet::new(3).is_ok());
    assert!(TransformSet::new(0).is_err());
    assert!(TransformSet::new(2).is_err());
    assert!(TransformSet::from_channels(vec![vec![], vec![]]).is_err());
}

#[test]
fn channel_lookup_respects_declared_range() {
    let set = TransformSet::from_channels(vec![vec![t(0, 0, 4, 0.5)]]).unwrap();
    assert_eq!(set.channel(1).unwrap().len(), 1);
    assert!(set.channel(0).is_err());
    assert!(set.channel(2).is_err());
}

#[test]
fn summary_helpers() {
    let set = TransformSet::from_channels(vec![
        vec![t(0, 0, 4, 0.5), t(4, 0, 4, -0.9)],
        vec![t(0, 0, 8, 0.1)],
        vec![],
    ])
    .unwrap();
    assert_eq!(set.len(), 3);
    assert!(!set.is_empty());
    assert_eq!(set.max_abs_scale(), 0.9);
    let hist = set.block_size_histogram();
    assert_eq!(hist.get(&4), Some(&2));
    assert_eq!(hist.get(&8), Some(&1));
    let channels: Vec<usize> = set.iter().map(|(c, _)| c).collect();
    assert_eq!(channels, vec![1, 1, 2]);
}

#[test]
fn json_round_trip_keeps_scale_bits() {
    let scale = 0.1 + 0.2; // not exactly representable in short decimal form
    let set = TransformSet::from_channels(vec![vec![Transform::new(
        16,
        0,
        8,
        8,
        8,
        Symmetry::FlipReverseDiagonal,
        scale,
        -17,
    )]])
    .unwrap();
    let encoded = EncodedImage::new(32, 32, set);

    let mut buf = Vec::new();
    encoded.to_writer(&mut buf).unwrap();
    let back = EncodedImage::from_reader(buf.as_slice()).unwrap();
    assert_eq!(back, encoded);
    let t0 = back.transforms.channel(1).unwrap()[0];
    assert_eq!(t0.scale.to_bits(), scale.to_bits());
    assert_eq!(t0.symmetry, Symmetry::FlipReverseDiagonal);
}

#[test]
fn validate_rejects_bad_files() {
    let set = TransformSet::from_channels(vec![vec![t(28, 0, 8, 0.5)]]).unwrap();
    assert!(EncodedImage::new(32, 32, set).validate().is_err());

    let ok = TransformSet::from_channels(vec![vec![t(24, 24, 8, 0.5)]]).unwrap();
    let mut encoded = EncodedImage::new(32, 32, ok);
    assert!(encoded.validate().is_ok());
    encoded.version = 99;
    assert!(encoded.validate().is_err());
}

#[test]
fn undeclared_channel_data_is_rejected_on_load() {
    let json = r#"{
        "version": 1, "width": 32, "height": 32,
        "transforms": {
            "channels": 1,
            "transforms": [[], [{"domain_x":0,"domain_y":0,"range_x":0,"range_y":0,
                                  "size":32,"symmetry":0,"scale":0.0,"offset":5}], []]
        }
    }"#;
    assert!(EncodedImage::from_reader(json.as_bytes()).is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = EncodedImage::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(matches!(err, FractalError::Serde(_)));
}
