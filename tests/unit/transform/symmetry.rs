use super::*;

fn mapping(sym: Symmetry, size: u32) -> Vec<(u32, u32)> {
    let t = sym.traversal();
    let mut out = Vec::new();
    for dy in 0..size {
        for dx in 0..size {
            out.push(t.source_of(dx, dy, size));
        }
    }
    out
}

#[test]
fn ordinals_round_trip() {
    for (i, s) in Symmetry::ALL.into_iter().enumerate() {
        assert_eq!(usize::from(s.ordinal()), i);
        assert_eq!(Symmetry::from_ordinal(i as u8).unwrap(), s);
    }
    assert!(Symmetry::from_ordinal(8).is_err());
}

#[test]
fn names_parse_back() {
    for s in Symmetry::ALL {
        assert_eq!(s.to_string().parse::<Symmetry>().unwrap(), s);
    }
    assert!("rot45".parse::<Symmetry>().is_err());
}

#[test]
fn all_eight_mappings_are_distinct_permutations() {
    let size = 4;
    let mut seen = Vec::new();
    for s in Symmetry::ALL {
        let m = mapping(s, size);
        let mut sorted = m.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), (size * size) as usize, "{s} is not a permutation");
        assert!(!seen.contains(&m), "{s} duplicates another symmetry");
        seen.push(m);
    }
}

#[test]
fn rot90_rotates_clockwise() {
    // top-left source pixel lands in the top-right corner
    let t = Symmetry::Rot90.traversal();
    assert_eq!(t.source_of(3, 0, 4), (0, 0));
    assert_eq!(t.source_of(0, 0, 4), (0, 3));
}

#[test]
fn inverse_composes_to_identity() {
    let size = 3;
    for s in Symmetry::ALL {
        let fwd = s.traversal();
        let back = s.inverse().traversal();
        for dy in 0..size {
            for dx in 0..size {
                let (mx, my) = back.source_of(dx, dy, size);
                assert_eq!(fwd.source_of(mx, my, size), (dx, dy), "{s}");
            }
        }
    }
}

#[test]
fn symmetry_serializes_as_ordinal() {
    let json = serde_json::to_string(&Symmetry::FlipVertical).unwrap();
    assert_eq!(json, "5");
    let back: Symmetry = serde_json::from_str("3").unwrap();
    assert_eq!(back, Symmetry::Rot270);
    assert!(serde_json::from_str::<Symmetry>("9").is_err());
}

#[test]
fn symmetry_set_membership() {
    let set = SymmetrySet::default();
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![Symmetry::Identity]);

    let full = SymmetrySet::searchable();
    assert_eq!(full.len(), 7);
    assert!(!full.contains(Symmetry::FlipDiagonal));

    let custom = SymmetrySet::empty()
        .with(Symmetry::Rot180)
        .with(Symmetry::Identity);
    assert_eq!(
        custom.iter().collect::<Vec<_>>(),
        vec![Symmetry::Identity, Symmetry::Rot180]
    );
    let json = serde_json::to_string(&custom).unwrap();
    assert_eq!(json, "[0,2]");
    let back: SymmetrySet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, custom);
}
