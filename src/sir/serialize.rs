//! SIR wire format.
//!
//! Canonical form: compact JSON bytes. The polymorphic nodes carry an
//! explicit `"kind"` tag, so the stream is self-describing and unknown
//! variants fail cleanly instead of mis-parsing. `to_text` is the
//! lossless pretty transcoding for inspection; `deserialize` accepts
//! both forms.

use crate::error::CompileError;
use crate::sir::Sir;

/// Serialize a SIR to its canonical compact wire form.
pub fn serialize(sir: &Sir) -> Vec<u8> {
    // Plain structs and string-keyed maps only; encoding cannot fail.
    serde_json::to_vec(sir).expect("SIR encoding is infallible")
}

/// Decode a SIR from wire bytes (compact or pretty form).
pub fn deserialize(bytes: &[u8]) -> Result<Sir, CompileError> {
    serde_json::from_slice(bytes)
        .map_err(|e| CompileError::malformed_input(format!("{}", e)))
}

/// Lossless human-readable transcoding of the wire form.
pub fn to_text(sir: &Sir) -> String {
    serde_json::to_string_pretty(sir).expect("SIR encoding is infallible")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sir::builder::*;
    use crate::sir::{BuiltinType, Direction, GridType, LevelMarker, LocationType};

    fn sample_sir() -> Sir {
        let chain = make_neighbor_chain(vec![
            LocationType::Cell,
            LocationType::Edge,
            LocationType::Cell,
        ])
        .unwrap();
        let reduction = make_reduction_over_neighbors(
            "+",
            make_offset_field_access("in").unwrap(),
            make_literal("1.0", BuiltinType::Float).unwrap(),
            chain,
        )
        .unwrap();
        let assign =
            make_assignment(make_field_access("out").unwrap(), reduction, "=").unwrap();
        let region = make_vertical_region(
            vec![assign],
            make_interval(LevelMarker::Start, LevelMarker::End, 0, 0),
            Direction::Forward,
        )
        .unwrap();
        let fields = vec![
            make_field(
                "in",
                make_field_dimensions_unstructured(LocationType::Cell, 1).unwrap(),
            )
            .unwrap(),
            make_field(
                "out",
                make_field_dimensions_unstructured(LocationType::Cell, 1).unwrap(),
            )
            .unwrap(),
        ];
        let stencil = make_stencil("unstructured_stencil", fields, vec![region]).unwrap();
        make_sir("unstructured_stencil.cpp", GridType::Unstructured, vec![stencil]).unwrap()
    }

    #[test]
    fn test_round_trip_is_structurally_equal() {
        let sir = sample_sir();
        let bytes = serialize(&sir);
        let back = deserialize(&bytes).unwrap();
        assert_eq!(sir, back);
    }

    #[test]
    fn test_pretty_form_round_trips_too() {
        let sir = sample_sir();
        let text = to_text(&sir);
        let back = deserialize(text.as_bytes()).unwrap();
        assert_eq!(sir, back);
    }

    #[test]
    fn test_wire_form_carries_variant_tags() {
        let sir = sample_sir();
        let text = String::from_utf8(serialize(&sir)).unwrap();
        assert!(text.contains("\"kind\":\"VerticalRegion\""));
        assert!(text.contains("\"kind\":\"Assignment\""));
        assert!(text.contains("\"kind\":\"ReductionOverNeighbors\""));
        assert!(text.contains("\"kind\":\"Unstructured\""));
    }

    #[test]
    fn test_garbage_bytes_are_malformed_input() {
        let err = deserialize(b"not json at all").unwrap_err();
        assert!(matches!(err, CompileError::MalformedInput { .. }));
    }

    #[test]
    fn test_unknown_variant_tag_is_malformed_input() {
        let sir = sample_sir();
        let text = String::from_utf8(serialize(&sir)).unwrap();
        let broken = text.replace("ReductionOverNeighbors", "ReduceOverNbh");
        let err = deserialize(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::MalformedInput { .. }));
    }

    #[test]
    fn test_missing_required_field_is_malformed_input() {
        let err = deserialize(br#"{"filename":"x.cpp","stencils":[]}"#).unwrap_err();
        assert!(matches!(err, CompileError::MalformedInput { .. }));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let sir = sample_sir();
        assert_eq!(serialize(&sir), serialize(&sir));
    }
}
