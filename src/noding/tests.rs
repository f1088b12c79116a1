#[cfg(test)]
mod tests {
    use crate::noding::{
        node_lines, McIndexSnapRounder, Noder, NodingValidator, ScaledNoder, SegmentString,
    };
    use geo_types::{Coord, LineString};

    fn strings(lines: &[LineString<f64>]) -> Vec<SegmentString> {
        lines.iter().map(|l| SegmentString::from_line_string(l).unwrap()).collect()
    }

    #[test]
    fn test_node_lines_floating() {
        let lines = vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]),
            LineString::from(vec![(5.0, -5.0), (5.0, 5.0)]),
        ];
        let noded = node_lines(&lines, None).unwrap();
        assert_eq!(noded.len(), 4);
        assert_eq!(noded[0], LineString::from(vec![(0.0, 0.0), (5.0, 0.0)]));
        assert_eq!(noded[3], LineString::from(vec![(5.0, 0.0), (5.0, 5.0)]));
    }

    #[test]
    fn test_node_lines_snap_rounded_is_valid() {
        // A star of lines through nearly the same point.
        let lines = vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 10.3)]),
            LineString::from(vec![(0.0, 10.0), (10.1, 0.0)]),
            LineString::from(vec![(0.0, 5.1), (10.0, 4.9)]),
            LineString::from(vec![(4.9, 0.0), (5.2, 10.0)]),
        ];
        let noded = node_lines(&lines, Some(1.0)).unwrap();
        let out = strings(&noded);
        assert_eq!(NodingValidator::new(&out).check_valid(), Ok(()));
        for line in &noded {
            for c in line.coords() {
                assert_eq!(c.x, c.x.round());
                assert_eq!(c.y, c.y.round());
            }
        }
    }

    #[test]
    fn test_closed_ring_crossed_by_line() {
        let lines = vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            LineString::from(vec![(-5.0, 5.0), (15.0, 5.0)]),
        ];
        let noded = node_lines(&lines, Some(1.0)).unwrap();
        // The ring start is always a node, so both split in three.
        assert_eq!(noded.len(), 6);
        assert_eq!(NodingValidator::new(&strings(&noded)).check_valid(), Ok(()));
    }

    #[test]
    fn test_scaled_snap_rounding_is_valid() {
        let input = strings(&[
            LineString::from(vec![(0.0, 0.0), (1.0, 1.03), (2.0, 0.0)]),
            LineString::from(vec![(0.0, 0.51), (2.0, 0.49)]),
            LineString::from(vec![(0.99, -1.0), (1.01, 2.0)]),
        ]);
        let rounder = McIndexSnapRounder::new(1.0).unwrap();
        let mut noder = ScaledNoder::new(rounder, 100.0).unwrap();
        let out = noder.compute_nodes(input).unwrap();
        assert!(out.len() >= 7);
        assert_eq!(NodingValidator::new(&out).check_valid(), Ok(()));
    }

    #[test]
    fn test_degenerate_input_is_rejected() {
        let lines = vec![LineString::from(vec![(0.0, 0.0), (0.0, 0.0), (1.0, 1.0)])];
        assert!(node_lines(&lines, None).is_err());
        assert!(node_lines(&lines, Some(10.0)).is_err());
        let single = vec![LineString::new(vec![Coord { x: 1.0, y: 1.0 }])];
        assert!(node_lines(&single, None).is_err());
    }
}
