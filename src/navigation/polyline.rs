//! Decoder for the provider's path encoding: plain text, not Google's
//! encoded-polyline format. A fragment is `lon,lat` pairs joined by `;`.

use crate::entities::Coordinate;

const PAIR_DELIMITER: char = ';';
const AXIS_DELIMITER: char = ',';

/// Decodes every fragment and concatenates the results in input order.
///
/// Pairs that are not exactly two floats are skipped, so a partially
/// malformed fragment yields a partial path. No fragments, no path.
pub fn decode<S: AsRef<str>>(fragments: &[S]) -> Vec<Coordinate> {
    fragments
        .iter()
        .flat_map(|fragment| fragment.as_ref().split(PAIR_DELIMITER))
        .filter_map(parse_pair)
        .collect()
}

/// Parses a single `"longitude,latitude"` pair.
pub fn parse_pair(pair: &str) -> Option<Coordinate> {
    let mut axes = pair.split(AXIS_DELIMITER);

    let longitude = axes.next()?.trim().parse::<f64>().ok()?;
    let latitude = axes.next()?.trim().parse::<f64>().ok()?;

    if axes.next().is_some() || !longitude.is_finite() || !latitude.is_finite() {
        return None;
    }

    Some(Coordinate::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_pairs_are_skipped() {
        let path = decode(&["1.0,2.0;bad;3.0,4.0"]);

        assert_eq!(
            path,
            vec![Coordinate::new(2.0, 1.0), Coordinate::new(4.0, 3.0)]
        );
    }

    #[test]
    fn fragments_concatenate_in_order() {
        let path = decode(&["113.1,23.1;113.2,23.2", "", "113.3,23.3"]);

        let longitudes: Vec<f64> = path.iter().map(|c| c.longitude).collect();
        assert_eq!(longitudes, vec![113.1, 113.2, 113.3]);
    }

    #[test]
    fn no_fragments_is_an_empty_path() {
        let fragments: [&str; 0] = [];
        assert!(decode(&fragments).is_empty());
    }

    #[test]
    fn pair_needs_exactly_two_axes() {
        assert_eq!(parse_pair("1.0"), None);
        assert_eq!(parse_pair("1.0,2.0,3.0"), None);
        assert_eq!(parse_pair("1.0,"), None);
        assert_eq!(parse_pair("NaN,2.0"), None);
        assert_eq!(parse_pair(" 1.5 , 2.5 "), Some(Coordinate::new(2.5, 1.5)));
    }

    #[test]
    fn trailing_delimiter_is_harmless() {
        let path = decode(&[String::from("1.0,2.0;")]);
        assert_eq!(path, vec![Coordinate::new(2.0, 1.0)]);
    }
}
