//! Line validation.

use crate::error::{LineError, Result};

use super::Line;

/// Validate a line configuration before solving.
///
/// Checks:
/// - The line has at least one station
/// - Buffer count equals station count minus one
/// - Every service rate is finite and strictly positive
pub fn validate_line(line: &Line) -> Result<()> {
    if line.stations.is_empty() {
        return Err(LineError::configuration("Line has no stations"));
    }

    if line.buffer_count() != line.station_count() - 1 {
        return Err(LineError::configuration(format!(
            "Expected {} buffers for {} stations, got {}",
            line.station_count() - 1,
            line.station_count(),
            line.buffer_count()
        )));
    }

    for (i, station) in line.stations.iter().enumerate() {
        if !station.rate.is_finite() || station.rate <= 0.0 {
            return Err(LineError::invalid_parameter(
                format!("mu[{i}]"),
                format!("Service rate must be finite and positive, got {}", station.rate),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{Buffer, Station};

    #[test]
    fn test_valid_line() {
        let line = Line::from_rates(&[1.0, 2.0, 3.0], &[4, 5]);
        assert!(validate_line(&line).is_ok());
    }

    #[test]
    fn test_single_station_line() {
        let line = Line::from_rates(&[1.0], &[]);
        assert!(validate_line(&line).is_ok());
    }

    #[test]
    fn test_empty_line_rejected() {
        let line = Line::new(vec![], vec![]);
        assert!(matches!(
            validate_line(&line),
            Err(LineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_buffer_count_mismatch() {
        let line = Line::from_rates(&[10.0, 10.0, 10.0], &[5]);
        assert!(matches!(
            validate_line(&line),
            Err(LineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_nonpositive_rate_rejected() {
        let line = Line::new(
            vec![Station::new(1.0), Station::new(0.0)],
            vec![Buffer::new(2)],
        );
        assert!(matches!(
            validate_line(&line),
            Err(LineError::InvalidParameter { .. })
        ));

        let line = Line::from_rates(&[1.0, f64::NAN], &[2]);
        assert!(matches!(
            validate_line(&line),
            Err(LineError::InvalidParameter { .. })
        ));
    }
}
