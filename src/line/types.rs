//! Core types for line representation.

/// A single processing station with an exponential service rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    /// Service rate (parts per time unit) of the exponential
    /// service-time distribution.
    pub rate: f64,
}

impl Station {
    /// Create a station with the given service rate.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Mean processing time per part (1 / rate).
    pub fn mean_service_time(&self) -> f64 {
        1.0 / self.rate
    }
}

/// A finite buffer between two adjacent stations.
///
/// Buffer `i` sits between station `i` and station `i + 1`. Capacity is
/// the number of parts the buffer can hold, excluding the parts currently
/// in service at the adjacent stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buffer {
    /// Maximum number of parts the buffer can hold.
    pub capacity: usize,
}

impl Buffer {
    /// Create a buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

/// A serial production line: M stations separated by M - 1 finite buffers.
///
/// Read-only configuration. The solver never mutates a `Line`; all
/// iteration state lives in the decomposition engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Stations in flow order.
    pub stations: Vec<Station>,
    /// Buffers in flow order; `buffers[i]` sits between `stations[i]`
    /// and `stations[i + 1]`.
    pub buffers: Vec<Buffer>,
}

impl Line {
    /// Create a line from explicit station and buffer lists.
    pub fn new(stations: Vec<Station>, buffers: Vec<Buffer>) -> Self {
        Self { stations, buffers }
    }

    /// Create a line from raw service rates and buffer capacities.
    pub fn from_rates(rates: &[f64], capacities: &[usize]) -> Self {
        Self {
            stations: rates.iter().map(|&r| Station::new(r)).collect(),
            buffers: capacities.iter().map(|&c| Buffer::new(c)).collect(),
        }
    }

    /// Number of stations M.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Number of buffers (M - 1 for a valid line).
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Service rate of station `i`.
    pub fn rate(&self, i: usize) -> f64 {
        self.stations[i].rate
    }

    /// Capacity of buffer `i`.
    pub fn capacity(&self, i: usize) -> usize {
        self.buffers[i].capacity
    }
}
