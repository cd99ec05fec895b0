use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Degenerate line segment: endpoints ({x1}, {y1}) and ({x2}, {y2}) do not define a line")]
    DegenerateInput { x1: f64, y1: f64, x2: f64, y2: f64 },

    #[error("Invalid rectangle geometry: width {width}, height {height}")]
    InvalidGeometry { width: f64, height: f64 },

    #[error("Invalid blob area: {area}")]
    InvalidArea { area: f64 },

    #[error("Frame {index} rejected: {source}")]
    Frame {
        index: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid detector config: {0}")]
    InvalidConfig(String),

    #[error("No object has matched the counting line yet")]
    NoMatchedObject,

    #[error("Config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
