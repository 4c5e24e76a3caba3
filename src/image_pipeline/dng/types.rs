//! DNG conversion configuration types

/// DNG format version written to `DNGVersion`.
pub const DNG_VERSION: [u8; 4] = [1, 4, 0, 0];
/// Oldest reader version able to open the output.
pub const DNG_BACKWARD_VERSION: [u8; 4] = [1, 0, 0, 0];
/// Tool identity written to `Software`.
pub const DEFAULT_SOFTWARE: &str = concat!("tiff_to_dng_rs ", env!("CARGO_PKG_VERSION"));
/// Tool identity written to `UniqueCameraModel`.
pub const DEFAULT_UNIQUE_CAMERA_MODEL: &str = "tiff_to_dng_rs Linear Raw";
/// Largest width or height accepted by default.
pub const DEFAULT_MAX_DIMENSION: u32 = 65535;

/// Tool-identity defaults and version constants stamped into every file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DngIdentity {
    pub software: String,
    pub unique_camera_model: String,
    pub dng_version: [u8; 4],
    pub dng_backward_version: [u8; 4],
}

impl Default for DngIdentity {
    fn default() -> Self {
        Self {
            software: DEFAULT_SOFTWARE.to_string(),
            unique_camera_model: DEFAULT_UNIQUE_CAMERA_MODEL.to_string(),
            dng_version: DNG_VERSION,
            dng_backward_version: DNG_BACKWARD_VERSION,
        }
    }
}

/// Configuration for TIFF to DNG conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Whether to validate image dimensions before conversion
    pub validate_dimensions: bool,
    /// Upper bound for width and height when validating
    pub max_dimension: Option<u32>,
    /// Identity strings and version constants
    pub identity: DngIdentity,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            validate_dimensions: true,
            max_dimension: Some(DEFAULT_MAX_DIMENSION),
            identity: DngIdentity::default(),
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<u32>>,
    software: Option<String>,
    unique_camera_model: Option<String>,
}

impl ConversionConfigBuilder {
    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<u32>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn software(mut self, software: impl Into<String>) -> Self {
        self.software = Some(software.into());
        self
    }

    pub fn unique_camera_model(mut self, model: impl Into<String>) -> Self {
        self.unique_camera_model = Some(model.into());
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        let identity = DngIdentity {
            software: self.software.unwrap_or(default.identity.software),
            unique_camera_model: self
                .unique_camera_model
                .unwrap_or(default.identity.unique_camera_model),
            ..default.identity
        };
        ConversionConfig {
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            identity,
        }
    }
}
