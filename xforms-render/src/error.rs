use std::fmt;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Position of a template element, attached to fatal rendering errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationData {
    pub line: u32,
    pub column: u32,
    pub description: Option<String>,
}

impl LocationData {
    pub fn new(line: u32, column: u32) -> Self {
        LocationData {
            line,
            column,
            description: None,
        }
    }

    /// Same position, with a description of what was being done there.
    pub fn describe(&self, description: &str) -> Self {
        LocationData {
            description: Some(description.to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Display for LocationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)?;
        if let Some(description) = &self.description {
            write!(f, ", {}", description)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("XML parse error: {0}")]
    XmlError(String),

    #[error("Control element <{element}> is missing its 'id' attribute at {location}")]
    MissingId {
        element: String,
        location: LocationData,
    },

    #[error("Duplicate id '{id}': control ids must be unique within their component scope")]
    DuplicateId { id: String },

    #[error("No live control found with effective id '{id}'")]
    UnknownControl { id: String },

    #[error("No renderer registered for control element <{element}> at {location}")]
    NoHandler {
        element: String,
        location: LocationData,
    },

    #[error("Control '{id}' is a live {actual} control but the template declares a {expected} at {location}")]
    ControlTypeMismatch {
        id: String,
        expected: String,
        actual: String,
        location: LocationData,
    },

    #[error("Missing label on {control} control '{id}' at {location}")]
    MissingLabel {
        control: String,
        id: String,
        location: LocationData,
    },

    #[error("Invalid part order '{order}': expected a permutation of label, control, help, alert, hint")]
    InvalidPartOrder { order: String },

    #[error("Invalid appearance '{appearance}' at {location}")]
    InvalidAppearance {
        appearance: String,
        location: LocationData,
    },

    #[error("Invalid mediatype attribute value '{value}' at {location}")]
    InvalidMediatype {
        value: String,
        location: LocationData,
    },

    #[error("No prefix found for the XHTML namespace at {location}")]
    NoXhtmlPrefix { location: LocationData },

    #[error("Output error: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{source} ({location})")]
    Located {
        location: LocationData,
        source: Box<RenderError>,
    },
}

impl RenderError {
    /// Wrap this error with the location of the construct being rendered.
    pub fn located(self, location: LocationData) -> Self {
        RenderError::Located {
            location,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any location wrappers.
    pub fn root_cause(&self) -> &RenderError {
        match self {
            RenderError::Located { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<roxmltree::Error> for RenderError {
    fn from(err: roxmltree::Error) -> Self {
        RenderError::XmlError(err.to_string())
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

impl From<std::fmt::Error> for RenderError {
    fn from(err: std::fmt::Error) -> Self {
        RenderError::Output(err.to_string())
    }
}
