use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error reading or writing file \"{file}\": {source}")]
    FileIo {
        file: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Error parsing record {idx} from \"{origin}\": {source}")]
    ParseRecord {
        origin: String,
        idx: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Error reading configuration file \"{file}\": {source}")]
    Config {
        file: String,
        source: serde_yaml::Error,
    },
    #[error("Error parsing \"{string}\" in \"{context}\": {reason}")]
    Parse {
        string: String,
        context: String,
        reason: &'static str,
    },
    #[error("Output file \"{0}\" already exists, use overwrite to replace it")]
    OutputExists(String),
    #[error("Invalid sampling probability {0}, expected a value between 0 and 1")]
    InvalidProbability(f64),
    #[error("Unpaired read in {0}")]
    UnpairedRead(String),
    #[error("Files \"{first}\" and \"{second}\" differ: {reason}")]
    Mismatch {
        first: String,
        second: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn file_io(
        file: impl AsRef<Path>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::FileIo {
            file: path_str(file),
            source: Box::new(source),
        }
    }

    pub(crate) fn mismatch(
        first: impl AsRef<Path>,
        second: impl AsRef<Path>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Mismatch {
            first: path_str(first),
            second: path_str(second),
            reason: reason.into(),
        }
    }
}

pub fn utf8(b: &[u8]) -> String {
    String::from_utf8_lossy(b).into_owned()
}

pub fn path_str(p: impl AsRef<Path>) -> String {
    p.as_ref().display().to_string()
}
