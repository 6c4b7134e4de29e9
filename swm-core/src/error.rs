pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to push to heapless datastructure, limit was {0}")]
    HeaplessPush(usize),
    #[error("Failed to parse color {0:?}, expected #rrggbb")]
    ColorParse(String),
    #[error("Too many tags configured, got {0} but at most 31 fit in a tag mask")]
    TooManyTags(usize),
    #[error("Could not find a configuration directory, neither XDG_CONFIG_HOME nor HOME is set")]
    ConfigDirFind,
    #[error("No configuration file found")]
    ConfigFileFind,
    #[cfg(feature = "config-file")]
    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
