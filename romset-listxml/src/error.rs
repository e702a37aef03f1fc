/// Errors that can occur while parsing a `-listxml` catalog.
#[derive(Debug, thiserror::Error)]
pub enum ListXmlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error at byte {offset}: {source}")]
    Parse {
        offset: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

impl ListXmlError {
    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }
}
