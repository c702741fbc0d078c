use thiserror::Error;

#[derive(Debug, Error)]
pub enum KmlError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}
