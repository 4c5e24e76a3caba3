use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document ended with {0} unclosed element(s)")]
    Unclosed(usize),
}
