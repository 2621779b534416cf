/// Card type code whose crop region is chosen by side rather than type
pub const IDENTITY_TYPE: &str = "identity";

/// Card type code for ice, whose art is printed sideways
pub const ICE_TYPE: &str = "ice";

/// One card to turn into a thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDescriptor {
    /// Unique card code, used as the output file stem
    pub code: String,
    pub title: String,
    /// Lowercase type code, e.g. `agenda`, `ice`, `identity`
    pub card_type: String,
    /// Lowercase side code (`corp`/`runner`); only consulted for identities
    pub side: Option<String>,
    /// Absolute URL or path relative to the image host
    pub image_reference: String,
}

impl CardDescriptor {
    pub fn is_identity(&self) -> bool {
        self.card_type == IDENTITY_TYPE
    }

    pub fn is_ice(&self) -> bool {
        self.card_type == ICE_TYPE
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.png", self.code)
    }
}

pub mod catalog;
pub mod crops;
