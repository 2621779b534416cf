use crate::cards::{CardDescriptor, IDENTITY_TYPE};
use crate::error::{PipelineError, Result};

/// Rectangle in source-image pixel coordinates.
///
/// Edges may lie outside the source image; the cropping step pads those areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CropRegion {
    const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top) as u32
    }
}

// Regions measured on 300x419 card scans.
const TYPE_CROPS: &[(&str, CropRegion)] = &[
    ("agenda", CropRegion::new(59, 29, 270, 240)),
    ("asset", CropRegion::new(49, 0, 251, 202)),
    ("event", CropRegion::new(41, 28, 258, 245)),
    ("hardware", CropRegion::new(42, 3, 258, 219)),
    ("ice", CropRegion::new(48, 209, 266, 427)),
    ("operation", CropRegion::new(44, 34, 255, 245)),
    ("program", CropRegion::new(73, 14, 241, 182)),
    ("resource", CropRegion::new(71, 23, 230, 182)),
    ("upgrade", CropRegion::new(43, -6, 248, 208)),
];

const IDENTITY_CROPS: &[(&str, CropRegion)] = &[
    ("corp", CropRegion::new(22, 52, 277, 307)),
    ("runner", CropRegion::new(29, 50, 269, 290)),
];

fn find(table: &[(&str, CropRegion)], key: &str) -> Option<CropRegion> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, region)| *region)
}

/// Resolve the crop region for a card type, or for the side when the type is `identity`.
pub fn lookup(card_type: &str, side: Option<&str>) -> Result<CropRegion> {
    let region = if card_type.eq_ignore_ascii_case(IDENTITY_TYPE) {
        side.and_then(|side| find(IDENTITY_CROPS, side))
    } else {
        find(TYPE_CROPS, card_type)
    };

    region.ok_or_else(|| PipelineError::UnknownType {
        card_type: card_type.to_string(),
        side: side.map(str::to_string),
    })
}

pub fn lookup_for(card: &CardDescriptor) -> Result<CropRegion> {
    lookup(&card.card_type, card.side.as_deref())
}
