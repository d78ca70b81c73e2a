//! Region proposal seam.
//!
//! The finder verifies candidate regions, it does not discover them; any
//! object detector (pedestrian HOG, a neural detector, motion blobs) can sit
//! behind [`RegionProposal`] without the core pipeline knowing.

use crate::image::ImageU8;
use crate::types::BoundingBox;

/// Black-box candidate-region source.
pub trait RegionProposal {
    /// Propose bounding boxes in frame coordinates, in a stable order.
    ///
    /// The order matters: ties in match score are broken in favour of the
    /// earliest proposed region.
    fn propose(&self, frame: &ImageU8<'_>) -> Vec<BoundingBox>;
}

/// Proposal backed by a fixed list of externally supplied boxes.
///
/// Boxes that do not fit inside the frame are dropped at proposal time, so
/// downstream cropping cannot fail.
#[derive(Clone, Debug, Default)]
pub struct StaticProposal {
    boxes: Vec<BoundingBox>,
}

impl StaticProposal {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }
}

impl RegionProposal for StaticProposal {
    fn propose(&self, frame: &ImageU8<'_>) -> Vec<BoundingBox> {
        self.boxes
            .iter()
            .copied()
            .filter(|b| frame.crop(*b).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_proposal_drops_boxes_outside_the_frame() {
        let data = vec![0u8; 64 * 48];
        let frame = ImageU8 {
            w: 64,
            h: 48,
            stride: 64,
            data: &data,
        };
        let proposal = StaticProposal::new(vec![
            BoundingBox::new(0, 0, 32, 32),
            BoundingBox::new(50, 40, 32, 32), // spills over the border
            BoundingBox::new(10, 10, 0, 5),   // empty
        ]);
        let boxes = proposal.propose(&frame);
        assert_eq!(boxes, vec![BoundingBox::new(0, 0, 32, 32)]);
    }
}
