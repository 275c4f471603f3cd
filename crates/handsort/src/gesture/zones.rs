use super::{DROP_ZONE_GAP, DROP_ZONE_MARGIN, DROP_ZONE_SIZE, Screen};
use pantry::catalog::FoodKind;
use pantry::geometry::{Point, Rect};

/// The two sorting bins, stacked along the left edge around the vertical midline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZones {
    pub veg: Rect,
    pub non_veg: Rect,
}

impl DropZones {
    pub fn for_screen(screen: Screen) -> Self {
        let mid = screen.height / 2.0;
        Self {
            veg: Rect::new(
                DROP_ZONE_MARGIN,
                mid - DROP_ZONE_SIZE - DROP_ZONE_GAP,
                DROP_ZONE_SIZE,
                DROP_ZONE_SIZE,
            ),
            non_veg: Rect::new(
                DROP_ZONE_MARGIN,
                mid + DROP_ZONE_GAP,
                DROP_ZONE_SIZE,
                DROP_ZONE_SIZE,
            ),
        }
    }

    pub fn rect(&self, kind: FoodKind) -> Rect {
        match kind {
            FoodKind::Veg => self.veg,
            FoodKind::NonVeg => self.non_veg,
        }
    }

    pub fn classify(&self, p: Point) -> Option<FoodKind> {
        [FoodKind::Veg, FoodKind::NonVeg]
            .into_iter()
            .find(|&kind| self.rect(kind).contains_strict(p))
    }
}

impl Default for DropZones {
    fn default() -> Self {
        Self::for_screen(Screen::default())
    }
}
