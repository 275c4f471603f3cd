use super::{FINGERTIPS, INDEX_MCP, INDEX_TIP, LANDMARK_COUNT, PIP_OFFSET, Screen, WRIST};
use pantry::geometry::Point;
use serde::Deserialize;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Handedness {
    Left,
    Right,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestureError {
    #[error("Expected {expected} landmarks, got {0}", expected = LANDMARK_COUNT)]
    LandmarkCount(usize),
    #[error("Hand has no handedness label")]
    MissingHandedness,
    #[error("Unknown handedness label '{0}'")]
    UnknownHandedness(String),
    #[error("Landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// One hand as reported by the tracker, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHand {
    #[serde(default)]
    pub handedness: Option<String>,
    #[serde(default)]
    pub landmarks: Vec<[f64; 2]>,
}

/// A validated 21-point hand with its pixel projection.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub handedness: Handedness,
    normalized: [Point; LANDMARK_COUNT],
    pixels: [Point; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(handedness: Handedness, normalized: [Point; LANDMARK_COUNT], screen: Screen) -> Self {
        let pixels = normalized.map(|p| Point::new(p.x * screen.width, p.y * screen.height));
        Self {
            handedness,
            normalized,
            pixels,
        }
    }

    pub fn from_raw(raw: &RawHand, screen: Screen) -> Result<Self, GestureError> {
        let label = raw
            .handedness
            .as_deref()
            .ok_or(GestureError::MissingHandedness)?;
        let handedness = label
            .trim()
            .parse()
            .map_err(|_| GestureError::UnknownHandedness(label.to_string()))?;

        if raw.landmarks.len() != LANDMARK_COUNT {
            return Err(GestureError::LandmarkCount(raw.landmarks.len()));
        }
        if let Some(i) = raw
            .landmarks
            .iter()
            .position(|[x, y]| !x.is_finite() || !y.is_finite())
        {
            return Err(GestureError::NonFinite(i));
        }

        let mut normalized = [Point::default(); LANDMARK_COUNT];
        for (slot, [x, y]) in normalized.iter_mut().zip(&raw.landmarks) {
            *slot = Point::new(*x, *y);
        }
        Ok(Self::new(handedness, normalized, screen))
    }

    /// All four fingertips sit above their PIP joints (image y grows downwards).
    pub fn is_palm_open(&self) -> bool {
        FINGERTIPS
            .iter()
            .all(|&tip| self.normalized[tip].y < self.normalized[tip - PIP_OFFSET].y)
    }

    /// All four fingertips sit below their PIP joints.
    pub fn is_grabbing(&self) -> bool {
        FINGERTIPS
            .iter()
            .all(|&tip| self.normalized[tip].y > self.normalized[tip - PIP_OFFSET].y)
    }

    /// Direction from the wrist to the base of the index finger, in radians.
    pub fn wrist_angle(&self) -> f64 {
        let (wrist, base) = (self.normalized[WRIST], self.normalized[INDEX_MCP]);
        (base.y - wrist.y).atan2(base.x - wrist.x)
    }

    pub fn wrist_px(&self) -> Point {
        self.pixels[WRIST]
    }

    pub fn index_tip_px(&self) -> Point {
        self.pixels[INDEX_TIP]
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn raw(label: Option<&str>, count: usize) -> RawHand {
        RawHand {
            handedness: label.map(str::to_string),
            landmarks: vec![[0.5, 0.5]; count],
        }
    }

    #[test]
    fn test_open_palm_needs_every_finger_up() {
        let hand = HandLandmarks::new(Handedness::Right, posed([true; 4]), Screen::default());
        assert!(hand.is_palm_open());
        assert!(!hand.is_grabbing());

        for down in 0..4 {
            let mut fingers = [true; 4];
            fingers[down] = false;
            let hand = HandLandmarks::new(Handedness::Right, posed(fingers), Screen::default());
            assert!(!hand.is_palm_open(), "finger {down} curled");
        }
    }

    #[test]
    fn test_open_and_grab_are_exclusive() {
        assert!(fist(Handedness::Left).is_grabbing());
        assert!(!fist(Handedness::Left).is_palm_open());

        let mixed = HandLandmarks::new(
            Handedness::Left,
            posed([true, false, true, false]),
            Screen::default(),
        );
        assert!(!mixed.is_palm_open());
        assert!(!mixed.is_grabbing());
    }

    #[test]
    fn test_tip_level_with_joint_is_neither() {
        let mut pts = posed([true; 4]);
        pts[12].y = pts[10].y;
        let hand = HandLandmarks::new(Handedness::Right, pts, Screen::default());
        assert!(!hand.is_palm_open());
        assert!(!hand.is_grabbing());
    }

    #[test]
    fn test_wrist_angle() {
        // index base straight above the wrist
        let hand = open_hand(Handedness::Right);
        assert!((hand.wrist_angle() + FRAC_PI_2).abs() < 1e-9);

        let mut pts = posed([true; 4]);
        pts[INDEX_MCP] = Point::new(0.6, 0.8);
        let hand = HandLandmarks::new(Handedness::Right, pts, Screen::default());
        assert!(hand.wrist_angle().abs() < 1e-9);
    }

    #[test]
    fn test_pixel_projection() {
        let hand = open_hand(Handedness::Right);
        assert_eq!(hand.wrist_px(), Point::new(640.0, 576.0));
        assert_eq!(hand.index_tip_px(), Point::new(640.0, 288.0));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let screen = Screen::default();
        assert_eq!(
            HandLandmarks::from_raw(&raw(Some("Right"), 20), screen),
            Err(GestureError::LandmarkCount(20))
        );
        assert_eq!(
            HandLandmarks::from_raw(&raw(None, 21), screen),
            Err(GestureError::MissingHandedness)
        );
        assert_eq!(
            HandLandmarks::from_raw(&raw(Some("Middle"), 21), screen),
            Err(GestureError::UnknownHandedness("Middle".to_string()))
        );

        let mut bad = raw(Some("Left"), 21);
        bad.landmarks[7] = [f64::NAN, 0.5];
        assert_eq!(
            HandLandmarks::from_raw(&bad, screen),
            Err(GestureError::NonFinite(7))
        );
    }

    #[test]
    fn test_raw_hand_from_json() {
        let points: Vec<[f64; 2]> = posed([false; 4]).iter().map(|p| [p.x, p.y]).collect();
        let json = serde_json::json!({ "handedness": "left", "landmarks": points });
        let raw: RawHand = serde_json::from_value(json).unwrap();
        let hand = HandLandmarks::from_raw(&raw, Screen::default()).unwrap();
        assert_eq!(hand.handedness, Handedness::Left);
        assert!(hand.is_grabbing());
    }
}
